pub mod app;
pub mod calendar;
pub mod config;
pub mod counts;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod refresh;
pub mod scrobble;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use calendar::{CalendarCell, CalendarView, Geometry, IntensityScale, MonthCursor, cell_at, layout};
pub use config::{Config, Settings, load_or_create_config};
pub use counts::{PlayCountStore, RemoteCounts};
pub use date_key::{DateError, DateKey};
pub use scrobble::{Credentials, LastFmClient};
pub use state::AppState;
pub use storage::{load_counts_or_default, persist_counts};
