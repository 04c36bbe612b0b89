use crate::calendar::{CalendarView, Geometry, IntensityScale, MonthCursor};
use crate::config::{Config, IntensityConfig};
use crate::counts::PlayCountStore;
use crate::scrobble::LastFmClient;
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub counts_path: PathBuf,
    pub counts: Arc<Mutex<PlayCountStore>>,
    pub cursor: Arc<Mutex<MonthCursor>>,
    pub config: Arc<Config>,
    pub fetcher: Arc<LastFmClient>,
    pub geometry: Geometry,
    generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        counts_path: PathBuf,
        counts: PlayCountStore,
        cursor: MonthCursor,
        config: Config,
        fetcher: LastFmClient,
    ) -> Self {
        Self {
            counts_path,
            counts: Arc::new(Mutex::new(counts)),
            cursor: Arc::new(Mutex::new(cursor)),
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            geometry: Geometry::default(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn intensity(&self) -> &IntensityConfig {
        &self.config.intensity
    }

    pub fn scale(&self) -> IntensityScale {
        self.config.intensity.scale()
    }

    pub fn view<'a>(&self, cursor: MonthCursor, counts: &'a PlayCountStore) -> CalendarView<'a> {
        CalendarView::new(cursor, counts, self.scale())
    }

    /// Starts a new fetch generation; results of older generations are dropped.
    pub fn begin_fetch(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current_fetch(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
