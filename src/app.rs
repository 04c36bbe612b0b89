use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/nav/prev", post(handlers::nav_prev))
        .route("/nav/next", post(handlers::nav_next))
        .route("/api/today", get(handlers::get_today))
        .route("/api/play", post(handlers::record_play))
        .route("/api/day/:date", get(handlers::get_day))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/navigate", post(handlers::navigate))
        .route("/api/cell", get(handlers::get_cell))
        .route("/api/pointer", post(handlers::pointer))
        .route("/api/refresh", post(handlers::refresh))
        .with_state(state)
}
