use crate::calendar::{CalendarCell, DAY_LABELS, MonthCursor, PointerTarget};
use crate::counts::PlayCountStore;
use crate::date_key::DateKey;
use crate::errors::AppError;
use crate::models::{
    CalendarResponse, CellQuery, CellView, DayCountResponse, NavigateRequest, PlayRequest,
    PointerRequest, PointerResponse, RefreshResponse,
};
use crate::refresh::spawn_refresh;
use crate::state::AppState;
use crate::stats::month_summary;
use crate::storage::persist_counts;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use tracing::info;

pub const PANEL_WIDTH: i32 = 300;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let cursor = *state.cursor.lock().await;
    let counts = state.counts.lock().await;
    Html(render_index(&calendar_response(&state, cursor, &counts), PANEL_WIDTH))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<DayCountResponse>, AppError> {
    let date = today()?;
    let counts = state.counts.lock().await;
    Ok(Json(to_response(&date, counts.count_for(&date))))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayCountResponse>, AppError> {
    let date = DateKey::parse(&date)?;
    let counts = state.counts.lock().await;
    Ok(Json(to_response(&date, counts.count_for(&date))))
}

/// Local playback of a new track.
pub async fn record_play(
    State(state): State<AppState>,
    payload: Option<Json<PlayRequest>>,
) -> Result<Json<DayCountResponse>, AppError> {
    let by = payload.and_then(|Json(request)| request.by).unwrap_or(1);
    if by == 0 {
        return Err(AppError::bad_request("by must be at least 1"));
    }

    let date = today()?;
    let mut counts = state.counts.lock().await;
    let count = counts.increment(date.clone(), by);
    persist_counts(&state.counts_path, &mut counts).await?;

    Ok(Json(to_response(&date, count)))
}

pub async fn get_calendar(State(state): State<AppState>) -> Json<CalendarResponse> {
    let cursor = *state.cursor.lock().await;
    let counts = state.counts.lock().await;
    Json(calendar_response(&state, cursor, &counts))
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<CalendarResponse>, AppError> {
    if payload.delta != -1 && payload.delta != 1 {
        return Err(AppError::bad_request("delta must be -1 or 1"));
    }
    let cursor = move_cursor(&state, payload.delta).await;
    let counts = state.counts.lock().await;
    Ok(Json(calendar_response(&state, cursor, &counts)))
}

pub async fn nav_prev(State(state): State<AppState>) -> Redirect {
    move_cursor(&state, -1).await;
    Redirect::to("/")
}

pub async fn nav_next(State(state): State<AppState>) -> Redirect {
    move_cursor(&state, 1).await;
    Redirect::to("/")
}

pub async fn get_cell(
    State(state): State<AppState>,
    Query(query): Query<CellQuery>,
) -> Json<Option<CellView>> {
    let cursor = *state.cursor.lock().await;
    let counts = state.counts.lock().await;
    let cell = state
        .view(cursor, &counts)
        .cell_at(&state.geometry, query.x, query.y)
        .map(|cell| cell_view(&state, cell));
    Json(cell)
}

/// Click on the panel: arrows navigate, everything else is a lookup.
pub async fn pointer(
    State(state): State<AppState>,
    Json(payload): Json<PointerRequest>,
) -> Result<Json<PointerResponse>, AppError> {
    if payload.width < state.geometry.grid_width() {
        return Err(AppError::bad_request("width must cover the calendar grid"));
    }
    let cursor = *state.cursor.lock().await;
    let target = {
        let counts = state.counts.lock().await;
        state
            .view(cursor, &counts)
            .pointer_target(&state.geometry, payload.x, payload.y, payload.width)
    };

    let delta = match target {
        PointerTarget::PrevMonth => -1,
        PointerTarget::NextMonth => 1,
        _ => return Ok(Json(PointerResponse { target, calendar: None })),
    };
    let cursor = move_cursor(&state, delta).await;
    let counts = state.counts.lock().await;
    Ok(Json(PointerResponse {
        target,
        calendar: Some(calendar_response(&state, cursor, &counts)),
    }))
}

pub async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshResponse>) {
    let cursor = *state.cursor.lock().await;
    let scheduled = spawn_refresh(&state, cursor);
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            scheduled,
            month: cursor.title(),
        }),
    )
}

async fn move_cursor(state: &AppState, delta: i32) -> MonthCursor {
    let cursor = {
        let mut cursor = state.cursor.lock().await;
        *cursor = cursor.advance(delta);
        *cursor
    };
    info!(month = %cursor.title(), "navigated");
    spawn_refresh(state, cursor);
    cursor
}

pub fn calendar_response(
    state: &AppState,
    cursor: MonthCursor,
    counts: &PlayCountStore,
) -> CalendarResponse {
    let cells = state
        .view(cursor, counts)
        .layout()
        .into_iter()
        .map(|cell| cell_view(state, cell))
        .collect();

    CalendarResponse {
        year: cursor.year(),
        month: cursor.month(),
        title: cursor.title(),
        day_labels: DAY_LABELS,
        geometry: state.geometry,
        cells,
        summary: month_summary(counts, cursor),
    }
}

fn cell_view(state: &AppState, cell: CalendarCell) -> CellView {
    CellView {
        rect: state.geometry.cell_rect(cell.row, cell.column),
        color: cell
            .bucket
            .map(|bucket| state.intensity().color(bucket).to_string()),
        row: cell.row,
        column: cell.column,
        date: cell.date.map(String::from),
        day: cell.day,
        count: cell.count,
        bucket: cell.bucket,
    }
}

fn today() -> Result<DateKey, AppError> {
    DateKey::today().map_err(AppError::internal)
}

fn to_response(date: &DateKey, count: u64) -> DayCountResponse {
    DayCountResponse {
        date: date.to_string(),
        count,
    }
}
