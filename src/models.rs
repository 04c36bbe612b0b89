use crate::calendar::{Geometry, PointerTarget, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCountResponse {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayRequest {
    pub by: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize)]
pub struct CellQuery {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize)]
pub struct PointerRequest {
    pub x: i32,
    pub y: i32,
    pub width: i32,
}

#[derive(Debug, Serialize)]
pub struct CellView {
    pub row: u32,
    pub column: u32,
    pub date: Option<String>,
    pub day: Option<u32>,
    pub count: u64,
    pub bucket: Option<u8>,
    pub color: Option<String>,
    pub rect: Rect,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub day_labels: [&'static str; 7],
    pub geometry: Geometry,
    pub cells: Vec<CellView>,
    pub summary: MonthSummary,
}

#[derive(Debug, Serialize)]
pub struct PointerResponse {
    pub target: PointerTarget,
    pub calendar: Option<CalendarResponse>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub scheduled: bool,
    pub month: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthSummary {
    pub total_plays: u64,
    pub active_days: u32,
    pub busiest_day: Option<DayCountResponse>,
    pub average_per_active_day: f64,
}
