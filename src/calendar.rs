use crate::counts::PlayCountStore;
use crate::date_key::{self, DateError, DateKey};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const WEEKS: u32 = 6;
pub const DAYS_PER_WEEK: u32 = 7;
pub const SLOTS: u32 = WEEKS * DAYS_PER_WEEK;
pub const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const LAST_MONTH_INDEX: i64 = 9999 * 12 + 11;

/// The displayed year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, DateError> {
        DateKey::encode(year, month, 1)?;
        Ok(Self { year, month })
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Moves by `delta` months, rolling the year over in either direction.
    /// Saturates at 0000-01 and 9999-12.
    pub fn advance(self, delta: i32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        let index = index.clamp(0, LAST_MONTH_INDEX);
        Self {
            year: (index / 12) as i32,
            month: (index % 12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn first_weekday(self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn days_in_month(self) -> u32 {
        date_key::days_in_month(self.year, self.month)
    }

    pub fn day(self, day: u32) -> Option<DateKey> {
        DateKey::encode(self.year, self.month, day).ok()
    }

    pub fn days(self) -> impl Iterator<Item = DateKey> {
        (1..=self.days_in_month()).filter_map(move |day| self.day(day))
    }

    pub fn title(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

/// Maps a day's play count onto a discrete intensity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityScale {
    pub divisor: u64,
    pub max_bucket: u8,
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self {
            divisor: 3,
            max_bucket: 4,
        }
    }
}

impl IntensityScale {
    pub fn bucket(&self, count: u64) -> u8 {
        let level = count / self.divisor.max(1);
        level.min(u64::from(self.max_bucket)) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub row: u32,
    pub column: u32,
    pub date: Option<DateKey>,
    pub day: Option<u32>,
    pub count: u64,
    pub bucket: Option<u8>,
}

impl CalendarCell {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
    }
}

/// Half-open pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Edge-inclusive test used for the navigation arrows.
    pub fn contains_inclusive(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Pixel geometry of the panel: header band, day-label band, then a 6x7 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub cell_size: i32,
    pub cell_margin: i32,
    pub header_height: i32,
    pub arrow_size: i32,
    pub arrow_inset: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            cell_size: 15,
            cell_margin: 2,
            header_height: 30,
            arrow_size: 20,
            arrow_inset: 10,
        }
    }
}

impl Geometry {
    pub fn pitch(&self) -> i32 {
        self.cell_size + self.cell_margin
    }

    pub fn grid_top(&self) -> i32 {
        self.header_height + self.cell_size
    }

    pub fn grid_width(&self) -> i32 {
        DAYS_PER_WEEK as i32 * self.pitch() - self.cell_margin
    }

    pub fn grid_bottom(&self) -> i32 {
        self.grid_top() + WEEKS as i32 * self.pitch() - self.cell_margin
    }

    pub fn cell_rect(&self, row: u32, column: u32) -> Rect {
        Rect {
            x: column as i32 * self.pitch(),
            y: self.grid_top() + row as i32 * self.pitch(),
            width: self.cell_size,
            height: self.cell_size,
        }
    }

    pub fn label_rect(&self, column: u32) -> Rect {
        Rect {
            x: column as i32 * self.pitch(),
            y: self.header_height,
            width: self.cell_size,
            height: self.cell_size,
        }
    }

    pub fn left_arrow(&self) -> Rect {
        Rect {
            x: self.arrow_inset,
            y: (self.header_height - self.arrow_size) / 2,
            width: self.arrow_size,
            height: self.arrow_size,
        }
    }

    pub fn right_arrow(&self, panel_width: i32) -> Rect {
        Rect {
            x: panel_width
                .saturating_sub(self.arrow_size)
                .saturating_sub(self.arrow_inset),
            ..self.left_arrow()
        }
    }

    /// Grid slot under the pointer. Margin pixels belong to the cell up and left of them.
    pub fn slot_at(&self, px: i32, py: i32) -> Option<u32> {
        if px < 0 || py < self.grid_top() {
            return None;
        }
        let column = px / self.pitch();
        let row = (py - self.grid_top()) / self.pitch();
        if column >= DAYS_PER_WEEK as i32 || row >= WEEKS as i32 {
            return None;
        }
        Some(row as u32 * DAYS_PER_WEEK + column as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerTarget {
    PrevMonth,
    NextMonth,
    Cell(CalendarCell),
    Outside,
}

/// Read-only view over one month of play counts.
#[derive(Debug, Clone, Copy)]
pub struct CalendarView<'a> {
    pub cursor: MonthCursor,
    pub counts: &'a PlayCountStore,
    pub scale: IntensityScale,
}

impl<'a> CalendarView<'a> {
    pub fn new(cursor: MonthCursor, counts: &'a PlayCountStore, scale: IntensityScale) -> Self {
        Self {
            cursor,
            counts,
            scale,
        }
    }

    /// Day of month held by `slot`, if any.
    pub fn day_in_slot(&self, slot: u32) -> Option<u32> {
        let first = self.cursor.first_weekday();
        if slot >= SLOTS || slot < first {
            return None;
        }
        let day = slot - first + 1;
        (day <= self.cursor.days_in_month()).then_some(day)
    }

    pub fn cell(&self, slot: u32) -> CalendarCell {
        let day = self.day_in_slot(slot);
        let date = day.and_then(|day| self.cursor.day(day));
        let count = date.as_ref().map_or(0, |key| self.counts.count_for(key));
        CalendarCell {
            row: slot / DAYS_PER_WEEK,
            column: slot % DAYS_PER_WEEK,
            day,
            bucket: date.as_ref().map(|_| self.scale.bucket(count)),
            count,
            date,
        }
    }

    pub fn layout(&self) -> Vec<CalendarCell> {
        (0..SLOTS).map(|slot| self.cell(slot)).collect()
    }

    pub fn cell_at(&self, geometry: &Geometry, px: i32, py: i32) -> Option<CalendarCell> {
        let slot = geometry.slot_at(px, py)?;
        let cell = self.cell(slot);
        (!cell.is_empty()).then_some(cell)
    }

    pub fn pointer_target(
        &self,
        geometry: &Geometry,
        px: i32,
        py: i32,
        panel_width: i32,
    ) -> PointerTarget {
        if geometry.left_arrow().contains_inclusive(px, py) {
            return PointerTarget::PrevMonth;
        }
        if geometry.right_arrow(panel_width).contains_inclusive(px, py) {
            return PointerTarget::NextMonth;
        }
        match self.cell_at(geometry, px, py) {
            Some(cell) => PointerTarget::Cell(cell),
            None => PointerTarget::Outside,
        }
    }
}

pub fn layout(
    cursor: MonthCursor,
    counts: &PlayCountStore,
    scale: IntensityScale,
) -> Vec<CalendarCell> {
    CalendarView::new(cursor, counts, scale).layout()
}

pub fn cell_at(
    geometry: &Geometry,
    px: i32,
    py: i32,
    cursor: MonthCursor,
    counts: &PlayCountStore,
    scale: IntensityScale,
) -> Option<CalendarCell> {
    CalendarView::new(cursor, counts, scale).cell_at(geometry, px, py)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(year: i32, month: u32) -> MonthCursor {
        MonthCursor::new(year, month).unwrap()
    }

    fn months() -> impl Iterator<Item = MonthCursor> {
        (2023..=2025).flat_map(|year| (1..=12).map(move |month| cursor(year, month)))
    }

    #[test]
    fn layout_always_has_42_slots() {
        let store = PlayCountStore::default();
        for month in months() {
            let cells = layout(month, &store, IntensityScale::default());
            assert_eq!(cells.len(), 42);
            let filled = cells.iter().filter(|cell| !cell.is_empty()).count();
            assert_eq!(filled as u32, month.days_in_month(), "{month:?}");
        }
    }

    #[test]
    fn first_day_sits_in_its_weekday_column() {
        // 2024-03-01 is a Friday.
        let cells = layout(cursor(2024, 3), &PlayCountStore::default(), IntensityScale::default());
        let first = cells.iter().find(|cell| !cell.is_empty()).unwrap();
        assert_eq!((first.row, first.column), (0, 5));
        assert_eq!(first.date.as_ref().unwrap().as_str(), "2024-03-01");
        assert_eq!(first.day, Some(1));

        let last = cells.iter().rev().find(|cell| !cell.is_empty()).unwrap();
        assert_eq!(last.date.as_ref().unwrap().as_str(), "2024-03-31");
        assert_eq!((last.row, last.column), (5, 0));
    }

    #[test]
    fn month_starting_sunday_fills_first_slot() {
        // 2023-10-01 is a Sunday.
        let month = cursor(2023, 10);
        assert_eq!(month.first_weekday(), 0);
        let cells = layout(month, &PlayCountStore::default(), IntensityScale::default());
        assert_eq!(cells[0].day, Some(1));
    }

    #[test]
    fn empty_cells_carry_no_bucket() {
        let cells = layout(cursor(2024, 3), &PlayCountStore::default(), IntensityScale::default());
        assert!(cells[0].is_empty());
        assert_eq!(cells[0].bucket, None);
        assert_eq!(cells[5].bucket, Some(0));
    }

    #[test]
    fn cells_pick_up_counts_and_buckets() {
        let mut store = PlayCountStore::default();
        store.increment(DateKey::parse("2024-03-05").unwrap(), 7);
        let cells = layout(cursor(2024, 3), &store, IntensityScale::default());
        let cell = cells
            .iter()
            .find(|cell| cell.day == Some(5))
            .expect("missing day");
        assert_eq!(cell.count, 7);
        assert_eq!(cell.bucket, Some(2));
    }

    #[test]
    fn bucket_thresholds() {
        let scale = IntensityScale::default();
        assert_eq!(scale.bucket(0), 0);
        assert_eq!(scale.bucket(2), 0);
        assert_eq!(scale.bucket(3), 1);
        assert_eq!(scale.bucket(12), 4);
        assert_eq!(scale.bucket(100), 4);
    }

    #[test]
    fn bucket_policy_is_adjustable() {
        let scale = IntensityScale {
            divisor: 10,
            max_bucket: 2,
        };
        assert_eq!(scale.bucket(9), 0);
        assert_eq!(scale.bucket(10), 1);
        assert_eq!(scale.bucket(1000), 2);
    }

    #[test]
    fn advance_round_trips_across_year_boundary() {
        let january = cursor(2024, 1);
        let december = january.advance(-1);
        assert_eq!(december, cursor(2023, 12));
        assert_eq!(december.advance(1), january);
        assert_eq!(cursor(2023, 12).advance(1), cursor(2024, 1));
        assert_eq!(cursor(2024, 6).advance(-18), cursor(2022, 12));
    }

    #[test]
    fn advance_saturates_at_supported_range() {
        assert_eq!(cursor(0, 1).advance(-1), cursor(0, 1));
        assert_eq!(cursor(9999, 12).advance(1), cursor(9999, 12));
    }

    #[test]
    fn cell_at_inverts_layout_for_every_pixel() {
        let geometry = Geometry::default();
        let store = PlayCountStore::default();
        for month in months() {
            let view = CalendarView::new(month, &store, IntensityScale::default());
            for cell in view.layout().into_iter().filter(|cell| !cell.is_empty()) {
                let rect = geometry.cell_rect(cell.row, cell.column);
                for px in rect.x..rect.x + rect.width {
                    for py in rect.y..rect.y + rect.height {
                        let hit = view.cell_at(&geometry, px, py).expect("cell expected");
                        assert_eq!(hit.date, cell.date);
                    }
                }
            }
        }
    }

    #[test]
    fn margin_pixels_resolve_to_preceding_cell() {
        let geometry = Geometry::default();
        let store = PlayCountStore::default();
        let view = CalendarView::new(cursor(2024, 3), &store, IntensityScale::default());
        let rect = geometry.cell_rect(1, 2);
        let (px, py) = (rect.x + rect.width, rect.y + rect.height);
        assert!(!rect.contains(px, py));

        let hit = view.cell_at(&geometry, px, py).expect("cell expected");
        assert_eq!((hit.row, hit.column), (1, 2));
    }

    #[test]
    fn cell_at_rejects_header_and_empty_slots() {
        let geometry = Geometry::default();
        let store = PlayCountStore::default();
        let march = cursor(2024, 3);
        assert!(cell_at(&geometry, 90, 10, march, &store, IntensityScale::default()).is_none());
        assert!(cell_at(&geometry, 90, geometry.grid_top() - 1, march, &store, IntensityScale::default()).is_none());
        // Slot 0 precedes the 1st.
        assert!(cell_at(&geometry, 1, geometry.grid_top() + 1, march, &store, IntensityScale::default()).is_none());
        assert!(cell_at(&geometry, -1, geometry.grid_top() + 20, march, &store, IntensityScale::default()).is_none());
        assert!(cell_at(&geometry, geometry.pitch() * 7, geometry.grid_top() + 20, march, &store, IntensityScale::default()).is_none());
        assert!(cell_at(&geometry, 1, geometry.grid_top() + geometry.pitch() * 6, march, &store, IntensityScale::default()).is_none());
    }

    #[test]
    fn pointer_target_detects_arrows() {
        let geometry = Geometry::default();
        let store = PlayCountStore::default();
        let view = CalendarView::new(cursor(2024, 3), &store, IntensityScale::default());
        assert_eq!(view.pointer_target(&geometry, 10, 5, 300), PointerTarget::PrevMonth);
        assert_eq!(view.pointer_target(&geometry, 30, 25, 300), PointerTarget::PrevMonth);
        assert_eq!(view.pointer_target(&geometry, 270, 15, 300), PointerTarget::NextMonth);
        assert_eq!(view.pointer_target(&geometry, 150, 15, 300), PointerTarget::Outside);

        let rect = geometry.cell_rect(0, 5);
        match view.pointer_target(&geometry, rect.x, rect.y, 300) {
            PointerTarget::Cell(cell) => assert_eq!(cell.day, Some(1)),
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn pointer_target_tolerates_extreme_panel_widths() {
        let geometry = Geometry::default();
        let store = PlayCountStore::default();
        let view = CalendarView::new(cursor(2024, 3), &store, IntensityScale::default());
        for width in [i32::MIN, -1, 0, i32::MAX] {
            assert_eq!(view.pointer_target(&geometry, 10, 5, width), PointerTarget::PrevMonth);
            assert_eq!(view.pointer_target(&geometry, 150, 15, width), PointerTarget::Outside);
        }
        assert_eq!(geometry.right_arrow(i32::MIN).x, i32::MIN);
        assert_eq!(
            view.pointer_target(&geometry, i32::MAX - 20, 15, i32::MAX),
            PointerTarget::NextMonth
        );
    }

    #[test]
    fn title_names_month_and_year() {
        assert_eq!(cursor(2024, 3).title(), "March 2024");
    }
}
