use crate::calendar::MonthCursor;
use crate::counts::PlayCountStore;
use crate::date_key::DateKey;
use crate::models::{DayCountResponse, MonthSummary};

/// Totals for one month; ties for the busiest day go to the earliest date.
pub fn month_summary(store: &PlayCountStore, cursor: MonthCursor) -> MonthSummary {
    let mut total_plays = 0u64;
    let mut active_days = 0u32;
    let mut busiest: Option<(DateKey, u64)> = None;

    for key in cursor.days() {
        let count = store.count_for(&key);
        if count == 0 {
            continue;
        }
        total_plays = total_plays.saturating_add(count);
        active_days += 1;
        if busiest.as_ref().is_none_or(|(_, best)| count > *best) {
            busiest = Some((key, count));
        }
    }

    MonthSummary {
        total_plays,
        active_days,
        busiest_day: busiest.map(|(key, count)| DayCountResponse {
            date: key.to_string(),
            count,
        }),
        average_per_active_day: if active_days == 0 {
            0.0
        } else {
            total_plays as f64 / f64::from(active_days)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> MonthCursor {
        MonthCursor::new(2024, 3).unwrap()
    }

    #[test]
    fn month_summary_picks_earliest_busiest_day() {
        let mut store = PlayCountStore::default();
        store.increment(DateKey::parse("2024-03-02").unwrap(), 4);
        store.increment(DateKey::parse("2024-03-09").unwrap(), 4);
        store.increment(DateKey::parse("2024-03-10").unwrap(), 1);
        store.increment(DateKey::parse("2024-04-01").unwrap(), 50);

        let summary = month_summary(&store, march());
        assert_eq!(summary.total_plays, 9);
        assert_eq!(summary.active_days, 3);
        assert_eq!(summary.average_per_active_day, 3.0);
        assert_eq!(
            summary.busiest_day,
            Some(DayCountResponse {
                date: "2024-03-02".into(),
                count: 4,
            })
        );
    }

    #[test]
    fn empty_month_summary() {
        let summary = month_summary(&PlayCountStore::default(), march());
        assert_eq!(summary.total_plays, 0);
        assert_eq!(summary.busiest_day, None);
        assert_eq!(summary.average_per_active_day, 0.0);
    }
}
