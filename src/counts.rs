use crate::calendar::MonthCursor;
use crate::date_key::DateKey;
use std::collections::BTreeMap;
use tracing::warn;

/// Plays per day, as produced by one remote fetch.
pub type RemoteCounts = BTreeMap<DateKey, u64>;

/// Per-day play counts. Absent days count as zero and entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayCountStore {
    days: BTreeMap<DateKey, u64>,
    dirty: bool,
}

impl PlayCountStore {
    /// Best-effort load: a missing or unparsable blob yields an empty store.
    pub fn load(blob: Option<&[u8]>) -> Self {
        match blob {
            Some(bytes) => Self::parse(bytes).unwrap_or_else(|err| {
                warn!("discarding unreadable play counts: {err}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Strict parse of a flat `{"YYYY-MM-DD": n}` object. Non-canonical keys are
    /// skipped; anything that is not such an object is an error.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, u64> = serde_json::from_slice(bytes)?;
        let mut days = BTreeMap::new();
        for (key, count) in raw {
            match DateKey::parse(&key) {
                Ok(key) => {
                    days.insert(key, count);
                }
                Err(err) => warn!("skipping play count entry: {err}"),
            }
        }
        Ok(Self { days, dirty: false })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(&self.days)
    }

    pub fn increment(&mut self, key: DateKey, by: u64) -> u64 {
        let entry = self.days.entry(key).or_default();
        *entry = entry.saturating_add(by);
        self.dirty = true;
        *entry
    }

    /// Adds every incoming count onto the stored one. Counts from different sources
    /// sum; applying the same additions twice counts them twice.
    pub fn merge<I>(&mut self, additions: I)
    where
        I: IntoIterator<Item = (DateKey, u64)>,
    {
        for (key, count) in additions {
            if count == 0 {
                continue;
            }
            let entry = self.days.entry(key).or_default();
            *entry = entry.saturating_add(count);
            self.dirty = true;
        }
    }

    pub fn count_for(&self, key: &DateKey) -> u64 {
        self.days.get(key).copied().unwrap_or(0)
    }

    pub fn total_in_month(&self, cursor: MonthCursor) -> u64 {
        cursor
            .days()
            .map(|key| self.count_for(&key))
            .fold(0u64, u64::saturating_add)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> DateKey {
        DateKey::parse(raw).unwrap()
    }

    #[test]
    fn absent_day_counts_zero() {
        let store = PlayCountStore::default();
        assert_eq!(store.count_for(&key("2024-03-05")), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn increment_inserts_then_adds() {
        let mut store = PlayCountStore::load(None);
        assert_eq!(store.increment(key("2024-03-05"), 1), 1);
        assert_eq!(store.increment(key("2024-03-05"), 4), 5);
        assert_eq!(store.count_for(&key("2024-03-05")), 5);
        assert!(store.is_dirty());
    }

    #[test]
    fn merge_is_additive() {
        let mut store = PlayCountStore::default();
        store.merge([(key("2024-03-05"), 2)]);
        store.merge([(key("2024-03-05"), 3)]);
        assert_eq!(store.count_for(&key("2024-03-05")), 5);
    }

    #[test]
    fn merge_order_does_not_matter() {
        let a = [(key("2024-03-05"), 2), (key("2024-03-06"), 1)];
        let b = [(key("2024-03-05"), 7)];

        let mut left = PlayCountStore::default();
        left.merge(a.clone());
        left.merge(b.clone());

        let mut right = PlayCountStore::default();
        right.merge(b);
        right.merge(a);

        assert_eq!(left, right);
        assert_eq!(left.count_for(&key("2024-03-05")), 9);
    }

    #[test]
    fn merge_sums_with_local_increments() {
        let mut store = PlayCountStore::default();
        store.increment(key("2024-03-05"), 1);
        store.merge([(key("2024-03-05"), 4)]);
        assert_eq!(store.count_for(&key("2024-03-05")), 5);
    }

    #[test]
    fn empty_merge_leaves_store_clean() {
        let mut store = PlayCountStore::default();
        store.merge(RemoteCounts::new());
        store.merge([(key("2024-03-05"), 0)]);
        assert!(!store.is_dirty());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        assert!(PlayCountStore::parse(b"not json").is_err());
        assert!(PlayCountStore::load(Some(b"not json".as_slice())).is_empty());
        assert!(PlayCountStore::load(Some(b"{\"2024-03-05\": -1}".as_slice())).is_empty());
        assert!(PlayCountStore::load(Some(b"[1, 2]".as_slice())).is_empty());
    }

    #[test]
    fn non_canonical_keys_are_skipped() {
        let store = PlayCountStore::load(Some(
            b"{\"2024-3-5\": 2, \"2024-03-06\": 3}".as_slice(),
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_for(&key("2024-03-06")), 3);
    }

    #[test]
    fn serialize_round_trips_through_load() {
        let mut store = PlayCountStore::load(None);
        store.increment(key("2024-03-05"), 1);
        store.merge([(key("2023-12-31"), 12)]);

        let blob = store.serialize().unwrap();
        let reloaded = PlayCountStore::load(Some(blob.as_slice()));

        assert_eq!(reloaded.count_for(&key("2024-03-05")), 1);
        assert_eq!(reloaded.count_for(&key("2023-12-31")), 12);
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn month_total_ignores_other_months() {
        let mut store = PlayCountStore::default();
        store.increment(key("2024-02-29"), 2);
        store.increment(key("2024-03-01"), 3);
        store.increment(key("2024-03-31"), 4);
        store.increment(key("2024-04-01"), 5);
        assert_eq!(store.total_in_month(MonthCursor::new(2024, 3).unwrap()), 7);
    }
}
