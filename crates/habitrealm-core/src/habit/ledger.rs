//! Per-habit set of completed calendar days.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Anything that can be reduced to a calendar day.
///
/// Timestamps are stripped of their time-of-day so two toggles on the same
/// day from different moments compare equal.
pub trait IntoDay {
    fn into_day(self) -> NaiveDate;
}

impl IntoDay for NaiveDate {
    fn into_day(self) -> NaiveDate {
        self
    }
}

impl IntoDay for NaiveDateTime {
    fn into_day(self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> IntoDay for DateTime<Tz> {
    fn into_day(self) -> NaiveDate {
        self.date_naive()
    }
}

/// Ordered, duplicate-free set of completion days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    days: BTreeSet<NaiveDate>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the marker for `day`. Returns whether the day is present afterwards.
    pub fn toggle(&mut self, day: impl IntoDay) -> bool {
        let day = day.into_day();
        if self.days.remove(&day) {
            false
        } else {
            self.days.insert(day);
            true
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    /// Number of marked days in `[start, end)`.
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if start >= end {
            return 0;
        }
        self.days.range(start..end).count() as u32
    }
}

impl FromIterator<NaiveDate> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut ledger = CompletionLedger::new();
        assert!(ledger.toggle(d(2024, 3, 1)));
        assert!(ledger.contains(d(2024, 3, 1)));
        assert!(!ledger.toggle(d(2024, 3, 1)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn timestamps_on_same_day_compare_equal() {
        let mut ledger = CompletionLedger::new();
        let morning = d(2024, 3, 1).and_hms_opt(7, 15, 0).unwrap();
        let evening = d(2024, 3, 1).and_hms_opt(22, 40, 9).unwrap();
        assert!(ledger.toggle(morning));
        assert!(!ledger.toggle(evening));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn zoned_timestamp_uses_its_local_date() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-03-01T20:00Z is already March 2nd in UTC+9
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap().with_timezone(&tz);
        let mut ledger = CompletionLedger::new();
        ledger.toggle(ts);
        assert!(ledger.contains(d(2024, 3, 2)));
    }

    #[test]
    fn count_between_is_half_open() {
        let ledger: CompletionLedger = [d(2024, 3, 1), d(2024, 3, 3), d(2024, 3, 8)]
            .into_iter()
            .collect();
        assert_eq!(ledger.count_between(d(2024, 3, 1), d(2024, 3, 8)), 2);
        assert_eq!(ledger.count_between(d(2024, 3, 8), d(2024, 3, 1)), 0);
    }

    #[test]
    fn deserializing_duplicates_keeps_one_entry() {
        let ledger: CompletionLedger =
            serde_json::from_str(r#"["2024-03-01","2024-03-01","2024-02-29"]"#).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.iter().next(), Some(d(2024, 2, 29)));
    }
}
