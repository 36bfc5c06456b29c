//! Calendar bucketing for weekly and monthly habits.
//!
//! A period is identified by its first day: the configured week-start day for
//! weeks, the 1st for months.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// First day of the week. A global runtime preference, not per-habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
}

impl WeekStart {
    /// Start of the week containing `day`.
    pub fn week_of(self, day: NaiveDate) -> NaiveDate {
        let offset = match self {
            WeekStart::Sunday => day.weekday().num_days_from_sunday(),
            WeekStart::Monday => day.weekday().num_days_from_monday(),
        };
        day - Duration::days(i64::from(offset))
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekStart::Sunday => write!(f, "sunday"),
            WeekStart::Monday => write!(f, "monday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            _ => Err(format!("Unknown week start: {s}")),
        }
    }
}

/// Bucket size used by weekly and monthly habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Week,
    Month,
}

impl Cadence {
    /// First day of the bucket containing `day`.
    pub fn start_of(self, day: NaiveDate, week_start: WeekStart) -> NaiveDate {
        match self {
            Cadence::Week => week_start.week_of(day),
            Cadence::Month => day - Duration::days(i64::from(day.day0())),
        }
    }

    /// Start of the bucket immediately before the one starting at `start`.
    pub fn previous(self, start: NaiveDate, week_start: WeekStart) -> NaiveDate {
        match self {
            Cadence::Week => start - Duration::days(7),
            Cadence::Month => self.start_of(start - Duration::days(1), week_start),
        }
    }

    /// Start of the bucket immediately after the one starting at `start`.
    pub fn next(self, start: NaiveDate, week_start: WeekStart) -> NaiveDate {
        match self {
            Cadence::Week => start + Duration::days(7),
            Cadence::Month => {
                let len = days_in_month(start);
                self.start_of(start + Duration::days(len), week_start)
            }
        }
    }

    /// Whether `later` is exactly one bucket after `earlier` (both bucket starts).
    pub fn is_adjacent(self, earlier: NaiveDate, later: NaiveDate) -> bool {
        match self {
            Cadence::Week => (later - earlier).num_days() == 7,
            Cadence::Month => month_index(later) - month_index(earlier) == 1,
        }
    }
}

/// Count days per bucket. Keys are bucket starts in chronological order.
pub fn bucket_counts<I>(days: I, cadence: Cadence, week_start: WeekStart) -> BTreeMap<NaiveDate, u32>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut buckets = BTreeMap::new();
    for day in days {
        *buckets.entry(cadence.start_of(day, week_start)).or_insert(0) += 1;
    }
    buckets
}

fn month_index(day: NaiveDate) -> i32 {
    day.year() * 12 + day.month0() as i32
}

fn days_in_month(start: NaiveDate) -> i64 {
    match start.month() {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if NaiveDate::from_ymd_opt(start.year(), 2, 29).is_some() => 29,
        _ => 28,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_start_monday_and_sunday() {
        // 2024-05-15 is a Wednesday
        let wed = d(2024, 5, 15);
        assert_eq!(WeekStart::Monday.week_of(wed), d(2024, 5, 13));
        assert_eq!(WeekStart::Sunday.week_of(wed), d(2024, 5, 12));

        let sunday = d(2024, 5, 19);
        assert_eq!(WeekStart::Monday.week_of(sunday), d(2024, 5, 13));
        assert_eq!(WeekStart::Sunday.week_of(sunday), sunday);
    }

    #[test]
    fn month_buckets_walk_across_year_boundary() {
        let ws = WeekStart::Monday;
        let jan = Cadence::Month.start_of(d(2024, 1, 20), ws);
        assert_eq!(jan, d(2024, 1, 1));
        assert_eq!(Cadence::Month.previous(jan, ws), d(2023, 12, 1));
        assert_eq!(Cadence::Month.next(d(2023, 12, 1), ws), jan);
        assert_eq!(Cadence::Month.next(d(2024, 2, 1), ws), d(2024, 3, 1));
        assert!(Cadence::Month.is_adjacent(d(2023, 12, 1), jan));
        assert!(!Cadence::Month.is_adjacent(d(2023, 11, 1), jan));
    }

    #[test]
    fn week_adjacency() {
        assert!(Cadence::Week.is_adjacent(d(2024, 5, 6), d(2024, 5, 13)));
        assert!(!Cadence::Week.is_adjacent(d(2024, 5, 6), d(2024, 5, 20)));
    }

    #[test]
    fn bucket_counts_groups_by_week() {
        let days = [d(2024, 5, 13), d(2024, 5, 14), d(2024, 5, 20)];
        let buckets = bucket_counts(days, Cadence::Week, WeekStart::Monday);
        assert_eq!(buckets.get(&d(2024, 5, 13)), Some(&2));
        assert_eq!(buckets.get(&d(2024, 5, 20)), Some(&1));
    }

    #[test]
    fn week_start_parses_case_insensitively() {
        assert_eq!("Sunday".parse::<WeekStart>(), Ok(WeekStart::Sunday));
        assert_eq!("mon".parse::<WeekStart>(), Ok(WeekStart::Monday));
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
