//! Streak derivation from a completion ledger.
//!
//! Daily streaks walk backward day by day from the reference day. Weekly and
//! monthly streaks bucket the ledger and walk backward bucket by bucket,
//! counting buckets whose completion count reaches the habit's target. Build
//! and break habits share the algorithm; only the meaning of a marker differs.

use chrono::{Duration, NaiveDate};

use crate::habit::{bucket_counts, Cadence, CompletionLedger, Frequency, WeekStart};

/// Computes current streaks relative to a reference day.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakCalculator {
    week_start: WeekStart,
}

impl StreakCalculator {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    /// Streak for a habit of the given frequency, in that frequency's unit.
    pub fn streak(&self, ledger: &CompletionLedger, frequency: Frequency, ref_day: NaiveDate) -> u32 {
        match frequency {
            Frequency::Daily => self.daily(ledger, ref_day),
            Frequency::Weekly { target } => self.weekly(ledger, target.get(), ref_day),
            Frequency::Monthly { target } => self.monthly(ledger, target.get(), ref_day),
        }
    }

    /// Consecutive marked days ending at `ref_day`.
    pub fn daily(&self, ledger: &CompletionLedger, ref_day: NaiveDate) -> u32 {
        let mut day = ref_day;
        let mut count = 0;
        while ledger.contains(day) {
            count += 1;
            day -= Duration::days(1);
        }
        count
    }

    /// Consecutive achieved weeks ending at the week containing `ref_day`.
    pub fn weekly(&self, ledger: &CompletionLedger, target: u32, ref_day: NaiveDate) -> u32 {
        self.periodic(ledger, Cadence::Week, target, ref_day)
    }

    /// Consecutive achieved calendar months ending at the month containing `ref_day`.
    pub fn monthly(&self, ledger: &CompletionLedger, target: u32, ref_day: NaiveDate) -> u32 {
        self.periodic(ledger, Cadence::Month, target, ref_day)
    }

    fn periodic(&self, ledger: &CompletionLedger, cadence: Cadence, target: u32, ref_day: NaiveDate) -> u32 {
        if ledger.is_empty() {
            return 0;
        }
        let target = target.max(1);
        let buckets = bucket_counts(ledger.iter(), cadence, self.week_start);

        let mut start = cadence.start_of(ref_day, self.week_start);
        let mut count = 0;
        while buckets.get(&start).is_some_and(|n| *n >= target) {
            count += 1;
            start = cadence.previous(start, self.week_start);
        }
        count
    }
}

/// Longest run of consecutive days in an ascending day sequence.
pub fn longest_daily_run<I>(days: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            Some(p) if day == p => run,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ledger(days: &[NaiveDate]) -> CompletionLedger {
        days.iter().copied().collect()
    }

    #[test]
    fn empty_ledger_has_no_streak() {
        let calc = StreakCalculator::default();
        let empty = CompletionLedger::new();
        let today = d(2024, 6, 10);
        assert_eq!(calc.streak(&empty, Frequency::Daily, today), 0);
        assert_eq!(calc.streak(&empty, Frequency::weekly(2).unwrap(), today), 0);
        assert_eq!(calc.streak(&empty, Frequency::monthly(1).unwrap(), today), 0);
    }

    #[test]
    fn daily_streak_stops_at_first_gap() {
        let today = d(2024, 6, 10);
        let l = ledger(&[today, d(2024, 6, 9), d(2024, 6, 8), d(2024, 6, 6), d(2024, 6, 5)]);
        assert_eq!(StreakCalculator::default().daily(&l, today), 3);
    }

    #[test]
    fn daily_streak_is_zero_when_ref_day_missing() {
        let l = ledger(&[d(2024, 6, 9), d(2024, 6, 8)]);
        assert_eq!(StreakCalculator::default().daily(&l, d(2024, 6, 10)), 0);
        assert_eq!(StreakCalculator::default().daily(&l, d(2024, 6, 9)), 2);
    }

    #[test]
    fn weekly_streak_counts_achieved_weeks() {
        let calc = StreakCalculator::new(WeekStart::Monday);
        // Weeks starting 2024-05-27, 06-03, 06-10 (Mondays)
        let l = ledger(&[
            d(2024, 5, 27),
            d(2024, 5, 28),
            d(2024, 6, 3),
            d(2024, 6, 5),
            d(2024, 6, 10),
            d(2024, 6, 11),
        ]);
        assert_eq!(calc.weekly(&l, 2, d(2024, 6, 12)), 3);
        assert_eq!(calc.weekly(&l, 3, d(2024, 6, 12)), 0);
    }

    #[test]
    fn weekly_target_three_monday_start() {
        let calc = StreakCalculator::new(WeekStart::Monday);
        let mon = d(2024, 6, 10);
        let full = ledger(&[mon, d(2024, 6, 11), d(2024, 6, 12)]);
        let partial = ledger(&[mon, d(2024, 6, 11)]);
        assert_eq!(calc.weekly(&full, 3, d(2024, 6, 16)), 1);
        assert_eq!(calc.weekly(&partial, 3, d(2024, 6, 16)), 0);
    }

    #[test]
    fn week_start_changes_bucketing() {
        // Sunday 06-09 + Monday 06-10: one Sunday-week, two Monday-weeks
        let l = ledger(&[d(2024, 6, 9), d(2024, 6, 10)]);
        let ref_day = d(2024, 6, 11);
        assert_eq!(StreakCalculator::new(WeekStart::Sunday).weekly(&l, 2, ref_day), 1);
        assert_eq!(StreakCalculator::new(WeekStart::Monday).weekly(&l, 2, ref_day), 0);
        assert_eq!(StreakCalculator::new(WeekStart::Monday).weekly(&l, 1, ref_day), 2);
    }

    #[test]
    fn monthly_streak_crosses_year_boundary() {
        let calc = StreakCalculator::default();
        let l = ledger(&[d(2023, 11, 3), d(2023, 12, 24), d(2024, 1, 2)]);
        assert_eq!(calc.monthly(&l, 1, d(2024, 1, 31)), 3);
        assert_eq!(calc.monthly(&l, 1, d(2024, 2, 1)), 0);
    }

    #[test]
    fn longest_run_finds_best_segment() {
        let days = [d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 4), d(2024, 1, 5), d(2024, 1, 6)];
        assert_eq!(longest_daily_run(days), 3);
        assert_eq!(longest_daily_run(std::iter::empty()), 0);
    }
}
