//! Per-habit display points.
//!
//! Points are a pure function of the completion set, frequency, mode and
//! target. Every completion is worth [`POINTS_PER_COMPLETION`]; milestone
//! bonuses are layered on top:
//!
//! - daily and break habits earn [`MILESTONE_BONUS`] each time an unbroken
//!   run of days reaches a multiple of [`DAILY_MILESTONE`];
//! - weekly and monthly build habits earn [`MILESTONE_BONUS`] once per period
//!   that reaches its target, plus another [`MILESTONE_BONUS`] every
//!   [`WEEKLY_MILESTONE`]-th consecutive achieved period.

use chrono::{Duration, NaiveDate};

use crate::habit::{bucket_counts, Cadence, CompletionLedger, Frequency, HabitMode, WeekStart};

pub const POINTS_PER_COMPLETION: u64 = 5;
pub const DAILY_MILESTONE: u32 = 7;
/// Also used for monthly habits.
pub const WEEKLY_MILESTONE: u32 = 4;
pub const MILESTONE_BONUS: u64 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct PointsCalculator {
    week_start: WeekStart,
}

impl PointsCalculator {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn points(&self, ledger: &CompletionLedger, frequency: Frequency, mode: HabitMode) -> u64 {
        let base = ledger.len() as u64 * POINTS_PER_COMPLETION;
        let bonus = match (mode, frequency.cadence()) {
            (HabitMode::Break, _) | (HabitMode::Build, None) => run_bonus(ledger.iter()),
            (HabitMode::Build, Some(cadence)) => self.period_bonus(ledger, cadence, frequency.target()),
        };
        base + bonus
    }

    fn period_bonus(&self, ledger: &CompletionLedger, cadence: Cadence, target: u32) -> u64 {
        let achieved: Vec<NaiveDate> = bucket_counts(ledger.iter(), cadence, self.week_start)
            .into_iter()
            .filter(|(_, count)| *count >= target)
            .map(|(start, _)| start)
            .collect();

        // flat participation bonus
        let mut bonus = achieved.len() as u64 * MILESTONE_BONUS;

        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for start in achieved {
            run = match prev {
                Some(p) if cadence.is_adjacent(p, start) => run + 1,
                _ => 1,
            };
            if run % WEEKLY_MILESTONE == 0 {
                bonus += MILESTONE_BONUS;
            }
            prev = Some(start);
        }
        bonus
    }
}

/// Milestone bonus from consecutive-day runs in an ascending day sequence.
fn run_bonus<I>(days: I) -> u64
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut bonus = 0;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        if run % DAILY_MILESTONE == 0 {
            bonus += MILESTONE_BONUS;
        }
        prev = Some(day);
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn consecutive(start: NaiveDate, n: i64) -> CompletionLedger {
        (0..n).map(|i| start + Duration::days(i)).collect()
    }

    #[test]
    fn empty_ledger_scores_zero() {
        let calc = PointsCalculator::default();
        let empty = CompletionLedger::new();
        assert_eq!(calc.points(&empty, Frequency::Daily, HabitMode::Build), 0);
        assert_eq!(calc.points(&empty, Frequency::weekly(3).unwrap(), HabitMode::Build), 0);
    }

    #[test]
    fn seven_day_run_earns_one_bonus() {
        let calc = PointsCalculator::default();
        let l = consecutive(d(2024, 1, 1), 7);
        assert_eq!(calc.points(&l, Frequency::Daily, HabitMode::Build), 7 * 5 + 10);
        let l = consecutive(d(2024, 1, 1), 6);
        assert_eq!(calc.points(&l, Frequency::Daily, HabitMode::Build), 30);
    }

    #[test]
    fn gap_resets_run_counter() {
        let calc = PointsCalculator::default();
        let mut l = consecutive(d(2024, 1, 1), 6);
        // skip Jan 7, then six more days: neither run reaches 7
        for i in 0..6 {
            l.toggle(d(2024, 1, 8) + Duration::days(i));
        }
        assert_eq!(calc.points(&l, Frequency::Daily, HabitMode::Break), 12 * 5);
    }

    #[test]
    fn fourteen_day_run_earns_two_bonuses() {
        let calc = PointsCalculator::default();
        let l = consecutive(d(2024, 2, 20), 14);
        assert_eq!(calc.points(&l, Frequency::Daily, HabitMode::Break), 14 * 5 + 20);
    }

    #[test]
    fn break_mode_ignores_period_targets() {
        let calc = PointsCalculator::default();
        let l = consecutive(d(2024, 1, 1), 7);
        assert_eq!(
            calc.points(&l, Frequency::weekly(2).unwrap(), HabitMode::Break),
            7 * 5 + 10
        );
    }

    #[test]
    fn weekly_flat_bonus_per_achieved_week() {
        let calc = PointsCalculator::new(WeekStart::Monday);
        let l: CompletionLedger = [d(2024, 6, 10), d(2024, 6, 11), d(2024, 6, 12)]
            .into_iter()
            .collect();
        let weekly3 = Frequency::weekly(3).unwrap();
        assert_eq!(calc.points(&l, weekly3, HabitMode::Build), 15 + 10);

        let l: CompletionLedger = [d(2024, 6, 10), d(2024, 6, 11)].into_iter().collect();
        assert_eq!(calc.points(&l, weekly3, HabitMode::Build), 10);
    }

    #[test]
    fn fourth_consecutive_week_adds_streak_bonus() {
        let calc = PointsCalculator::new(WeekStart::Monday);
        let mondays: CompletionLedger = (0..4).map(|w| d(2024, 6, 3) + Duration::weeks(w)).collect();
        let weekly1 = Frequency::weekly(1).unwrap();
        // base 20 + four flat bonuses + one streak bonus
        assert_eq!(calc.points(&mondays, weekly1, HabitMode::Build), 20 + 40 + 10);

        // break the chain: weeks 0,1,2 then 4,5,6
        let gappy: CompletionLedger = [0, 1, 2, 4, 5, 6]
            .into_iter()
            .map(|w| d(2024, 6, 3) + Duration::weeks(w))
            .collect();
        assert_eq!(calc.points(&gappy, weekly1, HabitMode::Build), 30 + 60);
    }

    #[test]
    fn monthly_uses_month_adjacency() {
        let calc = PointsCalculator::default();
        let months: CompletionLedger = [d(2023, 10, 5), d(2023, 11, 30), d(2023, 12, 1), d(2024, 1, 15)]
            .into_iter()
            .collect();
        let monthly1 = Frequency::monthly(1).unwrap();
        assert_eq!(calc.points(&months, monthly1, HabitMode::Build), 20 + 40 + 10);

        let monthly2 = Frequency::monthly(2).unwrap();
        assert_eq!(calc.points(&months, monthly2, HabitMode::Build), 20);
    }
}
