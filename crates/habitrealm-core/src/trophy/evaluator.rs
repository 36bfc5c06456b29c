//! Monotonic trophy evaluation.
//!
//! The evaluator reads a [`TrophySignals`] summary of the current state and
//! reports which catalog entries are met. Callers union the result into the
//! account's unlocked set; nothing here ever removes an id.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::catalog::{TrophyDef, TrophyGroup, CATALOG};
use crate::habit::{Frequency, Habit, HabitMode};

/// Aggregate inputs to every trophy predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrophySignals {
    pub max_daily_build_streak: u32,
    pub max_daily_break_streak: u32,
    pub max_weekly_streak: u32,
    pub max_monthly_streak: u32,
    /// Best streak among build habits of any frequency.
    pub max_build_streak: u32,
    /// Best streak among break habits of any frequency.
    pub max_break_streak: u32,
    pub total_completions: u64,
    /// Distinct calendar days with at least one completion on any habit.
    pub active_days: u32,
    /// Consecutive days ending today on which every active daily habit was completed.
    pub focus_run: u32,
    /// Consecutive days ending today with at least one completion on any habit.
    pub persistence_run: u32,
    pub emoji_streak: u32,
    pub days_used: u32,
}

impl TrophySignals {
    pub fn collect(habits: &[Habit], today: NaiveDate, emoji_streak: u32, days_used: u32) -> Self {
        let mut signals = TrophySignals {
            emoji_streak,
            days_used,
            ..Default::default()
        };

        for habit in habits {
            let streak = habit.streak();
            match (habit.frequency(), habit.mode()) {
                (Frequency::Daily, HabitMode::Build) => {
                    signals.max_daily_build_streak = signals.max_daily_build_streak.max(streak)
                }
                (Frequency::Daily, HabitMode::Break) => {
                    signals.max_daily_break_streak = signals.max_daily_break_streak.max(streak)
                }
                (Frequency::Weekly { .. }, _) => {
                    signals.max_weekly_streak = signals.max_weekly_streak.max(streak)
                }
                (Frequency::Monthly { .. }, _) => {
                    signals.max_monthly_streak = signals.max_monthly_streak.max(streak)
                }
            }
            match habit.mode() {
                HabitMode::Build => signals.max_build_streak = signals.max_build_streak.max(streak),
                HabitMode::Break => signals.max_break_streak = signals.max_break_streak.max(streak),
            }
            signals.total_completions += habit.completions().len() as u64;
        }

        let mut days: Vec<NaiveDate> = habits.iter().flat_map(|h| h.completions().iter()).collect();
        days.sort_unstable();
        days.dedup();
        signals.active_days = days.len() as u32;

        signals.persistence_run = run_back_from(today, |day| days.binary_search(&day).is_ok());

        let active_daily: Vec<&Habit> = habits
            .iter()
            .filter(|h| !h.is_archived() && h.frequency().is_daily())
            .collect();
        if !active_daily.is_empty() {
            signals.focus_run =
                run_back_from(today, |day| active_daily.iter().all(|h| h.completions().contains(day)));
        }

        signals
    }
}

fn run_back_from<F>(today: NaiveDate, mut hit: F) -> u32
where
    F: FnMut(NaiveDate) -> bool,
{
    let mut day = today;
    let mut run = 0;
    while hit(day) {
        run += 1;
        day -= Duration::days(1);
    }
    run
}

type Predicate = fn(&TrophySignals, u32) -> bool;

fn daily_build(s: &TrophySignals, t: u32) -> bool {
    s.max_daily_build_streak >= t
}

fn daily_break(s: &TrophySignals, t: u32) -> bool {
    s.max_daily_break_streak >= t
}

fn weekly(s: &TrophySignals, t: u32) -> bool {
    s.max_weekly_streak >= t
}

fn monthly(s: &TrophySignals, t: u32) -> bool {
    s.max_monthly_streak >= t
}

fn totals(s: &TrophySignals, t: u32) -> bool {
    s.total_completions >= u64::from(t)
}

fn milestone(s: &TrophySignals, t: u32) -> bool {
    s.active_days >= t
}

fn emoji(s: &TrophySignals, t: u32) -> bool {
    s.emoji_streak >= t
}

fn balance(s: &TrophySignals, t: u32) -> bool {
    s.max_build_streak >= t && s.max_break_streak >= t
}

fn focus(s: &TrophySignals, t: u32) -> bool {
    s.focus_run >= t
}

fn persistence(s: &TrophySignals, t: u32) -> bool {
    s.persistence_run >= t
}

// The break-then-rebuild window has never been defined; never unlocks.
fn resilience(_: &TrophySignals, _: u32) -> bool {
    false
}

fn dedication(s: &TrophySignals, t: u32) -> bool {
    s.days_used >= t
}

fn never(_: &TrophySignals, _: u32) -> bool {
    false
}

const GROUP_PREDICATES: &[(TrophyGroup, Predicate)] = &[
    (TrophyGroup::DailyBuild, daily_build),
    (TrophyGroup::DailyBreak, daily_break),
    (TrophyGroup::Weekly, weekly),
    (TrophyGroup::Monthly, monthly),
    (TrophyGroup::Totals, totals),
    (TrophyGroup::Milestone, milestone),
    (TrophyGroup::Emoji, emoji),
];

const META_PREDICATES: &[(&str, Predicate)] = &[
    ("meta_balance", balance),
    ("meta_focus", focus),
    ("meta_persistence", persistence),
    ("meta_resilience", resilience),
    ("meta_dedication", dedication),
];

fn predicate_for(def: &TrophyDef) -> Predicate {
    let found = if def.group == TrophyGroup::Meta {
        META_PREDICATES
            .iter()
            .find(|(id, _)| *id == def.id)
            .map(|(_, p)| *p)
    } else {
        GROUP_PREDICATES
            .iter()
            .find(|(group, _)| *group == def.group)
            .map(|(_, p)| *p)
    };
    found.unwrap_or(never)
}

/// Evaluates a trophy catalog against signals.
#[derive(Debug, Clone, Copy)]
pub struct TrophyEvaluator {
    catalog: &'static [TrophyDef],
}

impl Default for TrophyEvaluator {
    fn default() -> Self {
        Self { catalog: CATALOG }
    }
}

impl TrophyEvaluator {
    pub fn with_catalog(catalog: &'static [TrophyDef]) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static [TrophyDef] {
        self.catalog
    }

    pub fn is_met(&self, def: &TrophyDef, signals: &TrophySignals) -> bool {
        predicate_for(def)(signals, def.threshold)
    }

    /// Every catalog entry whose predicate currently holds.
    pub fn met(&self, signals: &TrophySignals) -> Vec<&'static TrophyDef> {
        self.catalog
            .iter()
            .filter(|def| self.is_met(def, signals))
            .collect()
    }
}
