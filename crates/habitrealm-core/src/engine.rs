//! The habit progression aggregate.
//!
//! [`HabitEngine`] owns every habit, the progression account and the user
//! preferences. All mutations go through it and run to completion before
//! returning, so a single `&mut HabitEngine` is the whole critical section.
//! Wrap it in [`crate::SharedEngine`] when several threads need access.

use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::habit::{Habit, HabitId, HabitMode, HabitPatch, IntoDay, NewHabit, WeekStart};
use crate::progression::{Award, AwardKind, ProgressionAccount};
use crate::trophy::{self, TrophyEvaluator, TrophyGroup, TrophySignals};

/// Source of "today" for streak and trophy windows.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// User preferences that influence derived stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub week_start: WeekStart,
}

/// Full engine state as handed to the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub account: ProgressionAccount,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub emoji_streak: u32,
}

/// Result of one ToggleCompletion transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub habit_id: HabitId,
    pub day: NaiveDate,
    pub present: bool,
    pub streak: u32,
    pub points: u64,
    pub events: Vec<Event>,
}

/// Read-only projection of a habit for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    pub id: HabitId,
    pub name: String,
    pub frequency: &'static str,
    pub target: u32,
    pub mode: HabitMode,
    pub archived: bool,
    pub streak: u32,
    pub points: u64,
    pub completions: usize,
    pub period_count: u32,
    pub percent_to_target: u32,
    pub done_today: bool,
}

/// Read-only projection of the account for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub essence: u64,
    pub points: u64,
    pub level: u32,
    pub essence_into_level: u64,
    pub essence_for_next_level: u64,
    pub level_progress: f64,
    pub total_points: u64,
    pub longest_streak: u32,
    pub days_used: u32,
    pub unlocked: Vec<String>,
    pub owned_collectibles: Vec<String>,
    pub applied_collectibles: Vec<String>,
}

/// Catalog entry joined with the account's unlock state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophyStatus {
    pub id: &'static str,
    pub label: &'static str,
    pub group: TrophyGroup,
    pub threshold: u32,
    pub unlocked: bool,
}

pub struct HabitEngine {
    pub(crate) habits: Vec<Habit>,
    pub(crate) account: ProgressionAccount,
    pub(crate) preferences: Preferences,
    pub(crate) emoji_streak: u32,
    clock: Box<dyn Clock>,
    evaluator: TrophyEvaluator,
}

impl fmt::Debug for HabitEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HabitEngine")
            .field("habits", &self.habits.len())
            .field("account", &self.account)
            .field("preferences", &self.preferences)
            .field("emoji_streak", &self.emoji_streak)
            .finish_non_exhaustive()
    }
}

impl Default for HabitEngine {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl HabitEngine {
    /// Empty engine using the system clock.
    pub fn new(preferences: Preferences) -> Self {
        Self {
            habits: Vec::new(),
            account: ProgressionAccount::new(),
            preferences,
            emoji_streak: 0,
            clock: Box::new(SystemClock),
            evaluator: TrophyEvaluator::default(),
        }
    }

    /// Restore from a snapshot using the system clock.
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Self {
        Self::restore(snapshot, SystemClock)
    }

    /// Restore from a snapshot. Cached habit stats are recomputed, not
    /// trusted, and trophies that came due since the snapshot are unlocked.
    pub fn restore(snapshot: EngineSnapshot, clock: impl Clock + 'static) -> Self {
        let mut engine = Self::new(snapshot.preferences).with_clock(clock);
        engine.habits = snapshot.habits;
        engine.account = snapshot.account;
        engine.emoji_streak = snapshot.emoji_streak;
        engine.recompute_habits(false);
        let level = engine.account.level();
        let mut events = Vec::new();
        engine.settle(level, &mut events);
        if !events.is_empty() {
            debug!(count = events.len(), "state settled on restore");
        }
        engine
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            habits: self.habits.clone(),
            account: self.account.clone(),
            preferences: self.preferences,
            emoji_streak: self.emoji_streak,
        }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: &HabitId) -> Result<&Habit> {
        let idx = self.position(id)?;
        Ok(&self.habits[idx])
    }

    pub fn account(&self) -> &ProgressionAccount {
        &self.account
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn emoji_streak(&self) -> u32 {
        self.emoji_streak
    }

    fn position(&self, id: &HabitId) -> Result<usize, ValidationError> {
        self.habits
            .iter()
            .position(|h| &h.id == id)
            .ok_or_else(|| ValidationError::HabitNotFound(id.clone()))
    }

    // ── Habit lifecycle ─────────────────────────────────────────────────

    pub fn add_habit(&mut self, input: NewHabit) -> Result<HabitId> {
        let habit = Habit::new(input, Utc::now())?;
        let id = habit.id.clone();
        info!(habit_id = %id, name = %habit.name, frequency = habit.frequency.label(), "habit added");
        self.habits.push(habit);
        Ok(id)
    }

    /// Toggle one day on a habit and settle every derived aggregate.
    ///
    /// Runs as one transaction: ledger flip, completion award or revoke,
    /// full stat recompute, period bonus reconcile for weekly and monthly
    /// habits, lifetime total update, longest-streak recompute and trophy
    /// merge.
    pub fn toggle_completion(&mut self, habit_id: &HabitId, date: impl IntoDay) -> Result<ToggleOutcome> {
        let day = date.into_day();
        let idx = self.position(habit_id)?;
        let today = self.today();
        let week_start = self.preferences.week_start;
        let level_before = self.account.level();
        let mut events = Vec::new();

        let habit = &mut self.habits[idx];
        let present = habit.completions.toggle(day);
        events.push(Event::CompletionToggled {
            habit_id: habit_id.clone(),
            day,
            present,
            at: Utc::now(),
        });

        if let Some(award) = self.account.awards.reconcile_completion(habit_id, day, present) {
            self.account.apply(award);
            events.push(completion_event(habit_id, day, award));
        }

        let (before, after) = habit.refresh(today, week_start);

        if let Some(cadence) = habit.frequency.cadence() {
            let period_start = cadence.start_of(day, week_start);
            let period_end = cadence.next(period_start, week_start);
            let count = habit.completions.count_between(period_start, period_end);
            let reached = count >= habit.frequency.target();
            if let Some(award) = self
                .account
                .awards
                .reconcile_period(habit_id, period_start, reached)
            {
                self.account.apply(award);
                events.push(period_event(habit_id, period_start, award));
            }
        }

        let streak = habit.streak;
        let points = habit.points;
        self.account.adjust_total_points(before, after);
        debug!(habit_id = %habit_id, %day, present, streak, points, "completion toggled");

        self.settle(level_before, &mut events);

        Ok(ToggleOutcome {
            habit_id: habit_id.clone(),
            day,
            present,
            streak,
            points,
            events,
        })
    }

    pub fn edit_habit(&mut self, habit_id: &HabitId, patch: HabitPatch) -> Result<Vec<Event>> {
        let idx = self.position(habit_id)?;
        let today = self.today();
        let week_start = self.preferences.week_start;
        let level_before = self.account.level();

        let habit = &mut self.habits[idx];
        habit.apply_patch(patch)?;
        let (before, after) = habit.refresh(today, week_start);
        self.account.adjust_total_points(before, after);
        info!(habit_id = %habit_id, "habit edited");

        let mut events = vec![Event::HabitEdited {
            habit_id: habit_id.clone(),
            at: Utc::now(),
        }];
        self.reconcile_period_bonuses(idx, &mut events);
        self.settle(level_before, &mut events);
        Ok(events)
    }

    /// Remove a habit. Its award receipts and its share of the lifetime
    /// total stay where they are.
    pub fn delete_habit(&mut self, habit_id: &HabitId) -> Result<Vec<Event>> {
        let idx = self.position(habit_id)?;
        let level_before = self.account.level();
        let removed = self.habits.remove(idx);
        info!(habit_id = %habit_id, name = %removed.name, "habit deleted");

        let mut events = vec![Event::HabitDeleted {
            habit_id: habit_id.clone(),
            at: Utc::now(),
        }];
        self.settle(level_before, &mut events);
        Ok(events)
    }

    pub fn archive_habit(&mut self, habit_id: &HabitId) -> Result<Vec<Event>> {
        self.set_archived(habit_id, true)
    }

    pub fn unarchive_habit(&mut self, habit_id: &HabitId) -> Result<Vec<Event>> {
        self.set_archived(habit_id, false)
    }

    fn set_archived(&mut self, habit_id: &HabitId, archived: bool) -> Result<Vec<Event>> {
        let idx = self.position(habit_id)?;
        let level_before = self.account.level();
        self.habits[idx].archived = archived;
        let mut events = vec![Event::HabitArchived {
            habit_id: habit_id.clone(),
            archived,
            at: Utc::now(),
        }];
        self.settle(level_before, &mut events);
        Ok(events)
    }

    // ── Account operations ──────────────────────────────────────────────

    pub fn purchase_collectible(&mut self, collectible_id: &str, cost: u64) -> Result<Event> {
        self.account.purchase(collectible_id, cost)?;
        info!(collectible_id, cost, remaining = self.account.points(), "collectible purchased");
        Ok(Event::CollectiblePurchased {
            collectible_id: collectible_id.to_string(),
            cost,
            at: Utc::now(),
        })
    }

    pub fn apply_collectible(&mut self, collectible_id: &str) -> Result<Event> {
        self.account.apply_collectible(collectible_id)?;
        Ok(Event::CollectibleApplied {
            collectible_id: collectible_id.to_string(),
            applied: true,
            at: Utc::now(),
        })
    }

    pub fn unapply_collectible(&mut self, collectible_id: &str) -> Event {
        self.account.unapply_collectible(collectible_id);
        Event::CollectibleApplied {
            collectible_id: collectible_id.to_string(),
            applied: false,
            at: Utc::now(),
        }
    }

    /// Change the week-start preference and recompute every habit.
    pub fn set_week_start(&mut self, week_start: WeekStart) -> Vec<Event> {
        let level_before = self.account.level();
        self.preferences.week_start = week_start;
        self.recompute_habits(true);
        let mut events = vec![Event::WeekStartChanged {
            week_start,
            at: Utc::now(),
        }];
        for idx in 0..self.habits.len() {
            self.reconcile_period_bonuses(idx, &mut events);
        }
        self.settle(level_before, &mut events);
        events
    }

    /// Feed the emoji journal's longest consecutive run into trophy evaluation.
    pub fn set_emoji_streak(&mut self, streak: u32) -> Vec<Event> {
        let level_before = self.account.level();
        self.emoji_streak = streak;
        let mut events = Vec::new();
        self.settle(level_before, &mut events);
        events
    }

    /// Count a day toward the lifetime days-used counter.
    pub fn record_day_used(&mut self, day: impl IntoDay) -> Vec<Event> {
        let mut events = Vec::new();
        if self.account.record_day_used(day.into_day()) {
            let level_before = self.account.level();
            self.settle(level_before, &mut events);
        }
        events
    }

    /// Recompute every habit against today's date, e.g. after midnight.
    pub fn recompute(&mut self) -> Vec<Event> {
        let level_before = self.account.level();
        self.recompute_habits(true);
        let mut events = Vec::new();
        self.settle(level_before, &mut events);
        events
    }

    /// Explicit full reset. The only operation that clears unlocked trophies.
    pub fn wipe(&mut self) -> Event {
        info!(habits = self.habits.len(), "wiping all state");
        self.habits.clear();
        self.account = ProgressionAccount::new();
        self.emoji_streak = 0;
        Event::StateWiped { at: Utc::now() }
    }

    // ── Projections ─────────────────────────────────────────────────────

    pub fn habit_view(&self, habit_id: &HabitId) -> Result<HabitView> {
        Ok(self.view_of(self.habit(habit_id)?))
    }

    pub fn habit_views(&self, include_archived: bool) -> Vec<HabitView> {
        self.habits
            .iter()
            .filter(|h| include_archived || !h.archived)
            .map(|h| self.view_of(h))
            .collect()
    }

    fn view_of(&self, habit: &Habit) -> HabitView {
        let today = self.today();
        let week_start = self.preferences.week_start;
        HabitView {
            id: habit.id.clone(),
            name: habit.name.clone(),
            frequency: habit.frequency.label(),
            target: habit.frequency.target(),
            mode: habit.mode,
            archived: habit.archived,
            streak: habit.streak,
            points: habit.points,
            completions: habit.completions.len(),
            period_count: habit.period_count(today, week_start),
            percent_to_target: habit.percent_to_target(today, week_start),
            done_today: habit.completions.contains(today),
        }
    }

    pub fn account_view(&self) -> AccountView {
        let a = &self.account;
        AccountView {
            essence: a.essence(),
            points: a.points(),
            level: a.level(),
            essence_into_level: a.essence_into_level(),
            essence_for_next_level: a.essence_for_next_level(),
            level_progress: a.level_progress(),
            total_points: a.total_points(),
            longest_streak: a.longest_streak(),
            days_used: a.days_used(),
            unlocked: a.unlocked().iter().cloned().collect(),
            owned_collectibles: a.owned_collectibles().iter().cloned().collect(),
            applied_collectibles: a.applied_collectibles().iter().cloned().collect(),
        }
    }

    pub fn trophy_statuses(&self) -> Vec<TrophyStatus> {
        self.evaluator
            .catalog()
            .iter()
            .map(|def| TrophyStatus {
                id: def.id,
                label: def.label,
                group: def.group,
                threshold: def.threshold,
                unlocked: self.account.is_unlocked(def.id),
            })
            .collect()
    }

    pub fn trophy_signals(&self) -> TrophySignals {
        TrophySignals::collect(
            &self.habits,
            self.today(),
            self.emoji_streak,
            self.account.days_used(),
        )
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Recompute cached stats of every habit, optionally folding point
    /// changes into the lifetime total.
    pub(crate) fn recompute_habits(&mut self, track_total: bool) {
        let today = self.today();
        let week_start = self.preferences.week_start;
        for habit in &mut self.habits {
            let (before, after) = habit.refresh(today, week_start);
            if track_total {
                self.account.adjust_total_points(before, after);
            }
        }
    }

    /// Bring a habit's period receipts in line with the buckets that reach
    /// its current target, paying or revoking the difference.
    fn reconcile_period_bonuses(&mut self, idx: usize, events: &mut Vec<Event>) {
        let habit = &self.habits[idx];
        let habit_id = habit.id.clone();
        let achieved = habit.achieved_periods(self.preferences.week_start);
        let held = self.account.awards.period_starts_of(&habit_id);
        for period_start in held.union(&achieved).copied().collect::<Vec<_>>() {
            let reached = achieved.contains(&period_start);
            if let Some(award) = self
                .account
                .awards
                .reconcile_period(&habit_id, period_start, reached)
            {
                self.account.apply(award);
                events.push(period_event(&habit_id, period_start, award));
            }
        }
    }

    fn update_longest_streak(&mut self) {
        let longest = self.habits.iter().map(Habit::streak).max().unwrap_or(0);
        self.account.set_longest_streak(longest);
    }

    /// Longest-streak recompute, trophy merge and level-change reporting.
    pub(crate) fn settle(&mut self, level_before: u32, events: &mut Vec<Event>) {
        self.update_longest_streak();

        let signals = self.trophy_signals();
        let met = self.evaluator.met(&signals);
        let newly = self.account.unlock(met.iter().map(|def| def.id.to_string()));
        for trophy_id in newly {
            let label = trophy::find(&trophy_id).map_or("", |def| def.label);
            info!(%trophy_id, label, "trophy unlocked");
            events.push(Event::TrophyUnlocked {
                label: label.to_string(),
                trophy_id,
                at: Utc::now(),
            });
        }

        let level_after = self.account.level();
        if level_after != level_before {
            info!(from = level_before, to = level_after, "level changed");
            events.push(Event::LevelChanged {
                from: level_before,
                to: level_after,
            });
        }
    }
}

fn completion_event(habit_id: &HabitId, day: NaiveDate, award: Award) -> Event {
    info!(habit_id = %habit_id, %day, ?award, "completion award");
    match award {
        Award::Granted(_) => Event::CompletionAwarded {
            habit_id: habit_id.clone(),
            day,
            amount: award.amount(),
        },
        Award::Revoked(_) => Event::CompletionRevoked {
            habit_id: habit_id.clone(),
            day,
            amount: award.amount(),
        },
    }
}

fn period_event(habit_id: &HabitId, period_start: NaiveDate, award: Award) -> Event {
    debug_assert_eq!(award.kind(), AwardKind::PeriodBonus);
    info!(habit_id = %habit_id, %period_start, ?award, "period bonus");
    match award {
        Award::Granted(_) => Event::PeriodBonusAwarded {
            habit_id: habit_id.clone(),
            period_start,
            amount: award.amount(),
        },
        Award::Revoked(_) => Event::PeriodBonusRevoked {
            habit_id: habit_id.clone(),
            period_start,
            amount: award.amount(),
        },
    }
}
