//! Idempotent one-time reward bookkeeping.
//!
//! Each reward is guarded by a receipt key. A reward is granted only on the
//! transition "key absent -> qualifying" and revoked only on "key present ->
//! no longer qualifying", so toggling the same day or period on and off any
//! number of times nets to zero.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::HabitId;

/// Essence and points granted for a newly completed day.
pub const COMPLETION_REWARD: u64 = 5;
/// Essence and points granted when a week or month first reaches its target.
pub const PERIOD_BONUS_REWARD: u64 = 10;

/// Receipt for a rewarded `(habit, day)` completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionAwardKey {
    pub habit_id: HabitId,
    pub day: NaiveDate,
}

/// Receipt for a rewarded `(habit, period start)` target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBonusKey {
    pub habit_id: HabitId,
    pub period_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    Completion,
    PeriodBonus,
}

impl AwardKind {
    /// Essence and points carried by one award of this kind.
    pub fn amount(self) -> u64 {
        match self {
            AwardKind::Completion => COMPLETION_REWARD,
            AwardKind::PeriodBonus => PERIOD_BONUS_REWARD,
        }
    }
}

/// A currency movement produced by a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    Granted(AwardKind),
    Revoked(AwardKind),
}

impl Award {
    pub fn kind(self) -> AwardKind {
        match self {
            Award::Granted(kind) | Award::Revoked(kind) => kind,
        }
    }

    pub fn amount(self) -> u64 {
        self.kind().amount()
    }
}

/// The two receipt namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardLedger {
    #[serde(default)]
    completion_award_keys: BTreeSet<CompletionAwardKey>,
    #[serde(default)]
    period_bonus_keys: BTreeSet<PeriodBonusKey>,
}

impl AwardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the receipt for `(habit, day)` with the day's presence in the ledger.
    pub fn reconcile_completion(&mut self, habit_id: &HabitId, day: NaiveDate, present: bool) -> Option<Award> {
        let key = CompletionAwardKey {
            habit_id: habit_id.clone(),
            day,
        };
        transition(&mut self.completion_award_keys, key, present, AwardKind::Completion)
    }

    /// Reconcile the receipt for `(habit, period)` with whether the period meets its target.
    pub fn reconcile_period(
        &mut self,
        habit_id: &HabitId,
        period_start: NaiveDate,
        reached: bool,
    ) -> Option<Award> {
        let key = PeriodBonusKey {
            habit_id: habit_id.clone(),
            period_start,
        };
        transition(&mut self.period_bonus_keys, key, reached, AwardKind::PeriodBonus)
    }

    pub fn has_completion(&self, habit_id: &HabitId, day: NaiveDate) -> bool {
        self.completion_award_keys.contains(&CompletionAwardKey {
            habit_id: habit_id.clone(),
            day,
        })
    }

    pub fn has_period_bonus(&self, habit_id: &HabitId, period_start: NaiveDate) -> bool {
        self.period_bonus_keys.contains(&PeriodBonusKey {
            habit_id: habit_id.clone(),
            period_start,
        })
    }

    pub fn completion_keys(&self) -> impl Iterator<Item = &CompletionAwardKey> {
        self.completion_award_keys.iter()
    }

    pub fn period_keys(&self) -> impl Iterator<Item = &PeriodBonusKey> {
        self.period_bonus_keys.iter()
    }

    /// Period starts currently holding a bonus receipt for `habit_id`.
    pub fn period_starts_of(&self, habit_id: &HabitId) -> BTreeSet<NaiveDate> {
        self.period_bonus_keys
            .iter()
            .filter(|key| &key.habit_id == habit_id)
            .map(|key| key.period_start)
            .collect()
    }

    /// Replace every receipt of `habit_id` with one per completed day and
    /// achieved period. Moves no currency.
    pub fn resync_habit<D, P>(&mut self, habit_id: &HabitId, days: D, periods: P)
    where
        D: IntoIterator<Item = NaiveDate>,
        P: IntoIterator<Item = NaiveDate>,
    {
        self.completion_award_keys.retain(|key| &key.habit_id != habit_id);
        self.period_bonus_keys.retain(|key| &key.habit_id != habit_id);
        self.completion_award_keys
            .extend(days.into_iter().map(|day| CompletionAwardKey {
                habit_id: habit_id.clone(),
                day,
            }));
        self.period_bonus_keys
            .extend(periods.into_iter().map(|period_start| PeriodBonusKey {
                habit_id: habit_id.clone(),
                period_start,
            }));
    }
}

fn transition<K: Ord>(keys: &mut BTreeSet<K>, key: K, qualifies: bool, kind: AwardKind) -> Option<Award> {
    match (qualifies, keys.contains(&key)) {
        (true, false) => {
            keys.insert(key);
            Some(Award::Granted(kind))
        }
        (false, true) => {
            keys.remove(&key);
            Some(Award::Revoked(kind))
        }
        _ => None,
    }
}
