//! Account-level progression: essence, spendable points and level.
//!
//! Currency only moves through [`ProgressionAccount::apply`], which takes an
//! [`Award`] produced by the award ledger. Both balances are floored at zero.
//! The level is always derived from essence, never stored.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::award::{Award, AwardLedger};
use crate::error::CollectibleError;

/// Essence needed to go from level `L` to `L + 1` is `LEVEL_STEP * L`.
pub const LEVEL_STEP: u64 = 100;

/// Cumulative essence at which `level` is reached. Level 1 starts at zero.
/// Saturates at `u64::MAX`.
pub fn essence_for_level(level: u32) -> u64 {
    let l = u128::from(level.max(1));
    let essence = u128::from(LEVEL_STEP) * l * (l - 1) / 2;
    u64::try_from(essence).unwrap_or(u64::MAX)
}

/// Highest level whose threshold is covered by `essence`.
pub fn level_for_essence(essence: u64) -> u32 {
    // largest L with L(L-1) <= 2e / LEVEL_STEP
    let bound = u128::from(essence) * 2 / u128::from(LEVEL_STEP);
    let mut level = (((1.0 + 4.0 * bound as f64).sqrt() + 1.0) / 2.0) as u128;
    level = level.max(1);
    while level > 1 && level * (level - 1) > bound {
        level -= 1;
    }
    while (level + 1) * level <= bound {
        level += 1;
    }
    u32::try_from(level).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionAccount {
    #[serde(default)]
    pub(crate) essence: u64,
    #[serde(default)]
    pub(crate) points: u64,
    /// Lifetime sum of habit point movements. Not reduced by habit deletion.
    #[serde(default)]
    pub(crate) total_points: u64,
    /// Best current streak across existing habits.
    #[serde(default)]
    pub(crate) longest_streak: u32,
    #[serde(default)]
    pub(crate) days_used: u32,
    #[serde(default)]
    pub(crate) last_used_day: Option<NaiveDate>,
    #[serde(flatten)]
    pub(crate) awards: AwardLedger,
    #[serde(default)]
    pub(crate) unlocked: BTreeSet<String>,
    #[serde(default)]
    pub(crate) owned_collectibles: BTreeSet<String>,
    #[serde(default)]
    pub(crate) applied_collectibles: BTreeSet<String>,
}

impl ProgressionAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn essence(&self) -> u64 {
        self.essence
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn level(&self) -> u32 {
        level_for_essence(self.essence)
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn days_used(&self) -> u32 {
        self.days_used
    }

    pub fn awards(&self) -> &AwardLedger {
        &self.awards
    }

    pub fn unlocked(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, trophy_id: &str) -> bool {
        self.unlocked.contains(trophy_id)
    }

    pub fn owned_collectibles(&self) -> &BTreeSet<String> {
        &self.owned_collectibles
    }

    pub fn applied_collectibles(&self) -> &BTreeSet<String> {
        &self.applied_collectibles
    }

    /// Essence earned since the start of the current level.
    pub fn essence_into_level(&self) -> u64 {
        self.essence.saturating_sub(essence_for_level(self.level()))
    }

    /// Essence still needed to reach the next level.
    pub fn essence_for_next_level(&self) -> u64 {
        essence_for_level(self.level().saturating_add(1)).saturating_sub(self.essence)
    }

    /// Fraction of the current level completed, in `0.0..1.0`.
    pub fn level_progress(&self) -> f64 {
        let level = self.level();
        let span = essence_for_level(level.saturating_add(1)).saturating_sub(essence_for_level(level));
        if span == 0 {
            return 0.0;
        }
        self.essence_into_level() as f64 / span as f64
    }

    /// Move both balances by an award, clamping at zero.
    pub fn apply(&mut self, award: Award) {
        let amount = award.amount();
        match award {
            Award::Granted(_) => {
                self.essence = self.essence.saturating_add(amount);
                self.points = self.points.saturating_add(amount);
            }
            Award::Revoked(_) => {
                self.essence = self.essence.saturating_sub(amount);
                self.points = self.points.saturating_sub(amount);
            }
        }
    }

    /// Shift the lifetime total by the net change of one habit's points.
    pub(crate) fn adjust_total_points(&mut self, before: u64, after: u64) {
        if after >= before {
            self.total_points = self.total_points.saturating_add(after - before);
        } else {
            self.total_points = self.total_points.saturating_sub(before - after);
        }
    }

    pub(crate) fn set_longest_streak(&mut self, streak: u32) {
        self.longest_streak = streak;
    }

    /// Count `day` toward days used, once per distinct day. Returns whether it counted.
    pub(crate) fn record_day_used(&mut self, day: NaiveDate) -> bool {
        match self.last_used_day {
            Some(last) if day <= last => false,
            _ => {
                self.days_used = self.days_used.saturating_add(1);
                self.last_used_day = Some(day);
                true
            }
        }
    }

    /// Union `ids` into the unlocked set. Returns only the ids that were new.
    pub(crate) fn unlock<I>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        ids.into_iter()
            .filter(|id| self.unlocked.insert(id.clone()))
            .collect()
    }

    pub(crate) fn purchase(&mut self, id: &str, cost: u64) -> Result<(), CollectibleError> {
        if self.owned_collectibles.contains(id) {
            return Err(CollectibleError::AlreadyOwned(id.to_string()));
        }
        if self.points < cost {
            return Err(CollectibleError::InsufficientPoints {
                id: id.to_string(),
                cost,
                available: self.points,
            });
        }
        self.points -= cost;
        self.owned_collectibles.insert(id.to_string());
        Ok(())
    }

    pub(crate) fn apply_collectible(&mut self, id: &str) -> Result<bool, CollectibleError> {
        if !self.owned_collectibles.contains(id) {
            return Err(CollectibleError::NotOwned(id.to_string()));
        }
        Ok(self.applied_collectibles.insert(id.to_string()))
    }

    pub(crate) fn unapply_collectible(&mut self, id: &str) -> bool {
        self.applied_collectibles.remove(id)
    }

    /// Fold an imported account into this one without lowering anything.
    ///
    /// `recomputed_total` and `recomputed_streak` are derived from the merged
    /// habit list; each lifetime counter becomes the max of local, incoming
    /// and recomputed. Incoming award receipts are not taken over; the
    /// caller rebuilds receipts for the habits it actually added.
    pub(crate) fn merge_imported(&mut self, incoming: &ProgressionAccount, recomputed_total: u64, recomputed_streak: u32) {
        self.essence = self.essence.max(incoming.essence);
        self.points = self.points.max(incoming.points);
        self.total_points = self
            .total_points
            .max(incoming.total_points)
            .max(recomputed_total);
        self.longest_streak = self
            .longest_streak
            .max(incoming.longest_streak)
            .max(recomputed_streak);
        self.days_used = self.days_used.max(incoming.days_used);
        self.last_used_day = self.last_used_day.max(incoming.last_used_day);
        self.unlocked.extend(incoming.unlocked.iter().cloned());
        self.owned_collectibles
            .extend(incoming.owned_collectibles.iter().cloned());
        self.applied_collectibles.extend(
            incoming
                .applied_collectibles
                .iter()
                .filter(|id| self.owned_collectibles.contains(*id))
                .cloned()
                .collect::<Vec<_>>(),
        );
    }
}
