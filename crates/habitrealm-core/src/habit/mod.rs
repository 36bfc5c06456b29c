//! Habit data model.
//!
//! A habit owns its completion ledger. Its `streak` and `points` are caches
//! that are only ever written by [`Habit::refresh`], which recomputes both
//! from scratch.

mod ledger;
mod period;

pub use ledger::{CompletionLedger, IntoDay};
pub use period::{bucket_counts, Cadence, WeekStart};

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::scoring::{PointsCalculator, StreakCalculator};

/// Opaque, unique habit identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HabitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a marker means "did it" or "stayed clean".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitMode {
    #[default]
    Build,
    Break,
}

impl fmt::Display for HabitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HabitMode::Build => write!(f, "build"),
            HabitMode::Break => write!(f, "break"),
        }
    }
}

impl FromStr for HabitMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(HabitMode::Build),
            "break" => Ok(HabitMode::Break),
            _ => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected 'build' or 'break', got '{s}'"),
            }),
        }
    }
}

fn default_target() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// How often a habit is due, carrying the per-period target where one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly {
        #[serde(default = "default_target")]
        target: NonZeroU32,
    },
    Monthly {
        #[serde(default = "default_target")]
        target: NonZeroU32,
    },
}

impl Frequency {
    pub fn weekly(target: u32) -> Result<Self, ValidationError> {
        Ok(Frequency::Weekly {
            target: positive_target(target)?,
        })
    }

    pub fn monthly(target: u32) -> Result<Self, ValidationError> {
        Ok(Frequency::Monthly {
            target: positive_target(target)?,
        })
    }

    /// Build from a frequency name and an optional target (defaults to 1).
    pub fn from_parts(kind: &str, target: Option<u32>) -> Result<Self, ValidationError> {
        match kind {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Frequency::weekly(target.unwrap_or(1)),
            "monthly" => Frequency::monthly(target.unwrap_or(1)),
            _ => Err(ValidationError::InvalidValue {
                field: "frequency".into(),
                message: format!("expected daily, weekly or monthly, got '{kind}'"),
            }),
        }
    }

    /// Completions required per period. Daily habits need one per day.
    pub fn target(&self) -> u32 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly { target } | Frequency::Monthly { target } => target.get(),
        }
    }

    /// Bucket size for periodic habits, `None` for daily ones.
    pub fn cadence(&self) -> Option<Cadence> {
        match self {
            Frequency::Daily => None,
            Frequency::Weekly { .. } => Some(Cadence::Week),
            Frequency::Monthly { .. } => Some(Cadence::Month),
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, Frequency::Daily)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly { .. } => "weekly",
            Frequency::Monthly { .. } => "monthly",
        }
    }
}

fn positive_target(target: u32) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(target).ok_or_else(|| ValidationError::InvalidValue {
        field: "target".into(),
        message: "target must be a positive integer".into(),
    })
}

/// Input for creating a habit.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub frequency: Frequency,
    pub mode: HabitMode,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            frequency,
            mode: HabitMode::Build,
        }
    }

    pub fn mode(mut self, mode: HabitMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Partial update for an existing habit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub mode: Option<HabitMode>,
}

/// A tracked habit and its cached derived stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub(crate) id: HabitId,
    pub(crate) name: String,
    #[serde(flatten)]
    pub(crate) frequency: Frequency,
    #[serde(default)]
    pub(crate) mode: HabitMode,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) completions: CompletionLedger,
    #[serde(default)]
    pub(crate) streak: u32,
    #[serde(default)]
    pub(crate) points: u64,
    #[serde(default)]
    pub(crate) archived: bool,
}

impl Habit {
    /// Validate input and build a fresh habit with an empty ledger.
    pub fn new(input: NewHabit, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = validate_name(&input.name)?;
        Ok(Self {
            id: HabitId::new(),
            name,
            frequency: input.frequency,
            mode: input.mode,
            created_at,
            completions: CompletionLedger::new(),
            streak: 0,
            points: 0,
            archived: false,
        })
    }

    pub fn id(&self) -> &HabitId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn mode(&self) -> HabitMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completions(&self) -> &CompletionLedger {
        &self.completions
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Recompute the cached streak and points. Returns `(points_before, points_after)`.
    pub(crate) fn refresh(&mut self, today: NaiveDate, week_start: WeekStart) -> (u64, u64) {
        let before = self.points;
        self.streak = StreakCalculator::new(week_start).streak(&self.completions, self.frequency, today);
        self.points =
            PointsCalculator::new(week_start).points(&self.completions, self.frequency, self.mode);
        (before, self.points)
    }

    pub(crate) fn apply_patch(&mut self, patch: HabitPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.name {
            self.name = validate_name(&name)?;
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        Ok(())
    }

    /// Completions in the period containing `day` (0 or 1 for daily habits).
    pub fn period_count(&self, day: NaiveDate, week_start: WeekStart) -> u32 {
        match self.frequency.cadence() {
            None => u32::from(self.completions.contains(day)),
            Some(cadence) => {
                let start = cadence.start_of(day, week_start);
                let end = cadence.next(start, week_start);
                self.completions.count_between(start, end)
            }
        }
    }

    /// Starts of the weeks or months whose count reaches the target.
    /// Always empty for daily habits.
    pub fn achieved_periods(&self, week_start: WeekStart) -> BTreeSet<NaiveDate> {
        let Some(cadence) = self.frequency.cadence() else {
            return BTreeSet::new();
        };
        let target = self.frequency.target();
        bucket_counts(self.completions.iter(), cadence, week_start)
            .into_iter()
            .filter(|(_, count)| *count >= target)
            .map(|(start, _)| start)
            .collect()
    }

    /// Progress toward the target of the period containing `day`, capped at 100.
    pub fn percent_to_target(&self, day: NaiveDate, week_start: WeekStart) -> u32 {
        let count = self.period_count(day, week_start);
        let target = self.frequency.target();
        (count.saturating_mul(100) / target).min(100)
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}
