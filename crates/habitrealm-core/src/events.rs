use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::HabitId;

/// Every state change in the engine produces one or more Events.
/// The UI uses them to animate rewards without diffing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitEdited {
        habit_id: HabitId,
        at: DateTime<Utc>,
    },
    HabitDeleted {
        habit_id: HabitId,
        at: DateTime<Utc>,
    },
    HabitArchived {
        habit_id: HabitId,
        archived: bool,
        at: DateTime<Utc>,
    },
    CompletionToggled {
        habit_id: HabitId,
        day: NaiveDate,
        present: bool,
        at: DateTime<Utc>,
    },
    CompletionAwarded {
        habit_id: HabitId,
        day: NaiveDate,
        amount: u64,
    },
    CompletionRevoked {
        habit_id: HabitId,
        day: NaiveDate,
        amount: u64,
    },
    PeriodBonusAwarded {
        habit_id: HabitId,
        period_start: NaiveDate,
        amount: u64,
    },
    PeriodBonusRevoked {
        habit_id: HabitId,
        period_start: NaiveDate,
        amount: u64,
    },
    LevelChanged {
        from: u32,
        to: u32,
    },
    TrophyUnlocked {
        trophy_id: String,
        label: String,
        at: DateTime<Utc>,
    },
    CollectiblePurchased {
        collectible_id: String,
        cost: u64,
        at: DateTime<Utc>,
    },
    CollectibleApplied {
        collectible_id: String,
        applied: bool,
        at: DateTime<Utc>,
    },
    WeekStartChanged {
        week_start: crate::habit::WeekStart,
        at: DateTime<Utc>,
    },
    HabitsImported {
        added: usize,
        duplicates: usize,
        invalid: usize,
        at: DateTime<Utc>,
    },
    StateWiped {
        at: DateTime<Utc>,
    },
}
