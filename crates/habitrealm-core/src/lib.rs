//! # HabitRealm Core Library
//!
//! This library provides the core logic for HabitRealm, a habit tracker that
//! turns completions into streaks, points, levels and trophies. Like its CLI,
//! any front-end is a thin layer over the same engine.
//!
//! ## Architecture
//!
//! - **Habits**: a completion ledger per habit, the single source of truth
//! - **Scoring**: pure streak and point calculators over a ledger
//! - **Progression**: the account (essence, spendable points, level) and the
//!   award ledger that makes every grant happen exactly once
//! - **Trophies**: a static catalog evaluated monotonically against signals
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`HabitEngine`]: aggregate root; every mutation runs through it
//! - [`SharedEngine`]: one lock over the whole engine for multi-threaded hosts
//! - [`StateStore`]: snapshot persistence
//! - [`Config`]: application configuration management

pub mod emoji;
pub mod engine;
pub mod error;
pub mod events;
pub mod habit;
pub mod progression;
pub mod scoring;
pub mod shared;
pub mod storage;
pub mod transfer;
pub mod trophy;

pub use emoji::EmojiJournal;
pub use engine::{
    AccountView, Clock, EngineSnapshot, FixedClock, HabitEngine, HabitView, Preferences,
    SystemClock, ToggleOutcome, TrophyStatus,
};
pub use error::{CollectibleError, ConfigError, CoreError, DatabaseError, ImportError, ValidationError};
pub use events::Event;
pub use habit::{CompletionLedger, Frequency, Habit, HabitId, HabitMode, HabitPatch, IntoDay, NewHabit, WeekStart};
pub use progression::{essence_for_level, level_for_essence, Award, AwardKind, AwardLedger, ProgressionAccount};
pub use scoring::{PointsCalculator, StreakCalculator};
pub use shared::SharedEngine;
pub use storage::{data_dir, Config, StateStore};
pub use transfer::{ExportDocument, ImportReport, ImportStats};
pub use trophy::{TrophyDef, TrophyEvaluator, TrophyGroup, TrophySignals};
