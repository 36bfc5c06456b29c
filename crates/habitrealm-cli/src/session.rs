//! Per-invocation engine lifecycle: load, run one command, save.

use chrono::NaiveDate;
use habitrealm_core::{Config, CoreError, HabitEngine, Preferences, StateStore};
use tracing::debug;

pub struct Session {
    pub store: StateStore,
    pub engine: HabitEngine,
}

impl Session {
    /// Restore the engine from the configured store, or start fresh with the
    /// configured defaults. Every invocation counts toward days used.
    pub fn open() -> Result<Self, CoreError> {
        let config = Config::load()?;
        let store = StateStore::open_default(&config)?;
        let mut engine = match store.load_snapshot()? {
            Some(snapshot) => HabitEngine::from_snapshot(snapshot),
            None => {
                debug!(namespace = store.namespace(), "no stored state, starting fresh");
                HabitEngine::new(Preferences {
                    week_start: config.defaults.week_start,
                })
            }
        };
        let today = engine.today();
        engine.record_day_used(today);
        Ok(Self { store, engine })
    }

    pub fn save(&self) -> Result<(), CoreError> {
        self.store.save_snapshot(&self.engine.snapshot())
    }
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to today.
pub fn day_or_today(engine: &HabitEngine, date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}").into()),
        None => Ok(engine.today()),
    }
}
