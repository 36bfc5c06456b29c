//! Thread-safe handle to the engine.
//!
//! ToggleCompletion reads and writes global aggregates (lifetime totals,
//! trophies) besides the habit itself, so two calls must never interleave,
//! even on different habits. One mutex guards the whole aggregate.

use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::{EngineSnapshot, HabitEngine};

#[derive(Debug, Clone)]
pub struct SharedEngine(Arc<Mutex<HabitEngine>>);

impl SharedEngine {
    pub fn new(engine: HabitEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// A poisoned lock is recovered: every engine mutation either completes
    /// or returns before touching state.
    pub fn with<R>(&self, f: impl FnOnce(&mut HabitEngine) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.with(|engine| engine.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FixedClock;
    use crate::habit::{Frequency, NewHabit};
    use chrono::{Duration, NaiveDate};
    use std::thread;

    #[test]
    fn concurrent_toggles_keep_aggregates_consistent() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let shared = SharedEngine::new(HabitEngine::default().with_clock(FixedClock(today)));
        let ids: Vec<_> = (0..4)
            .map(|i| {
                shared.with(|e| {
                    e.add_habit(NewHabit::new(format!("habit {i}"), Frequency::Daily))
                        .unwrap()
                })
            })
            .collect();

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for day in 0..10 {
                        shared.with(|e| e.toggle_completion(&id, today - Duration::days(day)).unwrap());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        // 4 habits x 10 days x 5, plus one 7-day milestone each on the habit points
        assert_eq!(snapshot.account.essence(), 200);
        assert_eq!(snapshot.account.total_points(), 4 * (50 + 10));
        assert_eq!(snapshot.account.longest_streak(), 10);
    }
}
