//! JSON import/export of the full engine state.
//!
//! Import is merge-only. Habits are added only when their id is new; the
//! rest are counted as duplicates, and entries that fail to parse are
//! counted as invalid. Lifetime counters never go down. A rejected document
//! leaves the engine untouched: everything is parsed and validated before
//! the first mutation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::{HabitEngine, Preferences};
use crate::error::ImportError;
use crate::events::Event;
use crate::habit::{Habit, HabitId};
use crate::progression::ProgressionAccount;

/// Discriminator identifying documents produced by this application.
pub const APP_DISCRIMINATOR: &str = "habitrealm";
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub app: String,
    pub version: u32,
    pub habits: Vec<Habit>,
    pub progress: ProgressionAccount,
    pub preferences: Preferences,
    pub exported_at: DateTime<Utc>,
}

/// Counts reported by a successful import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub incoming_habits: usize,
    pub added_habits: usize,
    pub duplicate_habits: usize,
    pub invalid_habits: usize,
    pub total_habits: usize,
}

/// Discriminated import result for callers that want a flat JSON shape:
/// `{"ok": true, ...stats}` or `{"ok": false, "reason": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub ok: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ImportStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<ImportStats, ImportError>> for ImportReport {
    fn from(result: Result<ImportStats, ImportError>) -> Self {
        match result {
            Ok(stats) => ImportReport {
                ok: true,
                stats: Some(stats),
                reason: None,
            },
            Err(err) => ImportReport {
                ok: false,
                stats: None,
                reason: Some(err.to_string()),
            },
        }
    }
}

/// A document that passed every whole-document check.
struct ParsedImport {
    habits: Vec<Result<Habit, String>>,
    progress: Option<ProgressionAccount>,
}

fn parse_document(raw: &str) -> Result<ParsedImport, ImportError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ImportError::Format(e.to_string()))?;
    let doc = value
        .as_object()
        .ok_or_else(|| ImportError::Format("document is not a JSON object".into()))?;

    let app = doc
        .get("app")
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::Format("missing app discriminator".into()))?;
    if app != APP_DISCRIMINATOR {
        return Err(ImportError::NotRecognized {
            found: app.to_string(),
        });
    }

    let habits = doc
        .get("habits")
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::Format("missing habits array".into()))?
        .iter()
        .map(|entry| parse_habit(entry.clone()))
        .collect();

    let progress = match doc.get("progress") {
        None | Some(Value::Null) => None,
        Some(p) => Some(
            serde_json::from_value(p.clone())
                .map_err(|e| ImportError::Format(format!("invalid progress section: {e}")))?,
        ),
    };

    Ok(ParsedImport { habits, progress })
}

fn parse_habit(entry: Value) -> Result<Habit, String> {
    let habit: Habit = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    if habit.name.trim().is_empty() || habit.id.as_str().is_empty() {
        return Err("habit has an empty id or name".into());
    }
    Ok(habit)
}

impl HabitEngine {
    pub fn export_document(&self) -> ExportDocument {
        ExportDocument {
            app: APP_DISCRIMINATOR.to_string(),
            version: EXPORT_VERSION,
            habits: self.habits.clone(),
            progress: self.account.clone(),
            preferences: self.preferences,
            exported_at: Utc::now(),
        }
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_document())
    }

    /// Merge a JSON export into this engine.
    ///
    /// Incoming preferences are ignored; local choices win.
    pub fn import_json(&mut self, raw: &str) -> Result<(ImportStats, Vec<Event>), ImportError> {
        let parsed = match parse_document(raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "import rejected");
                return Err(err);
            }
        };

        let level_before = self.account.level();
        let mut known: HashSet<HabitId> = self.habits.iter().map(|h| h.id.clone()).collect();
        let mut added: HashSet<HabitId> = HashSet::new();
        let mut stats = ImportStats {
            incoming_habits: parsed.habits.len(),
            ..Default::default()
        };

        for entry in parsed.habits {
            match entry {
                Err(reason) => {
                    warn!(%reason, "skipping malformed habit");
                    stats.invalid_habits += 1;
                }
                Ok(habit) if known.contains(&habit.id) => stats.duplicate_habits += 1,
                Ok(habit) => {
                    known.insert(habit.id.clone());
                    added.insert(habit.id.clone());
                    self.habits.push(habit);
                    stats.added_habits += 1;
                }
            }
        }

        self.recompute_habits(false);
        // receipts of added habits are rebuilt from their own ledgers
        let week_start = self.preferences.week_start;
        for habit in self.habits.iter().filter(|h| added.contains(&h.id)) {
            self.account.awards.resync_habit(
                &habit.id,
                habit.completions.iter(),
                habit.achieved_periods(week_start),
            );
        }
        let recomputed_total: u64 = self.habits.iter().map(Habit::points).sum();
        let recomputed_streak = self.habits.iter().map(Habit::streak).max().unwrap_or(0);
        let incoming = parsed.progress.unwrap_or_default();
        self.account
            .merge_imported(&incoming, recomputed_total, recomputed_streak);

        stats.total_habits = self.habits.len();
        info!(
            added = stats.added_habits,
            duplicates = stats.duplicate_habits,
            invalid = stats.invalid_habits,
            total = stats.total_habits,
            "import merged"
        );

        let mut events = vec![Event::HabitsImported {
            added: stats.added_habits,
            duplicates: stats.duplicate_habits,
            invalid: stats.invalid_habits,
            at: Utc::now(),
        }];
        self.settle(level_before, &mut events);
        Ok((stats, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FixedClock;
    use crate::habit::{Frequency, NewHabit};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    fn engine_with(names: &[&str]) -> HabitEngine {
        let mut engine = HabitEngine::default().with_clock(FixedClock(today()));
        for name in names {
            let id = engine.add_habit(NewHabit::new(*name, Frequency::Daily)).unwrap();
            engine.toggle_completion(&id, today()).unwrap();
        }
        engine
    }

    #[test]
    fn export_carries_discriminator_and_camel_case_keys() {
        let engine = engine_with(&["Read"]);
        let json: Value = serde_json::from_str(&engine.export_json().unwrap()).unwrap();
        assert_eq!(json["app"], APP_DISCRIMINATOR);
        assert_eq!(json["version"], EXPORT_VERSION);
        assert!(json.get("exportedAt").is_some());
        assert_eq!(json["habits"].as_array().unwrap().len(), 1);
        assert_eq!(json["progress"]["essence"], 5);
    }

    #[test]
    fn rejects_malformed_json() {
        let mut engine = engine_with(&[]);
        assert!(matches!(engine.import_json("{not json"), Err(ImportError::Format(_))));
        assert!(matches!(engine.import_json("[]"), Err(ImportError::Format(_))));
        assert!(matches!(
            engine.import_json(r#"{"habits": []}"#),
            Err(ImportError::Format(_))
        ));
    }

    #[test]
    fn rejects_foreign_discriminator() {
        let mut engine = engine_with(&["Read"]);
        let before = engine.snapshot();
        let err = engine
            .import_json(r#"{"app": "other-tracker", "habits": []}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ImportError::NotRecognized {
                found: "other-tracker".into()
            }
        );
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn bad_progress_section_rejects_everything() {
        let mut engine = engine_with(&["Read"]);
        let before = engine.snapshot();
        let raw = r#"{"app":"habitrealm","habits":[{"id":"x","name":"New","frequency":"daily","createdAt":"2024-01-01T00:00:00Z"}],"progress":{"essence":"lots"}}"#;
        assert!(matches!(engine.import_json(raw), Err(ImportError::Format(_))));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn malformed_and_duplicate_entries_are_counted() {
        let mut engine = engine_with(&["Read"]);
        let existing = engine.habits()[0].id.clone();
        let raw = format!(
            r#"{{"app":"habitrealm","version":1,"habits":[
                {{"id":"{existing}","name":"Read","frequency":"daily","createdAt":"2024-01-01T00:00:00Z"}},
                {{"id":"n1","name":"Stretch","frequency":"weekly","target":2,"createdAt":"2024-01-01T00:00:00Z","completions":["2024-06-10","2024-06-11"]}},
                {{"id":"n1","name":"Stretch again","frequency":"daily","createdAt":"2024-01-01T00:00:00Z"}},
                {{"id":"n2","name":"Bad target","frequency":"weekly","target":0,"createdAt":"2024-01-01T00:00:00Z"}},
                {{"id":"n3","name":"   ","frequency":"daily","createdAt":"2024-01-01T00:00:00Z"}},
                42
            ]}}"#
        );
        let (stats, _) = engine.import_json(&raw).unwrap();
        assert_eq!(stats.incoming_habits, 6);
        assert_eq!(stats.added_habits, 1);
        assert_eq!(stats.duplicate_habits, 2);
        assert_eq!(stats.invalid_habits, 3);
        assert_eq!(stats.total_habits, 2);

        // cached stats of imported habits are recomputed on arrival
        let stretch = engine.habit(&HabitId::from("n1")).unwrap();
        assert_eq!(stretch.points(), 20);
        assert_eq!(stretch.streak(), 1);
    }

    #[test]
    fn import_raises_lifetime_counters_but_never_lowers() {
        let mut engine = engine_with(&["Read", "Write"]);
        let before_total = engine.account().total_points();
        let before_essence = engine.account().essence();

        let raw = r#"{"app":"habitrealm","habits":[],"progress":{"essence":1,"points":0,"totalPoints":1,"unlocked":["weekly_52"]}}"#;
        engine.import_json(raw).unwrap();
        assert_eq!(engine.account().total_points(), before_total);
        assert_eq!(engine.account().essence(), before_essence);
        assert!(engine.account().is_unlocked("weekly_52"));

        let raw = r#"{"app":"habitrealm","habits":[],"progress":{"essence":5000,"totalPoints":900}}"#;
        engine.import_json(raw).unwrap();
        assert_eq!(engine.account().essence(), 5000);
        assert_eq!(engine.account().total_points(), 900);
    }

    #[test]
    fn receipts_of_duplicate_habits_are_not_taken_over() {
        let mut local = engine_with(&[]);
        let id = local.add_habit(NewHabit::new("Read", Frequency::Daily)).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let mut remote = HabitEngine::restore(local.snapshot(), FixedClock(today()));
        remote.toggle_completion(&id, day).unwrap();
        let (stats, _) = local.import_json(&remote.export_json().unwrap()).unwrap();
        assert_eq!(stats.duplicate_habits, 1);
        assert!(local.habit(&id).unwrap().completions().is_empty());
        assert!(!local.account().awards().has_completion(&id, day));

        let essence = local.account().essence();
        local.toggle_completion(&id, day).unwrap();
        assert_eq!(local.account().essence(), essence + 5);
        local.toggle_completion(&id, day).unwrap();
        assert_eq!(local.account().essence(), essence);
    }

    #[test]
    fn receipts_of_added_habits_match_their_ledgers() {
        let mut engine = engine_with(&[]);
        // the export claims a receipt for a day its ledger does not hold
        let raw = r#"{"app":"habitrealm","habits":[
            {"id":"n1","name":"Stretch","frequency":"weekly","target":2,"createdAt":"2024-01-01T00:00:00Z","completions":["2024-06-10","2024-06-11"]}
        ],"progress":{"completionAwardKeys":[{"habitId":"n1","day":"2024-06-03"}]}}"#;
        engine.import_json(raw).unwrap();

        let id = HabitId::from("n1");
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let awards = engine.account().awards();
        assert!(awards.has_completion(&id, day(10)));
        assert!(awards.has_completion(&id, day(11)));
        assert!(!awards.has_completion(&id, day(3)));
        assert!(awards.has_period_bonus(&id, day(10)));

        let essence = engine.account().essence();
        engine.toggle_completion(&id, day(11)).unwrap();
        engine.toggle_completion(&id, day(11)).unwrap();
        assert_eq!(engine.account().essence(), essence);
    }

    #[test]
    fn huge_imported_essence_does_not_overflow_level() {
        let mut engine = engine_with(&["Read"]);
        let raw = r#"{"app":"habitrealm","habits":[],"progress":{"essence":18446744073709551615}}"#;
        let (_, events) = engine.import_json(raw).unwrap();
        assert_eq!(engine.account().essence(), u64::MAX);
        assert!(engine.account().level() > 1);
        assert!(events.iter().any(|e| matches!(e, Event::LevelChanged { from: 1, .. })));
    }

    #[test]
    fn report_flattens_result() {
        let ok = serde_json::to_value(ImportReport::from(Ok(ImportStats {
            added_habits: 2,
            ..Default::default()
        })))
        .unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["addedHabits"], 2);
        assert!(ok.get("reason").is_none());

        let err = serde_json::to_value(ImportReport::from(Err(ImportError::NotRecognized {
            found: "x".into(),
        })))
        .unwrap();
        assert_eq!(err["ok"], false);
        assert!(err["reason"].as_str().unwrap().contains("not recognized"));
    }
}
