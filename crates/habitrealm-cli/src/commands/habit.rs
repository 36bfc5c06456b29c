//! Habit management commands for CLI.

use clap::Subcommand;
use habitrealm_core::{Frequency, HabitId, HabitMode, HabitPatch, NewHabit};
use serde_json::json;

use crate::session::{day_or_today, Session};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// daily, weekly or monthly (default: daily)
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Completions required per week or month (default: 1)
        #[arg(long)]
        target: Option<u32>,
        /// build or break (default: build)
        #[arg(long, default_value = "build")]
        mode: String,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Show one habit with its derived stats
    Show {
        /// Habit ID
        id: String,
    },
    /// Mark or unmark a day
    Toggle {
        /// Habit ID
        id: String,
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Update a habit
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New frequency
        #[arg(long)]
        frequency: Option<String>,
        /// New per-period target
        #[arg(long)]
        target: Option<u32>,
        /// New mode
        #[arg(long)]
        mode: Option<String>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
    /// Hide a habit from the default listing
    Archive {
        /// Habit ID
        id: String,
    },
    /// Restore an archived habit
    Unarchive {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let engine = &mut session.engine;

    match action {
        HabitAction::Add {
            name,
            frequency,
            target,
            mode,
        } => {
            let frequency = Frequency::from_parts(&frequency, target)?;
            let mode: HabitMode = mode.parse()?;
            let id = engine.add_habit(NewHabit::new(name, frequency).mode(mode))?;
            println!("{}", serde_json::to_string_pretty(&engine.habit_view(&id)?)?);
        }
        HabitAction::List { all } => {
            println!("{}", serde_json::to_string_pretty(&engine.habit_views(all))?);
        }
        HabitAction::Show { id } => {
            let id = HabitId::from(id);
            let habit = engine.habit(&id)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "view": engine.habit_view(&id)?,
                    "completions": habit.completions(),
                    "createdAt": habit.created_at(),
                }))?
            );
        }
        HabitAction::Toggle { id, date } => {
            let day = day_or_today(engine, date.as_deref())?;
            let outcome = engine.toggle_completion(&HabitId::from(id), day)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        HabitAction::Edit {
            id,
            name,
            frequency,
            target,
            mode,
        } => {
            let id = HabitId::from(id);
            let current = engine.habit(&id)?.frequency();
            let frequency = match (frequency, target) {
                (None, None) => None,
                (kind, target) => Some(Frequency::from_parts(
                    kind.as_deref().unwrap_or(current.label()),
                    target.or(Some(current.target())),
                )?),
            };
            let mode = mode.map(|m| m.parse::<HabitMode>()).transpose()?;
            let events = engine.edit_habit(
                &id,
                HabitPatch {
                    name,
                    frequency,
                    mode,
                },
            )?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "habit": engine.habit_view(&id)?,
                    "events": events,
                }))?
            );
        }
        HabitAction::Delete { id } => {
            let events = engine.delete_habit(&HabitId::from(id))?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        HabitAction::Archive { id } => {
            let events = engine.archive_habit(&HabitId::from(id))?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        HabitAction::Unarchive { id } => {
            let events = engine.unarchive_habit(&HabitId::from(id))?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }

    session.save()?;
    Ok(())
}
