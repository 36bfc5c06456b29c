use clap::Subcommand;
use habitrealm_core::WeekStart;
use serde_json::json;

use crate::session::Session;

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show or change the first day of the week
    WeekStart {
        /// monday or sunday; omit to show the current value
        value: Option<String>,
    },
}

pub fn run(action: PrefsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    match action {
        PrefsAction::WeekStart { value: None } => {
            println!("{}", session.engine.preferences().week_start);
        }
        PrefsAction::WeekStart { value: Some(raw) } => {
            let week_start: WeekStart = raw.parse()?;
            let events = session.engine.set_week_start(week_start);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "preferences": session.engine.preferences(),
                    "events": events,
                }))?
            );
        }
    }
    session.save()?;
    Ok(())
}
