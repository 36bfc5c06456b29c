use clap::Subcommand;

use crate::session::Session;

#[derive(Subcommand)]
pub enum TrophyAction {
    /// List the trophy catalog with unlock state
    List {
        /// Only show unlocked trophies
        #[arg(long)]
        unlocked: bool,
    },
    /// Show the signals trophies are evaluated against
    Signals,
}

pub fn run(action: TrophyAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    match action {
        TrophyAction::List { unlocked } => {
            let statuses: Vec<_> = session
                .engine
                .trophy_statuses()
                .into_iter()
                .filter(|t| !unlocked || t.unlocked)
                .collect();
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        TrophyAction::Signals => {
            println!("{}", serde_json::to_string_pretty(&session.engine.trophy_signals())?);
        }
    }
    session.save()?;
    Ok(())
}
