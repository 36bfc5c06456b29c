//! Export, import and wipe of the full state.

use std::path::PathBuf;

use clap::Subcommand;
use habitrealm_core::ImportReport;

use crate::session::Session;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the full state as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge a JSON export into the current state
    Import {
        /// File produced by `data export`
        path: PathBuf,
    },
    /// Delete all habits, progress and trophies
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;

    match action {
        DataAction::Export { output } => {
            let json = session.engine.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { path } => {
            let raw = std::fs::read_to_string(&path)?;
            let result = session.engine.import_json(&raw);
            let report = ImportReport::from(result.clone().map(|(stats, _)| stats));
            println!("{}", serde_json::to_string_pretty(&report)?);
            result?;
        }
        DataAction::Wipe { yes } => {
            if !yes {
                return Err("refusing to wipe without --yes".into());
            }
            let event = session.engine.wipe();
            session.store.wipe()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    session.save()?;
    Ok(())
}
