use clap::Subcommand;

use crate::session::Session;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Show essence, points, level and lifetime counters
    Show,
}

pub fn run(action: AccountAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    match action {
        AccountAction::Show => {
            println!("{}", serde_json::to_string_pretty(&session.engine.account_view())?);
        }
    }
    session.save()?;
    Ok(())
}
