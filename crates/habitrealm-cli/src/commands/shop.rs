use clap::Subcommand;
use serde_json::json;

use crate::session::Session;

#[derive(Subcommand)]
pub enum ShopAction {
    /// Buy a collectible with spendable points
    Buy {
        /// Collectible ID
        id: String,
        /// Price in points
        #[arg(long)]
        cost: u64,
    },
    /// Equip an owned collectible
    Apply {
        /// Collectible ID
        id: String,
    },
    /// Unequip a collectible
    Unapply {
        /// Collectible ID
        id: String,
    },
}

pub fn run(action: ShopAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let engine = &mut session.engine;

    let event = match action {
        ShopAction::Buy { id, cost } => engine.purchase_collectible(&id, cost)?,
        ShopAction::Apply { id } => engine.apply_collectible(&id)?,
        ShopAction::Unapply { id } => engine.unapply_collectible(&id),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "event": event,
            "points": engine.account().points(),
        }))?
    );

    session.save()?;
    Ok(())
}
