use clap::Subcommand;
use serde_json::json;

use crate::session::{day_or_today, Session};

#[derive(Subcommand)]
pub enum EmojiAction {
    /// Record the emoji for a day
    Log {
        /// Emoji (or any short mood text)
        emoji: String,
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove the entry for a day
    Clear {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the longest consecutive run of logged days
    Streak,
}

pub fn run(action: EmojiAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let mut journal = session.store.load_emoji_journal()?;

    let events = match action {
        EmojiAction::Log { emoji, date } => {
            let day = day_or_today(&session.engine, date.as_deref())?;
            journal.log(day, emoji);
            session.store.save_emoji_journal(&journal)?;
            session.engine.set_emoji_streak(journal.longest_streak())
        }
        EmojiAction::Clear { date } => {
            let day = day_or_today(&session.engine, date.as_deref())?;
            journal.clear(day);
            session.store.save_emoji_journal(&journal)?;
            session.engine.set_emoji_streak(journal.longest_streak())
        }
        EmojiAction::Streak => Vec::new(),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "entries": journal.len(),
            "longestStreak": journal.longest_streak(),
            "events": events,
        }))?
    );

    session.save()?;
    Ok(())
}
