//! Emoji mood journal.
//!
//! The journal owns its own date -> entry map. The engine only ever sees the
//! derived longest consecutive run, via [`crate::HabitEngine::set_emoji_streak`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::IntoDay;
use crate::scoring::longest_daily_run;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiJournal {
    entries: BTreeMap<NaiveDate, String>,
}

impl EmojiJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the entry for a day. Returns the previous entry.
    pub fn log(&mut self, day: impl IntoDay, emoji: impl Into<String>) -> Option<String> {
        self.entries.insert(day.into_day(), emoji.into())
    }

    pub fn clear(&mut self, day: impl IntoDay) -> Option<String> {
        self.entries.remove(&day.into_day())
    }

    pub fn get(&self, day: NaiveDate) -> Option<&str> {
        self.entries.get(&day).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.entries.iter().map(|(day, e)| (*day, e.as_str()))
    }

    /// Longest run of consecutive days with an entry.
    pub fn longest_streak(&self) -> u32 {
        longest_daily_run(self.entries.keys().copied())
    }
}
