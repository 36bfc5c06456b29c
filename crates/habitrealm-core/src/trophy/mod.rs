//! Achievements: a static catalog and a monotonic evaluator over it.

mod catalog;
mod evaluator;

pub use catalog::{catalog, find, TrophyDef, TrophyGroup, CATALOG};
pub use evaluator::{TrophyEvaluator, TrophySignals};
