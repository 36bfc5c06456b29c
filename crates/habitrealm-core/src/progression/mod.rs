mod account;
mod award;

pub use account::{essence_for_level, level_for_essence, ProgressionAccount, LEVEL_STEP};
pub use award::{
    Award, AwardKind, AwardLedger, CompletionAwardKey, PeriodBonusKey, COMPLETION_REWARD,
    PERIOD_BONUS_REWARD,
};
