mod points;
mod streak;

pub use points::{
    PointsCalculator, DAILY_MILESTONE, MILESTONE_BONUS, POINTS_PER_COMPLETION, WEEKLY_MILESTONE,
};
pub use streak::{longest_daily_run, StreakCalculator};
