//! Static trophy catalog.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrophyGroup {
    DailyBuild,
    DailyBreak,
    Weekly,
    Monthly,
    Totals,
    Milestone,
    Meta,
    Emoji,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrophyDef {
    pub id: &'static str,
    pub group: TrophyGroup,
    pub threshold: u32,
    pub label: &'static str,
}

const fn def(id: &'static str, group: TrophyGroup, threshold: u32, label: &'static str) -> TrophyDef {
    TrophyDef {
        id,
        group,
        threshold,
        label,
    }
}

use TrophyGroup::*;

pub static CATALOG: &[TrophyDef] = &[
    def("daily_build_3", DailyBuild, 3, "Warming Up"),
    def("daily_build_7", DailyBuild, 7, "One Full Week"),
    def("daily_build_14", DailyBuild, 14, "Fortnight Flow"),
    def("daily_build_30", DailyBuild, 30, "Monthly Momentum"),
    def("daily_build_60", DailyBuild, 60, "Second Nature"),
    def("daily_build_100", DailyBuild, 100, "Centurion"),
    def("daily_build_365", DailyBuild, 365, "Year of Practice"),
    def("daily_break_3", DailyBreak, 3, "First Resistance"),
    def("daily_break_7", DailyBreak, 7, "Clean Week"),
    def("daily_break_14", DailyBreak, 14, "Two Weeks Free"),
    def("daily_break_30", DailyBreak, 30, "Chain Breaker"),
    def("daily_break_60", DailyBreak, 60, "Unshackled"),
    def("daily_break_100", DailyBreak, 100, "Hundred Clean Days"),
    def("daily_break_365", DailyBreak, 365, "Year Unbound"),
    def("weekly_2", Weekly, 2, "Back to Back"),
    def("weekly_4", Weekly, 4, "Month of Weeks"),
    def("weekly_8", Weekly, 8, "Steady Rhythm"),
    def("weekly_12", Weekly, 12, "Quarter Strong"),
    def("weekly_26", Weekly, 26, "Half-Year Cadence"),
    def("weekly_52", Weekly, 52, "Year of Weeks"),
    def("monthly_2", Monthly, 2, "Two in a Row"),
    def("monthly_3", Monthly, 3, "Season Keeper"),
    def("monthly_6", Monthly, 6, "Half-Year Habit"),
    def("monthly_12", Monthly, 12, "Full Calendar"),
    def("totals_10", Totals, 10, "Getting Started"),
    def("totals_50", Totals, 50, "Fifty Check-ins"),
    def("totals_100", Totals, 100, "Triple Digits"),
    def("totals_250", Totals, 250, "Quarter Thousand"),
    def("totals_500", Totals, 500, "Five Hundred Strong"),
    def("totals_1000", Totals, 1000, "Thousand Marks"),
    def("milestone_7", Milestone, 7, "Seven Active Days"),
    def("milestone_30", Milestone, 30, "Thirty Active Days"),
    def("milestone_100", Milestone, 100, "Hundred Active Days"),
    def("milestone_365", Milestone, 365, "Year of Activity"),
    def("emoji_3", Emoji, 3, "Mood Starter"),
    def("emoji_7", Emoji, 7, "Feelings Week"),
    def("emoji_14", Emoji, 14, "Mood Chronicler"),
    def("emoji_30", Emoji, 30, "Month of Moods"),
    def("emoji_100", Emoji, 100, "Emotional Archivist"),
    def("meta_balance", Meta, 7, "Balance"),
    def("meta_focus", Meta, 7, "Focus"),
    def("meta_persistence", Meta, 30, "Persistence"),
    def("meta_resilience", Meta, 7, "Resilience"),
    def("meta_dedication", Meta, 100, "Dedication"),
];

pub fn catalog() -> &'static [TrophyDef] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static TrophyDef> {
    CATALOG.iter().find(|t| t.id == id)
}
