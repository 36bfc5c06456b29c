//! End-to-end behavior of the engine across habits, awards and trophies.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use habitrealm_core::{
    Event, FixedClock, Frequency, HabitEngine, HabitMode, HabitPatch, NewHabit, StateStore,
    WeekStart,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn engine_at(today: NaiveDate) -> HabitEngine {
    HabitEngine::default().with_clock(FixedClock(today))
}

#[test]
fn drink_water_scenario() {
    // Mon 2024-06-10 .. Wed 2024-06-12, week starts Monday
    let today = d(2024, 6, 12);
    let mut engine = engine_at(today);
    let id = engine
        .add_habit(NewHabit::new("Drink Water", Frequency::weekly(3).unwrap()))
        .unwrap();
    assert_eq!(engine.habits().len(), 1);
    assert_eq!(engine.habit(&id).unwrap().streak(), 0);
    assert_eq!(engine.habit(&id).unwrap().points(), 0);

    let day1 = d(2024, 6, 10);
    let day2 = d(2024, 6, 11);
    let day3 = d(2024, 6, 12);

    assert_eq!(engine.toggle_completion(&id, day1).unwrap().points, 5);
    assert_eq!(engine.toggle_completion(&id, day2).unwrap().points, 10);

    let third = engine.toggle_completion(&id, day3).unwrap();
    // 3 x 5 base plus the flat bonus for the achieved week
    assert_eq!(third.points, 25);
    assert_eq!(third.streak, 1);
    assert!(third
        .events
        .iter()
        .any(|e| matches!(e, Event::PeriodBonusAwarded { amount: 10, .. })));
    assert_eq!(engine.account().essence(), 25);

    let removed = engine.toggle_completion(&id, day2).unwrap();
    assert!(!removed.present);
    assert_eq!(removed.points, 10);
    assert_eq!(removed.streak, 0);
    assert!(removed
        .events
        .iter()
        .any(|e| matches!(e, Event::PeriodBonusRevoked { amount: 10, .. })));
    assert_eq!(engine.account().essence(), 10);
    assert_eq!(engine.account().points(), 10);
    assert_eq!(engine.account().total_points(), 10);
}

#[test]
fn daily_streak_stops_at_gap() {
    let today = d(2024, 3, 20);
    let mut engine = engine_at(today);
    let id = engine.add_habit(NewHabit::new("Walk", Frequency::Daily)).unwrap();
    for offset in [0, 1, 2, 4, 5] {
        engine.toggle_completion(&id, today - Duration::days(offset)).unwrap();
    }
    assert_eq!(engine.habit(&id).unwrap().streak(), 3);
}

#[test]
fn weekly_target_needs_every_completion() {
    let mut engine = engine_at(d(2024, 6, 16));
    let id = engine
        .add_habit(NewHabit::new("Lift", Frequency::weekly(3).unwrap()))
        .unwrap();
    engine.toggle_completion(&id, d(2024, 6, 10)).unwrap();
    engine.toggle_completion(&id, d(2024, 6, 11)).unwrap();
    assert_eq!(engine.habit(&id).unwrap().streak(), 0);

    engine.toggle_completion(&id, d(2024, 6, 12)).unwrap();
    assert_eq!(engine.habit(&id).unwrap().streak(), 1);
}

#[test]
fn seven_day_run_earns_milestone() {
    let today = d(2024, 6, 7);
    let mut engine = engine_at(today);
    let id = engine.add_habit(NewHabit::new("Journal", Frequency::Daily)).unwrap();
    for i in 0..7 {
        engine.toggle_completion(&id, today - Duration::days(i)).unwrap();
    }
    assert_eq!(engine.habit(&id).unwrap().points(), 7 * 5 + 10);
    assert_eq!(engine.habit(&id).unwrap().streak(), 7);
    assert!(engine.account().is_unlocked("daily_build_7"));
}

#[test]
fn break_habits_use_run_milestones() {
    let today = d(2024, 6, 7);
    let mut engine = engine_at(today);
    let id = engine
        .add_habit(NewHabit::new("No sugar", Frequency::Daily).mode(HabitMode::Break))
        .unwrap();
    for i in 0..7 {
        engine.toggle_completion(&id, today - Duration::days(i)).unwrap();
    }
    assert_eq!(engine.habit(&id).unwrap().points(), 45);
    assert!(engine.account().is_unlocked("daily_break_7"));
    assert!(!engine.account().is_unlocked("daily_build_7"));
}

#[test]
fn import_disjoint_ids_adds_everything() {
    let today = d(2024, 6, 12);
    let mut source = engine_at(today);
    for name in ["Read", "Run", "Stretch"] {
        let id = source.add_habit(NewHabit::new(name, Frequency::Daily)).unwrap();
        source.toggle_completion(&id, today).unwrap();
    }
    let exported = source.export_json().unwrap();

    let mut target = engine_at(today);
    target.add_habit(NewHabit::new("Meditate", Frequency::Daily)).unwrap();
    target.add_habit(NewHabit::new("Floss", Frequency::Daily)).unwrap();

    let (stats, _) = target.import_json(&exported).unwrap();
    assert_eq!(stats.incoming_habits, 3);
    assert_eq!(stats.added_habits, 3);
    assert_eq!(stats.total_habits, 5);
    assert_eq!(target.habits().len(), 5);
    assert_eq!(target.account().essence(), 15);
}

#[test]
fn import_subset_adds_nothing() {
    let today = d(2024, 6, 12);
    let mut engine = engine_at(today);
    for name in ["Read", "Run", "Stretch"] {
        engine.add_habit(NewHabit::new(name, Frequency::Daily)).unwrap();
    }
    let mut subset = engine.export_document();
    subset.habits.truncate(2);
    let raw = serde_json::to_string(&subset).unwrap();

    let (stats, _) = engine.import_json(&raw).unwrap();
    assert_eq!(stats.added_habits, 0);
    assert_eq!(stats.duplicate_habits, 2);
    assert_eq!(stats.total_habits, 3);
}

#[test]
fn imported_preferences_do_not_override_local() {
    let today = d(2024, 6, 12);
    let mut source = engine_at(today);
    source.set_week_start(WeekStart::Sunday);
    let raw = source.export_json().unwrap();

    let mut target = engine_at(today);
    target.import_json(&raw).unwrap();
    assert_eq!(target.preferences().week_start, WeekStart::Monday);
}

#[test]
fn state_round_trips_through_store() {
    let today = d(2024, 6, 12);
    let mut engine = engine_at(today);
    let id = engine
        .add_habit(NewHabit::new("Swim", Frequency::monthly(2).unwrap()))
        .unwrap();
    engine.toggle_completion(&id, d(2024, 6, 1)).unwrap();
    engine.toggle_completion(&id, d(2024, 6, 2)).unwrap();

    let store = StateStore::open_memory("habitrealm").unwrap();
    store.persist(&engine.snapshot());
    let restored = HabitEngine::restore(store.load_snapshot().unwrap().unwrap(), FixedClock(today));

    assert_eq!(restored.snapshot(), engine.snapshot());
    assert!(restored.account().awards().has_period_bonus(&id, d(2024, 6, 1)));
}

fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        (1u32..4).prop_map(|t| Frequency::weekly(t).unwrap()),
        (1u32..4).prop_map(|t| Frequency::monthly(t).unwrap()),
    ]
}

fn mode_strategy() -> impl Strategy<Value = HabitMode> {
    prop_oneof![Just(HabitMode::Build), Just(HabitMode::Break)]
}

proptest! {
    #[test]
    fn toggle_twice_restores_state(
        frequency in frequency_strategy(),
        mode in mode_strategy(),
        history in proptest::collection::btree_set(0i64..90, 0..40),
        offset in 0i64..90,
    ) {
        let today = d(2024, 6, 30);
        let mut engine = engine_at(today);
        let id = engine.add_habit(NewHabit::new("h", frequency).mode(mode)).unwrap();
        for back in &history {
            engine.toggle_completion(&id, today - Duration::days(*back)).unwrap();
        }

        let before = engine.snapshot();
        let day = today - Duration::days(offset);
        engine.toggle_completion(&id, day).unwrap();
        engine.toggle_completion(&id, day).unwrap();
        let after = engine.snapshot();

        prop_assert_eq!(after.account.essence(), before.account.essence());
        prop_assert_eq!(after.account.points(), before.account.points());
        prop_assert_eq!(after.account.total_points(), before.account.total_points());
        prop_assert_eq!(after.habits[0].streak(), before.habits[0].streak());
        prop_assert_eq!(after.habits[0].points(), before.habits[0].points());
        prop_assert_eq!(after.account.awards(), before.account.awards());
    }

    #[test]
    fn toggle_twice_restores_state_after_edit(
        frequency in frequency_strategy(),
        edited in frequency_strategy(),
        sunday_weeks in any::<bool>(),
        history in proptest::collection::btree_set(0i64..90, 0..40),
        offset in 0i64..90,
    ) {
        let today = d(2024, 6, 30);
        let mut engine = engine_at(today);
        let id = engine.add_habit(NewHabit::new("h", frequency)).unwrap();
        for back in &history {
            engine.toggle_completion(&id, today - Duration::days(*back)).unwrap();
        }
        engine
            .edit_habit(&id, HabitPatch { frequency: Some(edited), ..Default::default() })
            .unwrap();
        if sunday_weeks {
            engine.set_week_start(WeekStart::Sunday);
        }

        let before = engine.snapshot();
        let day = today - Duration::days(offset);
        engine.toggle_completion(&id, day).unwrap();
        engine.toggle_completion(&id, day).unwrap();
        let after = engine.snapshot();

        prop_assert_eq!(after.account.essence(), before.account.essence());
        prop_assert_eq!(after.account.points(), before.account.points());
        prop_assert_eq!(after.account.awards(), before.account.awards());
    }

    #[test]
    fn unlocked_trophies_never_disappear(
        frequency in frequency_strategy(),
        mode in mode_strategy(),
        toggles in proptest::collection::vec(0i64..30, 1..80),
    ) {
        let today = d(2024, 6, 30);
        let mut engine = engine_at(today);
        let id = engine.add_habit(NewHabit::new("h", frequency).mode(mode)).unwrap();

        let mut seen = engine.account().unlocked().clone();
        for offset in toggles {
            engine.toggle_completion(&id, today - Duration::days(offset)).unwrap();
            let now = engine.account().unlocked();
            prop_assert!(now.is_superset(&seen));
            seen = now.clone();
        }
    }
}
