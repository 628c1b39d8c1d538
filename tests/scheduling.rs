#![forbid(unsafe_code)]
use chrono::{Datelike, NaiveDate};
use gardes::{
    build_schedule, Exclusions, GapPolicy, HolidayList, JapaneseHolidays, PersonId, SchedError, Schedule,
    ScheduleOptions, Scheduler, ShiftType, Slot,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn people(names: &[&str]) -> Vec<PersonId> {
    names.iter().map(PersonId::new).collect()
}

/// Les quatre invariants, vérifiés à la main.
fn assert_invariants(
    scheduler: &Scheduler,
    schedule: &Schedule,
    people: &[PersonId],
    exclusions: &Exclusions,
) {
    let opts = scheduler.options();
    let slots: HashSet<Slot> = scheduler
        .generate_slots(schedule.year, schedule.month)
        .unwrap()
        .into_iter()
        .collect();

    let mut seen = HashSet::new();
    let mut per_person: HashMap<&PersonId, Vec<&gardes::ScheduleRecord>> = HashMap::new();
    for r in &schedule.records {
        assert!(slots.contains(&r.slot()), "unknown slot {:?}", r.slot());
        assert!(seen.insert(r.slot()), "slot assigned twice {:?}", r.slot());
        assert!(!exclusions.is_excluded(&r.person, &r.slot()));
        per_person.entry(&r.person).or_default().push(r);
    }

    for p in people {
        let own = per_person.get(p).cloned().unwrap_or_default();
        for shift in ShiftType::ALL {
            let n = own.iter().filter(|r| r.shift == shift).count() as u32;
            assert_eq!(n, opts.quota.get(shift), "{p} quota for {shift:?}");
        }
        let mut dates: Vec<NaiveDate> = own.iter().map(|r| r.date).collect();
        assert!(schedule.gap.accepts(&dates), "{p}: gap outside {:?}", schedule.gap);
        dates.sort();
        for w in dates.windows(2) {
            let gap = (w[1] - w[0]).num_days();
            assert!(schedule.gap.contains(gap), "{p}: gap {gap} between {} and {}", w[0], w[1]);
        }
    }

    assert!(scheduler.check(schedule, people, exclusions).unwrap().is_empty());
}

#[test]
fn slots_follow_weekends_and_holidays() {
    let slots = Scheduler::new().generate_slots(2025, 6).unwrap();
    // juin 2025 : 9 jours de week-end, 21 jours ouvrés
    assert_eq!(slots.len(), 9 * 2 + 21);
    assert_eq!(slots[0], Slot::new(d(2025, 6, 1), ShiftType::WeekendDay));
    assert_eq!(slots[1], Slot::new(d(2025, 6, 1), ShiftType::WeekendNight));
    assert_eq!(slots[2], Slot::new(d(2025, 6, 2), ShiftType::WeekdayNight));
    assert!(slots.windows(2).all(|w| w[0].date <= w[1].date));

    // 2025-05-06 : jour de remplacement au Japon
    let plain = Scheduler::new().generate_slots(2025, 5).unwrap();
    let jp = Scheduler::new()
        .with_holidays(JapaneseHolidays)
        .generate_slots(2025, 5)
        .unwrap();
    let on = |slots: &[Slot], day: NaiveDate| -> Vec<ShiftType> {
        slots.iter().filter(|s| s.date == day).map(|s| s.shift).collect()
    };
    assert_eq!(on(&plain, d(2025, 5, 6)), vec![ShiftType::WeekdayNight]);
    assert_eq!(
        on(&jp, d(2025, 5, 6)),
        vec![ShiftType::WeekendDay, ShiftType::WeekendNight]
    );
}

#[test]
fn precheck_rejects_short_capacity() {
    // quatre nuits de semaine, aucun week-end
    let slots: Vec<Slot> = (2..=5)
        .map(|day| Slot::new(d(2025, 6, day), ShiftType::WeekdayNight))
        .collect();
    let err = Scheduler::new().precheck(&slots, 1).unwrap_err();
    assert_eq!(
        err,
        SchedError::InsufficientCapacity {
            shift: ShiftType::WeekendDay,
            available: 0,
            required: 1,
        }
    );
}

#[test]
fn insufficient_capacity_skips_search() {
    // février 2026 : 8 jours de week-end pour 10 personnes
    let names: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
    let roster: Vec<PersonId> = names.iter().map(PersonId::new).collect();
    let opts = ScheduleOptions {
        max_attempts: 0,
        ..ScheduleOptions::default()
    };
    let err = Scheduler::new()
        .with_options(opts)
        .build(2026, 2, &roster, &Exclusions::new())
        .unwrap_err();
    assert_eq!(
        err,
        SchedError::InsufficientCapacity {
            shift: ShiftType::WeekendDay,
            available: 8,
            required: 10,
        }
    );
}

#[test]
fn weekday_night_shortage_fails_through_build() {
    // juin 2025 : tous les jours ouvrés fériés sauf le 2 et le 3
    let holidays = HolidayList::new(
        (4..=30)
            .map(|day| d(2025, 6, day))
            .filter(|date| date.weekday().number_from_monday() <= 5),
    );
    let scheduler = Scheduler::new().with_holidays(holidays);
    let slots = scheduler.generate_slots(2025, 6).unwrap();
    assert_eq!(
        slots.iter().filter(|s| s.shift == ShiftType::WeekdayNight).count(),
        2
    );

    let err = scheduler
        .build(2025, 6, &people(&["alice", "bob"]), &Exclusions::new())
        .unwrap_err();
    assert_eq!(
        err,
        SchedError::InsufficientCapacity {
            shift: ShiftType::WeekdayNight,
            available: 2,
            required: 4,
        }
    );
}

#[test]
fn zero_attempt_budget_is_exhausted() {
    let opts = ScheduleOptions {
        max_attempts: 0,
        ..ScheduleOptions::default()
    };
    let err = Scheduler::new()
        .with_options(opts)
        .build(2025, 6, &people(&["alice"]), &Exclusions::new())
        .unwrap_err();
    assert_eq!(err, SchedError::SearchExhausted { attempts: 0 });
}

#[test]
fn three_people_standard_month() {
    let roster = people(&["alice", "bob", "carol"]);
    let exclusions = Exclusions::new();
    let scheduler = Scheduler::new();
    let schedule = scheduler.build(2025, 6, &roster, &exclusions).unwrap();

    assert_eq!(schedule.records.len(), 3 * (1 + 1 + 2));
    assert!(schedule.attempts >= 1);
    assert_eq!(schedule.seed, 42);
    assert_invariants(&scheduler, &schedule, &roster, &exclusions);

    let unfilled = scheduler.unfilled(&schedule).unwrap();
    assert_eq!(unfilled.len() + schedule.records.len(), 39);
}

#[test]
fn records_are_sorted_by_date_then_label() {
    let roster = people(&["alice", "bob", "carol", "dave"]);
    let schedule = Scheduler::new()
        .build(2025, 6, &roster, &Exclusions::new())
        .unwrap();
    assert!(schedule.records.windows(2).all(|w| {
        (w[0].date, w[0].shift.label()) <= (w[1].date, w[1].shift.label())
    }));
}

#[test]
fn same_seed_same_schedule() {
    let roster = people(&["alice", "bob", "carol", "dave"]);
    let mut exclusions = Exclusions::new();
    exclusions.insert(
        PersonId::new("bob"),
        Slot::new(d(2025, 6, 7), ShiftType::WeekendDay),
    );
    let opts = ScheduleOptions {
        seed: 7,
        ..ScheduleOptions::default()
    };

    let first = build_schedule(2025, 6, &roster, &exclusions, opts, None).unwrap();
    let second = build_schedule(2025, 6, &roster, &exclusions, opts, None).unwrap();
    assert_eq!(first, second);

    let via_scheduler = Scheduler::new()
        .with_options(opts)
        .build(2025, 6, &roster, &exclusions)
        .unwrap();
    assert_eq!(first, via_scheduler.records);
}

#[test]
fn different_seeds_each_satisfy_invariants() {
    let roster = people(&["alice", "bob", "carol"]);
    let exclusions = Exclusions::new();
    for seed in [7, 42] {
        let scheduler = Scheduler::new().with_options(ScheduleOptions {
            seed,
            ..ScheduleOptions::default()
        });
        let schedule = scheduler.build(2025, 6, &roster, &exclusions).unwrap();
        assert_eq!(schedule.seed, seed);
        assert_invariants(&scheduler, &schedule, &roster, &exclusions);
    }
}

#[test]
fn concurrent_calls_keep_their_own_draws() {
    let roster = people(&["alice", "bob", "carol", "dave"]);
    let exclusions = Exclusions::new();
    let scheduler = Scheduler::new();
    let expected = scheduler.build(2025, 6, &roster, &exclusions).unwrap();

    let (scheduler, roster, exclusions) = (&scheduler, &roster, &exclusions);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || scheduler.build(2025, 6, roster, exclusions).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn exclusions_are_respected() {
    let roster = people(&["alice", "bob", "carol"]);
    let alice = PersonId::new("alice");
    let mut exclusions = Exclusions::new();
    for day in 2..=6 {
        exclusions.insert(
            alice.clone(),
            Slot::new(d(2025, 6, day), ShiftType::WeekdayNight),
        );
    }
    exclusions.insert(alice.clone(), Slot::new(d(2025, 6, 7), ShiftType::WeekendDay));

    let scheduler = Scheduler::new();
    let schedule = scheduler.build(2025, 6, &roster, &exclusions).unwrap();
    assert_invariants(&scheduler, &schedule, &roster, &exclusions);
    assert!(schedule
        .records_for(&alice)
        .all(|r| !exclusions.is_excluded(&alice, &r.slot())));
}

#[test]
fn unreachable_quota_exhausts_search() {
    let roster = people(&["alice", "bob"]);
    let alice = PersonId::new("alice");
    let scheduler = Scheduler::new().with_options(ScheduleOptions {
        max_attempts: 300,
        ..ScheduleOptions::default()
    });
    let mut exclusions = Exclusions::new();
    for slot in scheduler.generate_slots(2025, 6).unwrap() {
        if slot.shift == ShiftType::WeekendDay {
            exclusions.insert(alice.clone(), slot);
        }
    }

    let err = scheduler.build(2025, 6, &roster, &exclusions).unwrap_err();
    assert_eq!(err, SchedError::SearchExhausted { attempts: 300 });
}

#[test]
fn time_limit_stops_after_first_failure() {
    let roster = people(&["alice"]);
    let alice = PersonId::new("alice");
    let scheduler = Scheduler::new().with_options(ScheduleOptions {
        time_limit: Some(Duration::ZERO),
        ..ScheduleOptions::default()
    });
    let mut exclusions = Exclusions::new();
    for slot in scheduler.generate_slots(2025, 6).unwrap() {
        exclusions.insert(alice.clone(), slot);
    }
    let err = scheduler.build(2025, 6, &roster, &exclusions).unwrap_err();
    assert_eq!(err, SchedError::SearchExhausted { attempts: 1 });
}

#[test]
fn invalid_inputs_are_rejected_before_search() {
    let s = Scheduler::new();
    let none = Exclusions::new();
    assert_eq!(
        s.build(2025, 13, &people(&["a"]), &none).unwrap_err(),
        SchedError::InvalidMonth {
            year: 2025,
            month: 13
        }
    );
    assert_eq!(s.build(2025, 6, &[], &none).unwrap_err(), SchedError::NoPeople);
    assert_eq!(
        s.build(2025, 6, &people(&["a", "b", "a"]), &none).unwrap_err(),
        SchedError::DuplicatePerson("a".into())
    );
    assert!(GapPolicy::new(8, 5).is_err());
    let bad_gap = Scheduler::new().with_options(ScheduleOptions {
        gap: GapPolicy { lo: 9, hi: 2 },
        ..ScheduleOptions::default()
    });
    assert_eq!(
        bad_gap.build(2025, 6, &people(&["a"]), &none).unwrap_err(),
        SchedError::InvalidGapPolicy { lo: 9, hi: 2 }
    );
}

#[test]
fn wider_gap_policy_is_honoured() {
    let roster = people(&["alice", "bob"]);
    let exclusions = Exclusions::new();
    let scheduler = Scheduler::new().with_options(ScheduleOptions {
        gap: GapPolicy::new(3, 12).unwrap(),
        ..ScheduleOptions::default()
    });
    let schedule = scheduler.build(2025, 6, &roster, &exclusions).unwrap();
    assert_eq!(schedule.records.len(), 8);
    assert_invariants(&scheduler, &schedule, &roster, &exclusions);
}

#[test]
fn check_reuses_the_gap_recorded_at_build_time() {
    let roster = people(&["alice", "bob"]);
    let exclusions = Exclusions::new();
    let tight = GapPolicy::new(1, 3).unwrap();
    let scheduler = Scheduler::new().with_options(ScheduleOptions {
        gap: tight,
        ..ScheduleOptions::default()
    });
    let schedule = scheduler.build(2025, 6, &roster, &exclusions).unwrap();
    assert_eq!(schedule.gap, tight);
    assert_eq!(schedule.holidays, "weekend-only");

    // options par défaut (5..=8) : l'espacement du planning prime
    let violations = Scheduler::new()
        .check(&schedule, &roster, &exclusions)
        .unwrap();
    assert!(violations.is_empty(), "{violations:?}");

    let mut stale = schedule.clone();
    stale.gap = GapPolicy::default();
    assert!(!Scheduler::new()
        .check(&stale, &roster, &exclusions)
        .unwrap()
        .is_empty());
}
