use super::{gap, GapPolicy, Quota, Violation, ViolationKind};
use crate::exclusion::Exclusions;
use crate::model::{PersonId, ScheduleRecord, ShiftType, Slot};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Vérifie un planning contre les créneaux du mois, les quotas, l'espacement et les exclusions.
pub(super) fn detect_violations(
    records: &[ScheduleRecord],
    slots: &[Slot],
    people: &[PersonId],
    exclusions: &Exclusions,
    quota: &Quota,
    gap_policy: GapPolicy,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let generated: HashSet<Slot> = slots.iter().copied().collect();
    let mut seen: HashSet<Slot> = HashSet::new();

    for record in records {
        let slot = record.slot();
        if !generated.contains(&slot) {
            out.push(violation(&record.person, Some(slot), ViolationKind::UnknownSlot));
        }
        if !seen.insert(slot) {
            out.push(violation(&record.person, Some(slot), ViolationKind::DoubleAssignment));
        }
        if !people.contains(&record.person) {
            out.push(violation(&record.person, Some(slot), ViolationKind::UnknownPerson));
        }
        if exclusions.is_excluded(&record.person, &slot) {
            out.push(violation(&record.person, Some(slot), ViolationKind::Excluded));
        }
    }

    let mut by_person: HashMap<&PersonId, Vec<&ScheduleRecord>> = HashMap::new();
    for record in records {
        by_person.entry(&record.person).or_default().push(record);
    }

    for person in people {
        let own = by_person.get(person).map(Vec::as_slice).unwrap_or(&[]);

        for shift in ShiftType::ALL {
            let expected = quota.get(shift);
            let actual = own.iter().filter(|r| r.shift == shift).count() as u32;
            if actual != expected {
                out.push(violation(
                    person,
                    None,
                    ViolationKind::QuotaMismatch {
                        shift,
                        expected,
                        actual,
                    },
                ));
            }
        }

        let mut dates: Vec<NaiveDate> = own.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        for pair in dates.windows(2) {
            let days = gap::day_diff(pair[0], pair[1]);
            if !gap_policy.contains(days) {
                out.push(violation(
                    person,
                    None,
                    ViolationKind::GapViolation {
                        from: pair[0],
                        to: pair[1],
                        days,
                    },
                ));
            }
        }
    }

    out
}

/// Créneaux générés que personne n'a pris, dans l'ordre du mois.
pub(super) fn unfilled_slots(slots: &[Slot], records: &[ScheduleRecord]) -> Vec<Slot> {
    let taken: HashSet<Slot> = records.iter().map(ScheduleRecord::slot).collect();
    slots.iter().filter(|s| !taken.contains(s)).copied().collect()
}

fn violation(person: &PersonId, slot: Option<Slot>, kind: ViolationKind) -> Violation {
    Violation {
        person: person.clone(),
        slot,
        kind,
    }
}
