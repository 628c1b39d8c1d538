use super::search::Assignment;
use crate::model::ScheduleRecord;

/// Aplatit une affectation réussie, triée par (date, libellé du type).
pub(super) fn build_records(assignment: Assignment) -> Vec<ScheduleRecord> {
    let mut records: Vec<ScheduleRecord> = assignment
        .picks
        .into_iter()
        .flat_map(|(person, slots)| {
            slots.into_iter().map(move |slot| ScheduleRecord {
                date: slot.date,
                shift: slot.shift,
                person: person.clone(),
            })
        })
        .collect();
    records.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.shift.label().cmp(b.shift.label()))
    });
    records
}
