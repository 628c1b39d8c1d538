use super::{Quota, SchedError};
use crate::model::{ShiftType, Slot};
use tracing::warn;

pub(super) fn count_of(slots: &[Slot], shift: ShiftType) -> usize {
    slots.iter().filter(|s| s.shift == shift).count()
}

/// Condition nécessaire : chaque type a au moins `quota * people` créneaux.
pub(super) fn precheck(slots: &[Slot], quota: &Quota, people: usize) -> Result<(), SchedError> {
    for shift in ShiftType::ALL {
        let available = count_of(slots, shift);
        let required = quota.get(shift) as usize * people;
        if available < required {
            warn!(shift = shift.code(), available, required, "insufficient capacity");
            return Err(SchedError::InsufficientCapacity {
                shift,
                available,
                required,
            });
        }
    }
    Ok(())
}
