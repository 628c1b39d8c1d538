use super::SchedError;
use crate::holiday::{is_special, HolidayOracle};
use crate::model::{ShiftType, Slot};
use chrono::{Datelike, NaiveDate};

/// Jours du mois, dans l'ordre.
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, SchedError> {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(SchedError::InvalidMonth { year, month })?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}

/// Week-end ou férié : jour + nuit ; jour ordinaire : une nuit de semaine.
pub(super) fn generate_slots(
    year: i32,
    month: u32,
    holidays: &dyn HolidayOracle,
) -> Result<Vec<Slot>, SchedError> {
    let mut slots = Vec::new();
    for date in month_days(year, month)? {
        if is_special(holidays, date) {
            slots.push(Slot::new(date, ShiftType::WeekendDay));
            slots.push(Slot::new(date, ShiftType::WeekendNight));
        } else {
            slots.push(Slot::new(date, ShiftType::WeekdayNight));
        }
    }
    Ok(slots)
}
