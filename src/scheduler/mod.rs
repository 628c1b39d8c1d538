mod conflicts;
mod feasibility;
mod gap;
mod result;
mod search;
mod slots;
mod types;

pub use gap::ok_gap;
pub use slots::month_days;
pub use types::{GapPolicy, Quota, SchedError, ScheduleOptions, Violation, ViolationKind};

use crate::exclusion::Exclusions;
use crate::holiday::{HolidayOracle, WeekendOnly};
use crate::model::{PersonId, Schedule, ScheduleRecord, Slot};
use std::collections::HashSet;
use std::fmt;
use tracing::info;

/// Scheduler : un oracle de fériés et des options, sans état entre deux appels.
pub struct Scheduler {
    holidays: Box<dyn HolidayOracle>,
    opts: ScheduleOptions,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("holidays", &self.holidays.name())
            .field("opts", &self.opts)
            .finish()
    }
}

impl Scheduler {
    /// Week-ends seulement, options par défaut.
    pub fn new() -> Self {
        Self {
            holidays: Box::new(WeekendOnly),
            opts: ScheduleOptions::default(),
        }
    }

    pub fn with_holidays<H: HolidayOracle + 'static>(mut self, holidays: H) -> Self {
        self.holidays = Box::new(holidays);
        self
    }

    pub fn with_options(mut self, opts: ScheduleOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.opts
    }

    pub fn holidays(&self) -> &dyn HolidayOracle {
        self.holidays.as_ref()
    }

    pub fn generate_slots(&self, year: i32, month: u32) -> Result<Vec<Slot>, SchedError> {
        slots::generate_slots(year, month, self.holidays())
    }

    pub fn precheck(&self, slots: &[Slot], people: usize) -> Result<(), SchedError> {
        feasibility::precheck(slots, &self.opts.quota, people)
    }

    /// Construit le planning du mois, ou échoue sans résultat partiel.
    pub fn build(
        &self,
        year: i32,
        month: u32,
        people: &[PersonId],
        exclusions: &Exclusions,
    ) -> Result<Schedule, SchedError> {
        run(year, month, people, exclusions, &self.opts, self.holidays())
    }

    /// Violations d'un planning existant (vide pour tout planning issu de [`Scheduler::build`]).
    /// L'espacement vérifié est celui enregistré dans le planning, pas celui des options.
    pub fn check(
        &self,
        schedule: &Schedule,
        people: &[PersonId],
        exclusions: &Exclusions,
    ) -> Result<Vec<Violation>, SchedError> {
        let slots = self.generate_slots(schedule.year, schedule.month)?;
        Ok(conflicts::detect_violations(
            &schedule.records,
            &slots,
            people,
            exclusions,
            &self.opts.quota,
            schedule.gap,
        ))
    }

    /// Créneaux du mois restés sans titulaire.
    pub fn unfilled(&self, schedule: &Schedule) -> Result<Vec<Slot>, SchedError> {
        let slots = self.generate_slots(schedule.year, schedule.month)?;
        Ok(conflicts::unfilled_slots(&slots, &schedule.records))
    }
}

/// Point d'entrée sans état : `holidays = None` revient aux week-ends seuls.
pub fn build_schedule(
    year: i32,
    month: u32,
    people: &[PersonId],
    exclusions: &Exclusions,
    opts: ScheduleOptions,
    holidays: Option<&dyn HolidayOracle>,
) -> Result<Vec<ScheduleRecord>, SchedError> {
    let schedule = run(
        year,
        month,
        people,
        exclusions,
        &opts,
        holidays.unwrap_or(&WeekendOnly),
    )?;
    Ok(schedule.records)
}

fn run(
    year: i32,
    month: u32,
    people: &[PersonId],
    exclusions: &Exclusions,
    opts: &ScheduleOptions,
    holidays: &dyn HolidayOracle,
) -> Result<Schedule, SchedError> {
    opts.gap.validate()?;
    validate_people(people)?;

    let slots = slots::generate_slots(year, month, holidays)?;
    feasibility::precheck(&slots, &opts.quota, people.len())?;

    let (assignment, attempts) = search::search(&slots, people, exclusions, opts)?;
    let records = result::build_records(assignment);
    info!(year, month, attempts, records = records.len(), "schedule built");

    Ok(Schedule {
        year,
        month,
        seed: opts.seed,
        attempts,
        gap: opts.gap,
        holidays: holidays.name().to_string(),
        records,
    })
}

fn validate_people(people: &[PersonId]) -> Result<(), SchedError> {
    if people.is_empty() {
        return Err(SchedError::NoPeople);
    }
    let mut seen = HashSet::new();
    for person in people {
        if !seen.insert(person) {
            return Err(SchedError::DuplicatePerson(person.as_str().to_string()));
        }
    }
    Ok(())
}
