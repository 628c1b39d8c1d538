use crate::model::{PersonId, ShiftType, Slot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Nombre de gardes de chaque type dues par personne.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub weekend_day: u32,
    pub weekend_night: u32,
    pub weekday_night: u32,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            weekend_day: 1,
            weekend_night: 1,
            weekday_night: 2,
        }
    }
}

impl Quota {
    pub fn get(&self, shift: ShiftType) -> u32 {
        match shift {
            ShiftType::WeekendDay => self.weekend_day,
            ShiftType::WeekendNight => self.weekend_night,
            ShiftType::WeekdayNight => self.weekday_night,
        }
    }

    pub fn per_person(&self) -> u32 {
        ShiftType::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Une entrée par unité de quota, dans l'ordre de [`ShiftType::ALL`].
    pub fn requests(&self) -> Vec<ShiftType> {
        let mut out = Vec::with_capacity(self.per_person() as usize);
        for shift in ShiftType::ALL {
            out.extend(std::iter::repeat(shift).take(self.get(shift) as usize));
        }
        out
    }
}

/// Écart en jours (bornes incluses) entre deux gardes successives d'une personne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapPolicy {
    pub lo: i64,
    pub hi: i64,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self { lo: 5, hi: 8 }
    }
}

impl GapPolicy {
    pub fn new(lo: i64, hi: i64) -> Result<Self, SchedError> {
        let gap = Self { lo, hi };
        gap.validate()?;
        Ok(gap)
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.lo < 0 || self.lo > self.hi {
            return Err(SchedError::InvalidGapPolicy {
                lo: self.lo,
                hi: self.hi,
            });
        }
        Ok(())
    }

    pub fn contains(&self, days: i64) -> bool {
        (self.lo..=self.hi).contains(&days)
    }

    pub fn accepts(&self, dates: &[NaiveDate]) -> bool {
        super::gap::ok_gap(dates, self.lo, self.hi)
    }
}

/// Options de recherche
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    pub gap: GapPolicy,
    pub quota: Quota,
    pub max_attempts: u32,
    pub seed: u64,
    /// Limite de temps optionnelle ; rend le résultat dépendant de la machine.
    pub time_limit: Option<Duration>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            gap: GapPolicy::default(),
            quota: Quota::default(),
            max_attempts: 30_000,
            seed: 42,
            time_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Créneau absent du mois généré.
    UnknownSlot,
    /// Créneau attribué plusieurs fois.
    DoubleAssignment,
    /// Personne absente du roster.
    UnknownPerson,
    QuotaMismatch {
        shift: ShiftType,
        expected: u32,
        actual: u32,
    },
    GapViolation {
        from: NaiveDate,
        to: NaiveDate,
        days: i64,
    },
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub person: PersonId,
    pub slot: Option<Slot>,
    pub kind: ViolationKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("invalid gap policy: need 0 <= lo <= hi (lo={lo}, hi={hi})")]
    InvalidGapPolicy { lo: i64, hi: i64 },
    #[error("no people to schedule")]
    NoPeople,
    #[error("duplicate person: {0}")]
    DuplicatePerson(String),
    #[error("insufficient capacity for {shift:?}: {available} slot(s) available, {required} required")]
    InsufficientCapacity {
        shift: ShiftType,
        available: usize,
        required: usize,
    },
    #[error("no valid assignment found after {attempts} attempt(s)")]
    SearchExhausted { attempts: u32 },
}
