#![forbid(unsafe_code)]
//! Gardes — répartition mensuelle des gardes (jour/nuit, week-end/semaine).
//!
//! - Créneaux générés à partir du calendrier et d'un oracle de fériés.
//! - Quotas par personne, indisponibilités, espacement min/max entre deux gardes.
//! - Recherche aléatoire par redémarrages, déterministe pour une graine donnée.
//! - Aucun état conservé entre deux appels ; le roster JSON est l'affaire de la CLI.

pub mod exclusion;
pub mod holiday;
pub mod io;
pub mod model;
pub mod render;
pub mod scheduler;
pub mod storage;

pub use exclusion::{parse_tags, resolve, DayPart, ExclusionTag, Exclusions};
pub use holiday::{HolidayList, HolidayOracle, JapaneseHolidays, WeekendOnly};
pub use model::{PersonId, Roster, Schedule, ScheduleRecord, ShiftType, Slot};
pub use render::{HtmlTable, ScheduleRenderer, TextTable};
pub use scheduler::{
    build_schedule, ok_gap, GapPolicy, Quota, SchedError, ScheduleOptions, Scheduler, Violation,
    ViolationKind,
};
pub use storage::{JsonStorage, Storage};
