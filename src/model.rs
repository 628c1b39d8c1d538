use crate::exclusion::ExclusionTag;
use crate::scheduler::GapPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifiant fort pour une personne (son nom, unique dans un roster).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catégorie de garde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftType {
    #[serde(rename = "WE_DAY")]
    WeekendDay,
    #[serde(rename = "WE_NIGHT")]
    WeekendNight,
    #[serde(rename = "WD_NIGHT")]
    WeekdayNight,
}

impl ShiftType {
    pub const ALL: [ShiftType; 3] = [
        ShiftType::WeekendDay,
        ShiftType::WeekendNight,
        ShiftType::WeekdayNight,
    ];

    /// Code court stable (JSON, logs).
    pub fn code(self) -> &'static str {
        match self {
            ShiftType::WeekendDay => "WE_DAY",
            ShiftType::WeekendNight => "WE_NIGHT",
            ShiftType::WeekdayNight => "WD_NIGHT",
        }
    }

    /// Libellé affiché (tableaux, export CSV). Sert aussi de clé de tri.
    pub fn label(self) -> &'static str {
        match self {
            ShiftType::WeekendDay => "休日 日直",
            ShiftType::WeekendNight => "休日 宿直",
            ShiftType::WeekdayNight => "平日 宿直",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Créneau assignable : un jour et un type de garde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub shift: ShiftType,
}

impl Slot {
    pub fn new(date: NaiveDate, shift: ShiftType) -> Self {
        Self { date, shift }
    }
}

/// Ligne du planning final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub date: NaiveDate,
    pub shift: ShiftType,
    pub person: PersonId,
}

impl ScheduleRecord {
    pub fn slot(&self) -> Slot {
        Slot::new(self.date, self.shift)
    }
}

/// Planning d'un mois, tel que retourné par la recherche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: i32,
    pub month: u32,
    pub seed: u64,
    /// Nombre de tentatives consommées (1 = premier essai réussi).
    pub attempts: u32,
    /// Espacement appliqué à la construction ; `check` le réutilise.
    #[serde(default)]
    pub gap: GapPolicy,
    /// Nom de l'oracle de fériés utilisé (`weekend-only`, `jp-holidays`, ...).
    #[serde(default)]
    pub holidays: String,
    pub records: Vec<ScheduleRecord>,
}

impl Schedule {
    pub fn records_for<'a>(&'a self, person: &'a PersonId) -> impl Iterator<Item = &'a ScheduleRecord> {
        self.records.iter().filter(move |r| &r.person == person)
    }
}

/// Roster persisté entre deux appels de la CLI : personnes, indisponibilités brutes et espacement.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub people: Vec<PersonId>,
    #[serde(default)]
    pub unavailable: BTreeSet<ExclusionTag>,
    #[serde(default)]
    pub gap: GapPolicy,
}

impl Roster {
    pub fn contains(&self, person: &PersonId) -> bool {
        self.people.iter().any(|p| p == person)
    }

    /// Ajoute les personnes absentes, dans l'ordre fourni. Retourne le nombre d'ajouts.
    pub fn add_people<I: IntoIterator<Item = PersonId>>(&mut self, people: I) -> usize {
        let mut added = 0;
        for person in people {
            if person.as_str().is_empty() || self.contains(&person) {
                continue;
            }
            self.people.push(person);
            added += 1;
        }
        added
    }

    /// Retire une personne et ses indisponibilités.
    pub fn remove_person(&mut self, person: &PersonId) -> bool {
        let before = self.people.len();
        self.people.retain(|p| p != person);
        self.unavailable.retain(|tag| &tag.person != person);
        self.people.len() != before
    }

    /// Bascule une indisponibilité (comme un clic sur le calendrier).
    /// Retourne `true` si le tag est désormais présent.
    pub fn toggle_exclusion(&mut self, tag: ExclusionTag) -> bool {
        if self.unavailable.remove(&tag) {
            false
        } else {
            self.unavailable.insert(tag);
            true
        }
    }
}
