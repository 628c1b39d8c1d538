//! Indisponibilités : tags bruts `personne|AAAA-MM-JJ|DAY|NIGHT` et leur
//! résolution en créneaux interdits.

use crate::holiday::{is_special, HolidayOracle};
use crate::model::{PersonId, ShiftType, Slot};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Moitié de journée cliquée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayPart {
    Day,
    Night,
}

impl DayPart {
    pub fn as_str(self) -> &'static str {
        match self {
            DayPart::Day => "DAY",
            DayPart::Night => "NIGHT",
        }
    }

    /// Type de garde visé selon la nature du jour ; `None` pour un DAY en semaine.
    pub fn shift_on(self, special_day: bool) -> Option<ShiftType> {
        match (self, special_day) {
            (DayPart::Day, true) => Some(ShiftType::WeekendDay),
            (DayPart::Day, false) => None,
            (DayPart::Night, true) => Some(ShiftType::WeekendNight),
            (DayPart::Night, false) => Some(ShiftType::WeekdayNight),
        }
    }
}

impl FromStr for DayPart {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" | "D" => Ok(DayPart::Day),
            "NIGHT" | "N" => Ok(DayPart::Night),
            other => bail!("invalid day part: {other} (expected DAY or NIGHT)"),
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag d'indisponibilité tel que collecté par l'interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExclusionTag {
    pub person: PersonId,
    pub date: NaiveDate,
    pub part: DayPart,
}

impl ExclusionTag {
    pub fn new(person: PersonId, date: NaiveDate, part: DayPart) -> Self {
        Self { person, date, part }
    }
}

impl FromStr for ExclusionTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // le nom peut lui-même contenir un '|', on découpe par la droite
        let mut parts = s.trim().rsplitn(3, '|');
        let (Some(part), Some(date), Some(person)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("invalid exclusion tag: {s} (expected person|YYYY-MM-DD|DAY|NIGHT)");
        };
        let person = PersonId::new(person);
        if person.as_str().is_empty() {
            bail!("invalid exclusion tag: {s} (empty person)");
        }
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date in exclusion tag: {s}"))?;
        let part = part.parse::<DayPart>()?;
        Ok(Self { person, date, part })
    }
}

impl TryFrom<String> for ExclusionTag {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExclusionTag> for String {
    fn from(tag: ExclusionTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for ExclusionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.person, self.date.format("%Y-%m-%d"), self.part)
    }
}

/// Parse une liste `tag1,tag2,...` ; les éléments vides sont ignorés.
pub fn parse_tags(raw: &str) -> anyhow::Result<Vec<ExclusionTag>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse::<ExclusionTag>)
        .collect()
}

/// Créneaux interdits, par personne. Une personne absente n'a aucune exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    by_person: HashMap<PersonId, HashSet<Slot>>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, person: PersonId, slot: Slot) -> bool {
        self.by_person.entry(person).or_default().insert(slot)
    }

    pub fn is_excluded(&self, person: &PersonId, slot: &Slot) -> bool {
        self.by_person
            .get(person)
            .is_some_and(|slots| slots.contains(slot))
    }

    pub fn for_person(&self, person: &PersonId) -> Option<&HashSet<Slot>> {
        self.by_person.get(person)
    }

    pub fn len(&self) -> usize {
        self.by_person.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convertit les tags bruts en créneaux interdits.
///
/// - `DAY` ne vise que `WeekendDay`, et seulement un jour spécial (week-end ou férié) ;
///   sur un jour ordinaire il n'a pas d'effet.
/// - `NIGHT` vise `WeekendNight` un jour spécial, `WeekdayNight` sinon.
pub fn resolve(
    tags: &[ExclusionTag],
    people: &[PersonId],
    holidays: &dyn HolidayOracle,
) -> anyhow::Result<Exclusions> {
    let mut out = Exclusions::new();
    for tag in tags {
        if !people.contains(&tag.person) {
            bail!("exclusion for unknown person: {}", tag.person);
        }
        if let Some(shift) = tag.part.shift_on(is_special(holidays, tag.date)) {
            out.insert(tag.person.clone(), Slot::new(tag.date, shift));
        }
    }
    Ok(out)
}
