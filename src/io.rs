use crate::exclusion::{DayPart, ExclusionTag};
use crate::model::{PersonId, Schedule, ScheduleRecord};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// BOM UTF-8 : les tableurs détectent ainsi l'encodage du CSV.
pub const UTF8_BOM: &str = "\u{feff}";

/// `"a, b,,c"` -> `[a, b, c]` ; vides ignorés, doublons retirés (premier gardé).
pub fn parse_people_list(raw: &str) -> Vec<PersonId> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(PersonId::new)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Import de personnes depuis CSV: header `name`
pub fn import_people_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<PersonId>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid people row (empty)");
        }
        out.push(PersonId::new(name));
    }
    Ok(out)
}

/// Import d'indisponibilités: header `person,date,part` (part = DAY | NIGHT)
pub fn import_exclusions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ExclusionTag>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let person = rec.get(0).context("missing person")?.trim();
        let date = rec.get(1).context("missing date")?.trim();
        let part = rec.get(2).context("missing part")?;
        if person.is_empty() {
            bail!("row {}: empty person", idx + 1);
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("row {}: invalid date {date}", idx + 1))?;
        let part = part
            .parse::<DayPart>()
            .with_context(|| format!("row {}: invalid part", idx + 1))?;
        out.push(ExclusionTag::new(PersonId::new(person), date, part));
    }
    Ok(out)
}

/// CSV du planning (BOM + header `Date,Shift,Person`), libellés affichés pour les types.
pub fn write_schedule_csv<W: Write>(mut out: W, records: &[ScheduleRecord]) -> anyhow::Result<()> {
    out.write_all(UTF8_BOM.as_bytes())?;
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["Date", "Shift", "Person"])?;
    for r in records {
        let date = r.date.format("%Y-%m-%d").to_string();
        w.write_record([date.as_str(), r.shift.label(), r.person.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(path: P, records: &[ScheduleRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_schedule_csv(BufWriter::new(file), records)
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn import_schedule_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Schedule> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let schedule: Schedule = serde_json::from_slice(&data)
        .with_context(|| format!("parsing schedule {}", path.display()))?;
    Ok(schedule)
}
