use crate::exclusion::Exclusions;
use crate::holiday::{is_special, HolidayOracle};
use crate::model::{PersonId, Schedule, ShiftType, Slot};
use crate::scheduler::{month_days, SchedError};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

/// Permet de customiser le rendu du planning (terminal, page HTML, etc.).
pub trait ScheduleRenderer {
    fn render(&self, schedule: &Schedule) -> String;
}

/// Une ligne par garde : `date | type | personne`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTable;

impl ScheduleRenderer for TextTable {
    fn render(&self, schedule: &Schedule) -> String {
        let mut out = String::new();
        for r in &schedule.records {
            let _ = writeln!(out, "{} | {} | {}", r.date, r.shift.label(), r.person);
        }
        out
    }
}

/// Tableau HTML autonome (échappé), comme la page de résultat.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTable;

impl ScheduleRenderer for HtmlTable {
    fn render(&self, schedule: &Schedule) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<h2>{}-{:02}</h2>", schedule.year, schedule.month);
        out.push_str(
            "<table border=\"1\" cellspacing=\"0\" cellpadding=\"4\" style=\"border-collapse:collapse\">\n",
        );
        out.push_str("<tr><th>Date</th><th>Shift</th><th>Person</th></tr>\n");
        for r in &schedule.records {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                r.date,
                escape_html(r.shift.label()),
                escape_html(r.person.as_str())
            );
        }
        out.push_str("</table>\n");
        out
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Semaines du mois, dimanche en premier ; `None` hors du mois.
pub fn month_weeks(year: i32, month: u32) -> Result<Vec<[Option<NaiveDate>; 7]>, SchedError> {
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    for date in month_days(year, month)? {
        let col = date.weekday().num_days_from_sunday() as usize;
        week[col] = Some(date);
        if col == 6 {
            weeks.push(week);
            week = [None; 7];
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    Ok(weeks)
}

/// Calendrier texte du mois : `*` jour spécial, `D`/`N` indisponibilité jour/nuit de `person`.
pub fn render_month_grid(
    year: i32,
    month: u32,
    holidays: &dyn HolidayOracle,
    exclusions: &Exclusions,
    person: Option<&PersonId>,
) -> Result<String, SchedError> {
    let mut out = String::new();
    let _ = writeln!(out, "{year}-{month:02}");
    let header: String = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
        .iter()
        .map(|d| format!("{d:>3}   "))
        .collect();
    let _ = writeln!(out, "{}", header.trim_end());

    for week in month_weeks(year, month)? {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(date) => {
                    let special = is_special(holidays, date);
                    let (day_off, night_off) = match person {
                        Some(p) => blocked_parts(exclusions, p, date, special),
                        None => (false, false),
                    };
                    let _ = write!(
                        line,
                        "{:>3}{}{}{}",
                        date.day(),
                        if special { '*' } else { ' ' },
                        if day_off { 'D' } else { ' ' },
                        if night_off { 'N' } else { ' ' }
                    );
                }
                None => line.push_str("      "),
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    Ok(out)
}

fn blocked_parts(
    exclusions: &Exclusions,
    person: &PersonId,
    date: NaiveDate,
    special: bool,
) -> (bool, bool) {
    let night = if special {
        ShiftType::WeekendNight
    } else {
        ShiftType::WeekdayNight
    };
    let day_off = special && exclusions.is_excluded(person, &Slot::new(date, ShiftType::WeekendDay));
    let night_off = exclusions.is_excluded(person, &Slot::new(date, night));
    (day_off, night_off)
}
