//! Jours spéciaux (week-ends et fériés).
//!
//! Le samedi et le dimanche sont toujours spéciaux ; un [`HolidayOracle`]
//! ajoute les fériés. Sans oracle, on retombe sur [`WeekendOnly`].

use anyhow::{bail, Context};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Prédicat « jour férié ». Ne doit pas dépendre d'un état mutable.
pub trait HolidayOracle: Send + Sync {
    fn is_special_day(&self, date: NaiveDate) -> bool;
    /// Nom court pour l'affichage et les logs.
    fn name(&self) -> &str;
}

impl<T: HolidayOracle + ?Sized> HolidayOracle for Box<T> {
    fn is_special_day(&self, date: NaiveDate) -> bool {
        (**self).is_special_day(date)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Week-end ou férié selon l'oracle.
pub fn is_special(holidays: &dyn HolidayOracle, date: NaiveDate) -> bool {
    is_weekend(date) || holidays.is_special_day(date)
}

/// Aucun férié : seuls les week-ends comptent.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeekendOnly;

impl HolidayOracle for WeekendOnly {
    fn is_special_day(&self, _date: NaiveDate) -> bool {
        false
    }
    fn name(&self) -> &str {
        "weekend-only"
    }
}

/// Liste explicite de dates fériées.
#[derive(Debug, Default, Clone)]
pub struct HolidayList {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayList {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Fichier texte : une date ISO par ligne, `#` pour commenter.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading holiday file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing holiday file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut dates = BTreeSet::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            // tolère `date,nom` (export tableur)
            let field = line.split(',').next().unwrap_or(line).trim();
            let date = NaiveDate::parse_from_str(field, "%Y-%m-%d")
                .with_context(|| format!("line {}: invalid date {field}", idx + 1))?;
            dates.insert(date);
        }
        if dates.is_empty() {
            bail!("holiday file contains no date");
        }
        Ok(Self { dates })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayOracle for HolidayList {
    fn is_special_day(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
    fn name(&self) -> &str {
        "holiday-list"
    }
}

/// Fériés nationaux japonais (loi en vigueur, équinoxes valables 1980–2099).
#[derive(Debug, Default, Clone, Copy)]
pub struct JapaneseHolidays;

impl JapaneseHolidays {
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        holidays_of_year(date.year()).get(&date).copied()
    }

    /// Tous les fériés de l'année, jours de remplacement inclus.
    pub fn holidays(&self, year: i32) -> BTreeMap<NaiveDate, &'static str> {
        holidays_of_year(year)
    }
}

impl HolidayOracle for JapaneseHolidays {
    fn is_special_day(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
    fn name(&self) -> &str {
        "jp-holidays"
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn nth_monday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Mon, n)
}

fn equinox_day(year: i32, base: f64, fallback: u32) -> u32 {
    if !(1980..=2099).contains(&year) {
        return fallback;
    }
    let y = f64::from(year - 1980);
    (base + 0.242194 * y - (y / 4.0).floor()).floor() as u32
}

fn national_holidays(year: i32) -> Vec<(Option<NaiveDate>, &'static str)> {
    let mut out = vec![
        (ymd(year, 1, 1), "元日"),
        (ymd(year, 2, 11), "建国記念の日"),
        (ymd(year, 3, equinox_day(year, 20.8431, 20)), "春分の日"),
        (ymd(year, 5, 3), "憲法記念日"),
        (ymd(year, 5, 5), "こどもの日"),
        (ymd(year, 9, equinox_day(year, 23.2488, 23)), "秋分の日"),
        (ymd(year, 11, 3), "文化の日"),
        (ymd(year, 11, 23), "勤労感謝の日"),
    ];

    out.push(if year >= 2000 {
        (nth_monday(year, 1, 2), "成人の日")
    } else {
        (ymd(year, 1, 15), "成人の日")
    });

    out.push(match year {
        y if y >= 2007 => (ymd(year, 4, 29), "昭和の日"),
        y if y >= 1989 => (ymd(year, 4, 29), "みどりの日"),
        _ => (ymd(year, 4, 29), "天皇誕生日"),
    });
    if year >= 2007 {
        out.push((ymd(year, 5, 4), "みどりの日"));
    }

    match year {
        y if y >= 2020 => out.push((ymd(year, 2, 23), "天皇誕生日")),
        1989..=2018 => out.push((ymd(year, 12, 23), "天皇誕生日")),
        _ => {}
    }

    // 2020/2021 : jours déplacés pour les Jeux olympiques
    match year {
        2020 => {
            out.push((ymd(year, 7, 23), "海の日"));
            out.push((ymd(year, 7, 24), "スポーツの日"));
            out.push((ymd(year, 8, 10), "山の日"));
        }
        2021 => {
            out.push((ymd(year, 7, 22), "海の日"));
            out.push((ymd(year, 7, 23), "スポーツの日"));
            out.push((ymd(year, 8, 8), "山の日"));
        }
        _ => {
            match year {
                y if y >= 2003 => out.push((nth_monday(year, 7, 3), "海の日")),
                1996..=2002 => out.push((ymd(year, 7, 20), "海の日")),
                _ => {}
            }
            if year >= 2016 {
                out.push((ymd(year, 8, 11), "山の日"));
            }
            match year {
                y if y >= 2022 => out.push((nth_monday(year, 10, 2), "スポーツの日")),
                2000..=2019 => out.push((nth_monday(year, 10, 2), "体育の日")),
                _ => out.push((ymd(year, 10, 10), "体育の日")),
            }
        }
    }

    out.push(if year >= 2003 {
        (nth_monday(year, 9, 3), "敬老の日")
    } else {
        (ymd(year, 9, 15), "敬老の日")
    });

    if year == 2019 {
        out.push((ymd(year, 5, 1), "即位の日"));
        out.push((ymd(year, 10, 22), "即位礼正殿の儀の行われる日"));
    }

    out
}

fn holidays_of_year(year: i32) -> BTreeMap<NaiveDate, &'static str> {
    let mut days: BTreeMap<NaiveDate, &'static str> = national_holidays(year)
        .into_iter()
        .filter_map(|(date, name)| date.map(|d| (d, name)))
        .collect();

    // 国民の休日 : jour ouvré pris entre deux fériés
    let sandwiched: Vec<NaiveDate> = days
        .keys()
        .filter_map(|d| {
            let mid = *d + Duration::days(1);
            let next = mid + Duration::days(1);
            let qualifies = !days.contains_key(&mid)
                && days.contains_key(&next)
                && mid.weekday() != Weekday::Sun;
            qualifies.then_some(mid)
        })
        .collect();
    for d in sandwiched {
        days.insert(d, "国民の休日");
    }

    // 振替休日 : un férié tombant un dimanche reporte au prochain jour non férié
    let sundays: Vec<NaiveDate> = days
        .keys()
        .filter(|d| d.weekday() == Weekday::Sun)
        .copied()
        .collect();
    for sunday in sundays {
        let mut substitute = sunday + Duration::days(1);
        while days.contains_key(&substitute) {
            substitute += Duration::days(1);
        }
        if substitute.year() == year {
            days.insert(substitute, "振替休日");
        }
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekend_is_always_special() {
        assert!(is_special(&WeekendOnly, d(2025, 6, 7)));
        assert!(is_special(&WeekendOnly, d(2025, 6, 8)));
        assert!(!is_special(&WeekendOnly, d(2025, 6, 9)));
    }

    #[test]
    fn equinoxes_match_published_dates() {
        assert_eq!(equinox_day(2025, 20.8431, 20), 20);
        assert_eq!(equinox_day(2025, 23.2488, 23), 23);
        assert_eq!(equinox_day(2024, 20.8431, 20), 20);
        assert_eq!(equinox_day(2024, 23.2488, 23), 22);
    }

    #[test]
    fn year_2025_has_nineteen_holidays() {
        let days = JapaneseHolidays.holidays(2025);
        assert_eq!(days.len(), 19);
        assert_eq!(days.get(&d(2025, 11, 24)), Some(&"振替休日"));
    }

    #[test]
    fn substitute_holiday_skips_consecutive_holidays() {
        let jp = JapaneseHolidays;
        // 2025-05-04 (dimanche) -> 05-05 déjà férié -> report au 05-06
        assert_eq!(jp.holiday_name(d(2025, 5, 6)), Some("振替休日"));
        assert_eq!(jp.holiday_name(d(2025, 2, 24)), Some("振替休日"));
    }

    #[test]
    fn citizens_holiday_between_two_holidays() {
        let jp = JapaneseHolidays;
        // 2026 :敬老の日 le 21/09, 秋分 le 23/09
        assert_eq!(jp.holiday_name(d(2026, 9, 21)), Some("敬老の日"));
        assert_eq!(jp.holiday_name(d(2026, 9, 22)), Some("国民の休日"));
        assert_eq!(jp.holiday_name(d(2026, 9, 23)), Some("秋分の日"));
    }

    #[test]
    fn holiday_list_parses_comments_and_names() {
        let list = HolidayList::parse("# fériés\n2025-07-14, fête nationale\n\n2025-08-15\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.is_special_day(d(2025, 7, 14)));
        assert!(!list.is_special_day(d(2025, 7, 15)));
        assert!(HolidayList::parse("pas une date").is_err());
    }
}
