#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use gardes::{
    exclusion::{self, DayPart, ExclusionTag},
    holiday::{HolidayList, HolidayOracle, JapaneseHolidays, WeekendOnly},
    io,
    model::{PersonId, Roster},
    render::{self, HtmlTable, ScheduleRenderer, TextTable},
    scheduler::{GapPolicy, ScheduleOptions, Scheduler, ViolationKind},
    storage::{JsonStorage, Storage},
};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition des gardes mensuelles (roster JSON local)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    /// Source des jours fériés
    #[arg(long, global = true, value_enum, default_value_t = HolidayMode::Weekend)]
    holidays: HolidayMode,

    /// Fichier de dates fériées (une date ISO par ligne), avec `--holidays file`
    #[arg(long, global = true)]
    holiday_file: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HolidayMode {
    /// Week-ends seulement
    Weekend,
    /// Fériés nationaux japonais
    Jp,
    /// Liste lue depuis `--holiday-file`
    File,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter des personnes ("nom1,nom2,...")
    AddPeople {
        #[arg(long)]
        names: String,
    },

    /// Importer des personnes depuis un CSV (header `name`)
    ImportPeople {
        #[arg(long)]
        csv: String,
    },

    /// Retirer une personne et ses indisponibilités
    RemovePerson {
        #[arg(long)]
        name: String,
    },

    /// Basculer une indisponibilité (jour ou nuit)
    Exclude {
        #[arg(long)]
        person: String,
        /// AAAA-MM-JJ
        #[arg(long)]
        date: String,
        /// DAY ou NIGHT
        #[arg(long)]
        part: String,
    },

    /// Importer des indisponibilités (tags `personne|AAAA-MM-JJ|DAY` ou CSV)
    ImportExclusions {
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        csv: Option<String>,
    },

    /// Définir l'espacement (jours) entre deux gardes
    SetGap {
        #[arg(long)]
        lo: i64,
        #[arg(long)]
        hi: i64,
    },

    /// Afficher le calendrier du mois
    Calendar {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Marquer les indisponibilités de cette personne
        #[arg(long)]
        person: Option<String>,
    },

    /// Construire le planning du mois
    Schedule {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Surcharge l'espacement minimal du roster
        #[arg(long)]
        gap_lo: Option<i64>,
        /// Surcharge l'espacement maximal du roster
        #[arg(long)]
        gap_hi: Option<i64>,
        #[arg(long, default_value_t = 30_000)]
        attempts: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        time_limit_secs: Option<u64>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_html: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Vérifier un planning JSON contre le roster
    Check {
        #[arg(long)]
        schedule: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut roster = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::AddPeople { names } => {
            let added = roster.add_people(io::parse_people_list(&names));
            storage.save(&roster)?;
            println!("{added} person(s) added, {} in roster", roster.people.len());
            0
        }
        Commands::ImportPeople { csv } => {
            let added = roster.add_people(io::import_people_csv(csv)?);
            storage.save(&roster)?;
            println!("{added} person(s) added, {} in roster", roster.people.len());
            0
        }
        Commands::RemovePerson { name } => {
            if !roster.remove_person(&PersonId::new(&name)) {
                bail!("unknown person: {name}");
            }
            storage.save(&roster)?;
            0
        }
        Commands::Exclude { person, date, part } => {
            let person = known_person(&roster, &person)?;
            let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid date: {date}"))?;
            let part: DayPart = part.parse()?;
            let tag = ExclusionTag::new(person, date, part);
            let now_set = roster.toggle_exclusion(tag.clone());
            storage.save(&roster)?;
            println!("{} {tag}", if now_set { "+" } else { "-" });
            0
        }
        Commands::ImportExclusions { tags, csv } => {
            let mut all = Vec::new();
            if let Some(raw) = tags {
                all.extend(exclusion::parse_tags(&raw)?);
            }
            if let Some(path) = csv {
                all.extend(io::import_exclusions_csv(path)?);
            }
            if all.is_empty() {
                bail!("nothing to import (use --tags or --csv)");
            }
            for tag in &all {
                known_person(&roster, tag.person.as_str())?;
            }
            let count = all.len();
            roster.unavailable.extend(all);
            storage.save(&roster)?;
            println!("{count} exclusion(s) imported");
            0
        }
        Commands::SetGap { lo, hi } => {
            roster.gap = GapPolicy::new(lo, hi)?;
            storage.save(&roster)?;
            0
        }
        Commands::Calendar {
            year,
            month,
            person,
        } => {
            let holidays = load_holidays(cli.holidays, cli.holiday_file.as_deref())?;
            let tags: Vec<ExclusionTag> = roster.unavailable.iter().cloned().collect();
            let exclusions = exclusion::resolve(&tags, &roster.people, holidays.as_ref())?;
            let person = person.map(|p| known_person(&roster, &p)).transpose()?;
            let grid = render::render_month_grid(
                year,
                month,
                holidays.as_ref(),
                &exclusions,
                person.as_ref(),
            )?;
            print!("{grid}");
            println!("holidays: {}", holidays.name());
            0
        }
        Commands::Schedule {
            year,
            month,
            gap_lo,
            gap_hi,
            attempts,
            seed,
            time_limit_secs,
            out_csv,
            out_html,
            out_json,
        } => {
            let holidays = load_holidays(cli.holidays, cli.holiday_file.as_deref())?;
            let tags: Vec<ExclusionTag> = roster.unavailable.iter().cloned().collect();
            let exclusions = exclusion::resolve(&tags, &roster.people, holidays.as_ref())?;
            let opts = ScheduleOptions {
                gap: GapPolicy::new(
                    gap_lo.unwrap_or(roster.gap.lo),
                    gap_hi.unwrap_or(roster.gap.hi),
                )?,
                max_attempts: attempts,
                seed,
                time_limit: time_limit_secs.map(Duration::from_secs),
                ..ScheduleOptions::default()
            };
            let scheduler = Scheduler::new().with_holidays(holidays).with_options(opts);
            let schedule = scheduler.build(year, month, &roster.people, &exclusions)?;

            print!("{}", TextTable.render(&schedule));
            let unfilled = scheduler.unfilled(&schedule)?;
            eprintln!(
                "{} duty(ies) assigned in {} attempt(s), {} slot(s) left open",
                schedule.records.len(),
                schedule.attempts,
                unfilled.len()
            );

            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &schedule.records)?;
            }
            if let Some(path) = out_html {
                std::fs::write(path, HtmlTable.render(&schedule))?;
            }
            if let Some(path) = out_json {
                io::export_schedule_json(path, &schedule)?;
            }
            0
        }
        Commands::Check { schedule } => {
            let schedule = io::import_schedule_json(schedule)?;
            let holidays = load_holidays(cli.holidays, cli.holiday_file.as_deref())?;
            let tags: Vec<ExclusionTag> = roster.unavailable.iter().cloned().collect();
            let exclusions = exclusion::resolve(&tags, &roster.people, holidays.as_ref())?;
            if !schedule.holidays.is_empty() && schedule.holidays != holidays.name() {
                eprintln!(
                    "warning: schedule built with holidays '{}', checking with '{}'",
                    schedule.holidays,
                    holidays.name()
                );
            }
            let scheduler = Scheduler::new().with_holidays(holidays);
            let violations = scheduler.check(&schedule, &roster.people, &exclusions)?;
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                for v in &violations {
                    let slot = v
                        .slot
                        .map(|s| format!("{} {}", s.date, s.shift.code()))
                        .unwrap_or_else(|| "-".to_string());
                    let kind = match &v.kind {
                        ViolationKind::UnknownSlot => "unknown slot".to_string(),
                        ViolationKind::DoubleAssignment => "double assignment".to_string(),
                        ViolationKind::UnknownPerson => "unknown person".to_string(),
                        ViolationKind::QuotaMismatch {
                            shift,
                            expected,
                            actual,
                        } => format!("quota {}: {actual}/{expected}", shift.code()),
                        ViolationKind::GapViolation { from, to, days } => {
                            format!("gap {from} -> {to}: {days} day(s)")
                        }
                        ViolationKind::Excluded => "excluded slot".to_string(),
                    };
                    eprintln!("{} | {} | {}", v.person, slot, kind);
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
    };

    std::process::exit(code);
}

fn known_person(roster: &Roster, name: &str) -> Result<PersonId> {
    let id = PersonId::new(name);
    if !roster.contains(&id) {
        bail!("unknown person: {name}");
    }
    Ok(id)
}

fn load_holidays(mode: HolidayMode, file: Option<&str>) -> Result<Box<dyn HolidayOracle>> {
    Ok(match mode {
        HolidayMode::Weekend => Box::new(WeekendOnly),
        HolidayMode::Jp => Box::new(JapaneseHolidays),
        HolidayMode::File => {
            let path = file.context("--holidays file requires --holiday-file")?;
            Box::new(HolidayList::load(path)?)
        }
    })
}
