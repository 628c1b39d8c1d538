use super::{gap, ScheduleOptions, SchedError};
use crate::exclusion::Exclusions;
use crate::model::{PersonId, ShiftType, Slot};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Solution candidate : créneaux pris par chaque personne, dans l'ordre de traitement.
#[derive(Debug, Clone)]
pub(super) struct Assignment {
    pub(super) picks: Vec<(PersonId, Vec<Slot>)>,
}

/// Dates disponibles par type, triées. Clé ordonnée : l'ordre des mélanges est stable.
type Stock = BTreeMap<ShiftType, Vec<NaiveDate>>;

fn stock_of(slots: &[Slot]) -> Stock {
    let mut stock: Stock = ShiftType::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for slot in slots {
        stock.entry(slot.shift).or_default().push(slot.date);
    }
    stock
}

/// Recherche par redémarrages : chaque tentative repart d'un pool complet,
/// sans retour arrière. Retourne la première solution et le rang de la tentative.
pub(super) fn search(
    slots: &[Slot],
    people: &[PersonId],
    exclusions: &Exclusions,
    opts: &ScheduleOptions,
) -> Result<(Assignment, u32), SchedError> {
    // générateur propre à l'appel, jamais partagé
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let stock = stock_of(slots);
    let started = Instant::now();

    debug!(
        slots = slots.len(),
        people = people.len(),
        seed = opts.seed,
        max_attempts = opts.max_attempts,
        "starting assignment search"
    );

    for attempt in 1..=opts.max_attempts {
        if let Some(assignment) = try_once(&mut rng, &stock, people, exclusions, opts) {
            return Ok((assignment, attempt));
        }
        trace!(attempt, "attempt failed");

        if let Some(limit) = opts.time_limit {
            if started.elapsed() >= limit {
                warn!(attempt, ?limit, "search time limit reached");
                return Err(SchedError::SearchExhausted { attempts: attempt });
            }
        }
    }

    warn!(attempts = opts.max_attempts, "search exhausted");
    Err(SchedError::SearchExhausted {
        attempts: opts.max_attempts,
    })
}

fn try_once(
    rng: &mut StdRng,
    stock: &Stock,
    people: &[PersonId],
    exclusions: &Exclusions,
    opts: &ScheduleOptions,
) -> Option<Assignment> {
    let mut pool = stock.clone();
    for dates in pool.values_mut() {
        dates.shuffle(rng);
    }

    let mut order: Vec<&PersonId> = people.iter().collect();
    order.shuffle(rng);

    let mut picks = Vec::with_capacity(people.len());
    for person in order {
        let mut requests = opts.quota.requests();
        requests.shuffle(rng);

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(requests.len());
        let mut taken: Vec<Slot> = Vec::with_capacity(requests.len());

        for shift in requests {
            let available = pool.get_mut(&shift)?;
            let candidates: Vec<NaiveDate> = available
                .iter()
                .copied()
                .filter(|d| {
                    !exclusions.is_excluded(person, &Slot::new(*d, shift))
                        && gap::accepts_with(&dates, *d, opts.gap.lo, opts.gap.hi)
                })
                .collect();

            // aucun candidat : toute la tentative échoue
            let chosen = *candidates.choose(rng)?;
            let pos = available.iter().position(|d| *d == chosen)?;
            available.remove(pos);

            dates.push(chosen);
            taken.push(Slot::new(chosen, shift));
        }

        picks.push((person.clone(), taken));
    }

    Some(Assignment { picks })
}
