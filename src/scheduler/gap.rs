use chrono::NaiveDate;

/// Vrai si, une fois triées, chaque paire de dates consécutives est espacée
/// de `lo..=hi` jours. Zéro ou une date : toujours valide.
pub fn ok_gap(dates: &[NaiveDate], lo: i64, hi: i64) -> bool {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .all(|w| (lo..=hi).contains(&day_diff(w[0], w[1])))
}

/// Teste `picked + [candidate]` sans modifier `picked`.
pub(super) fn accepts_with(picked: &[NaiveDate], candidate: NaiveDate, lo: i64, hi: i64) -> bool {
    let mut trial = Vec::with_capacity(picked.len() + 1);
    trial.extend_from_slice(picked);
    trial.push(candidate);
    ok_gap(&trial, lo, hi)
}

pub(super) fn day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}
