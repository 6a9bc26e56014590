//! Edit distance between normalized keys.

/// Levenshtein distance (unit-cost insert, delete, substitute).
///
/// Callers pass keys produced by [`crate::normalize::normalize`]; raw names
/// would count formatting noise as edits.
pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// True when `a` and `b` are at most `threshold` edits apart.
pub fn within(a: &str, b: &str, threshold: usize) -> bool {
    distance(a, b) <= threshold
}

/// Closest candidate to `key`, as `(label, distance)`.
///
/// Ties keep the first candidate in iteration order.
pub fn closest<'a, I>(key: &str, candidates: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for (label, candidate_key) in candidates {
        let d = distance(key, &candidate_key);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((label, d)),
        }
        if d == 0 {
            break;
        }
    }
    best
}
