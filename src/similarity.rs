//! Edit-distance similarity between short strings.

/// Levenshtein distance between `a` and `b`, counted in Unicode scalar
/// values. Insertions, deletions and substitutions each cost 1.
///
/// The comparison is case-sensitive; [`similarity`] lower-cases first.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Normalized similarity in `[0, 1]`, where 1.0 means identical.
///
/// Both inputs are lower-cased before the distance is computed. Two empty
/// strings are identical.
///
/// ```
/// use sitefind::similarity::similarity;
///
/// assert_eq!(similarity("Pricing", "pricing"), 1.0);
/// assert!((similarity("pricing", "pricin") - 6.0 / 7.0).abs() < 1e-9);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    1.0 - strsim::levenshtein(&a, &b) as f64 / longest as f64
}
