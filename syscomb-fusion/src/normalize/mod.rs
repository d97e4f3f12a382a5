/// Returns the divisor needed to bring `max_score` into `[0, 1]`, or `None`
/// when the scores already fit.
pub fn max_normalizer(max_score: f64) -> Option<f64> {
    if max_score > 1.0 {
        Some(max_score)
    } else {
        None
    }
}

/// Largest value in `scores`, or `0.0` for an empty slice.
pub fn max_score(scores: &[f64]) -> f64 {
    scores.iter().copied().fold(0.0, f64::max)
}

/// Divides every score by the slice maximum when that maximum exceeds 1.
///
/// Returns the divisor that was applied, if any.
pub fn normalize_by_max(scores: &mut [f64]) -> Option<f64> {
    let divisor = max_normalizer(max_score(scores))?;
    for score in scores.iter_mut() {
        *score /= divisor;
    }
    Some(divisor)
}
