//! Numeric statistics for the variability scorer.
//!
//! Every helper returns `Option<f64>` for undefined results (empty input,
//! single observation, zero mean) so that missing values stay explicit
//! instead of propagating as NaN.

/// Sample mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with the unbiased n−1 denominator.
///
/// `None` for fewer than two observations — a single year of data has no
/// defined spread.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Coefficient of variation from precomputed moments.
///
/// `None` when the mean is zero or the ratio is not finite. The sign of a
/// negative mean is preserved.
pub fn cv_from(mean: f64, std: f64) -> Option<f64> {
    if mean == 0.0 {
        return None;
    }
    let cv = std / mean;
    cv.is_finite().then_some(cv)
}

/// Coefficient of variation of a value series: `sample_std / mean`.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let s = sample_std(values)?;
    cv_from(m, s)
}

/// Mean and sample standard deviation of a peer group.
///
/// `None` when the group has fewer than two members; the std may still be
/// zero for a group of identical values (callers treat that as an undefined
/// z-score denominator).
pub fn group_moments(values: &[f64]) -> Option<(f64, f64)> {
    let m = mean(values)?;
    let s = sample_std(values)?;
    Some((m, s))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
