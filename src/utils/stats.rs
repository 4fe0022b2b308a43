//! Statistical utility functions.

/// Lower/upper clamp applied to probabilities before taking log-odds.
pub const LOGIT_EPS: f64 = 1e-6;

/// Log-odds of a probability, clamped to `[1e-6, 1 - 1e-6]`.
///
/// # Example
/// ```
/// use seasonal_fusion::utils::logit;
///
/// assert_eq!(logit(0.5), 0.0);
/// assert!(logit(0.0).is_finite());
/// assert!(logit(0.75) > 0.0);
/// ```
pub fn logit(p: f64) -> f64 {
    let q = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    (q / (1.0 - q)).ln()
}

/// Logistic function `1 / (1 + e^-z)`.
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Exponential decay rate `ln 2 / half_life`.
///
/// Returns `None` when no half-life is configured or it is not positive,
/// in which case every sample weighs 1.
pub fn decay_rate(half_life: Option<f64>) -> Option<f64> {
    match half_life {
        Some(h) if h > 0.0 && h.is_finite() => Some(std::f64::consts::LN_2 / h.max(1e-9)),
        _ => None,
    }
}

/// Recency weight `exp(-rate * age)` for a sample `age` years old.
pub fn recency_weight(rate: Option<f64>, age: f64) -> f64 {
    match rate {
        Some(lambda) => (-lambda * age).exp(),
        None => 1.0,
    }
}

/// First year of a trailing window of `window_years` ending before `as_of`.
///
/// `None` (no window) when the width is missing or zero. Widths beyond the
/// `i32` range saturate, so the window then covers every year.
pub fn window_start(as_of: i32, window_years: Option<u32>) -> Option<i32> {
    let width = window_years.filter(|&w| w > 0)?;
    Some(i32::try_from(width).map_or(i32::MIN, |w| as_of.saturating_sub(w)))
}

/// Beta-smoothed accuracy `(hits + a) / (n + a + b)`.
pub fn beta_smoothed(hits: f64, n: f64, prior_a: f64, prior_b: f64) -> f64 {
    (hits + prior_a) / (n + prior_a + prior_b)
}

/// First year of the "late" half: the element at position `len / 2`.
///
/// Years strictly before it form the early half. `None` for an empty slice.
/// The input must be sorted ascending.
pub fn split_year(sorted_years: &[i32]) -> Option<i32> {
    sorted_years.get(sorted_years.len() / 2).copied()
}

/// Stability of a split-half accuracy pair: `1 - |late - early|` in `[0, 1]`.
pub fn stability(acc_early: f64, acc_late: f64) -> f64 {
    (1.0 - (acc_early - acc_late).abs()).clamp(0.0, 1.0)
}

/// Ratio that falls back to `fallback` when the denominator is zero.
pub fn ratio_or(num: f64, den: f64, fallback: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        fallback
    }
}
