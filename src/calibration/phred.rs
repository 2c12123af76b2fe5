//! Conversions between Phred scores and error probabilities.
//!
//! A Phred score Q relates to an error probability P by `Q = -10 * log10(P)`,
//! so `P = 10^(-Q/10)`. An observed error rate of zero has no finite Phred
//! score; it is reported as a fixed ceiling instead.

/// Phred value reported when no error was observed
pub const DEFAULT_MAX_PHRED: f64 = 100.0;

/// Error probability predicted by a Phred score
///
/// # Examples
/// ```
/// use merge_eval::calibration::phred::phred_to_error_probability;
///
/// assert!((phred_to_error_probability(20) - 0.01).abs() < 1e-12);
/// assert!((phred_to_error_probability(0) - 1.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn phred_to_error_probability(phred: u8) -> f64 {
    10f64.powf(-f64::from(phred) / 10.0)
}

/// Phred score of an error probability.
///
/// - `p <= 0` maps to `max_phred`
/// - `p >= 1` maps to `0`
/// - not-a-number stays not-a-number
///
/// # Examples
/// ```
/// use merge_eval::calibration::phred::error_probability_to_phred;
///
/// assert_eq!(error_probability_to_phred(0.0, 100.0), 100.0);
/// assert_eq!(error_probability_to_phred(1.0, 100.0), 0.0);
/// assert!((error_probability_to_phred(0.001, 100.0) - 30.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn error_probability_to_phred(p: f64, max_phred: f64) -> f64 {
    if p.is_nan() {
        f64::NAN
    } else if p <= 0.0 {
        max_phred
    } else if p >= 1.0 {
        0.0
    } else {
        -10.0 * p.log10()
    }
}
