//! Exact (Clopper–Pearson) confidence intervals for a binomial proportion.
//!
//! For `k` successes in `n` trials at significance level `alpha`:
//!
//! - lower bound: `0` if `k == 0`, else the `alpha/2` quantile of `Beta(k, n-k+1)`
//! - upper bound: `1` if `k == n`, else the `1-alpha/2` quantile of `Beta(k+1, n-k)`
//!
//! Beta quantiles are found by bisecting the regularized incomplete beta
//! function from `statrs`, which is monotone in `x`, down to floating point
//! resolution. This keeps tiny bounds (error rates of 1e-6 and below) exact in
//! relative terms.

use statrs::function::beta::beta_reg;

use crate::calibration::CalibrationError;

/// Upper bound on bisection steps; enough to reach the smallest subnormal
const MAX_BISECTION_STEPS: usize = 1100;

/// Quantile function of `Beta(a, b)` at probability `p`
///
/// `a` and `b` must be positive; `p` outside `(0, 1)` clamps to the support.
#[must_use]
pub fn beta_quantile(a: f64, b: f64, p: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..MAX_BISECTION_STEPS {
        let mid = lo + (hi - lo) / 2.0;
        if mid <= lo || mid >= hi {
            break;
        }
        if beta_reg(a, b, mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo + (hi - lo) / 2.0
}

/// Two-sided Clopper–Pearson interval for `k` events in `n` trials.
///
/// Returns `(lower, upper)`. With `n == 0` the interval is `(0, 1)`.
///
/// # Errors
///
/// Returns `CalibrationError::InvalidAlpha` unless `0 < alpha < 1`, and
/// `CalibrationError::CountsOutOfRange` if `k > n`.
pub fn clopper_pearson(n: u64, k: u64, alpha: f64) -> Result<(f64, f64), CalibrationError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(CalibrationError::InvalidAlpha(alpha));
    }
    if k > n {
        return Err(CalibrationError::CountsOutOfRange { n, k });
    }

    #[allow(clippy::cast_precision_loss)]
    let (n_f, k_f) = (n as f64, k as f64);

    let lower = if k == 0 {
        0.0
    } else {
        beta_quantile(k_f, n_f - k_f + 1.0, alpha / 2.0)
    };
    let upper = if k == n {
        1.0
    } else {
        beta_quantile(k_f + 1.0, n_f - k_f, 1.0 - alpha / 2.0)
    };

    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_quantile_uniform() {
        for p in [0.01, 0.25, 0.5, 0.9] {
            assert!((beta_quantile(1.0, 1.0, p) - p).abs() < 1e-10);
        }
    }

    #[test]
    fn test_beta_quantile_closed_form() {
        // Beta(a, 1) has CDF x^a
        let q = beta_quantile(4.0, 1.0, 0.3);
        assert!((q - 0.3_f64.powf(0.25)).abs() < 1e-10);
        // Beta(1, b) has CDF 1 - (1-x)^b
        let q = beta_quantile(1.0, 7.0, 0.8);
        assert!((q - (1.0 - 0.2_f64.powf(1.0 / 7.0))).abs() < 1e-10);
    }

    #[test]
    fn test_no_events_upper_bound() {
        // n=10, k=0: upper bound is the 1-alpha/2 quantile of Beta(1, 10),
        // which is 1 - (alpha/2)^(1/10)
        let alpha = 0.01;
        let (lower, upper) = clopper_pearson(10, 0, alpha).unwrap();
        assert_eq!(lower, 0.0);
        let expected = 1.0 - (alpha / 2.0_f64).powf(0.1);
        assert!((upper - expected).abs() < 1e-10, "upper={upper} expected={expected}");
    }

    #[test]
    fn test_all_events_lower_bound() {
        // n=10, k=10: lower bound is the alpha/2 quantile of Beta(10, 1) = (alpha/2)^(1/10)
        let alpha = 0.05;
        let (lower, upper) = clopper_pearson(10, 10, alpha).unwrap();
        assert_eq!(upper, 1.0);
        assert!((lower - (alpha / 2.0_f64).powf(0.1)).abs() < 1e-10);
    }

    #[test]
    fn test_empty_bucket() {
        assert_eq!(clopper_pearson(0, 0, 0.01).unwrap(), (0.0, 1.0));
    }

    #[test]
    fn test_interval_contains_point_estimate() {
        for n in [1u64, 2, 5, 17, 100, 5_000] {
            for k in [0, 1, n / 3, n / 2, n - 1, n] {
                let (lower, upper) = clopper_pearson(n, k, 0.01).unwrap();
                #[allow(clippy::cast_precision_loss)]
                let p = k as f64 / n as f64;
                assert!(lower <= p && p <= upper, "n={n} k={k} [{lower}, {upper}] p={p}");
                assert!((0.0..=1.0).contains(&lower));
                assert!((0.0..=1.0).contains(&upper));
            }
        }
    }

    #[test]
    fn test_known_interval() {
        // 5 events in 100 trials at 95%: (0.0164, 0.1128)
        let (lower, upper) = clopper_pearson(100, 5, 0.05).unwrap();
        assert!((lower - 0.016_43).abs() < 2e-4, "lower={lower}");
        assert!((upper - 0.112_84).abs() < 2e-4, "upper={upper}");
    }

    #[test]
    fn test_tiny_error_rate_keeps_relative_precision() {
        // 1 event in 10 million trials
        let (lower, _) = clopper_pearson(10_000_000, 1, 0.01).unwrap();
        // lower = alpha/2 quantile of Beta(1, n) ~ -ln(1-alpha/2)/n
        let approx = -(1.0 - 0.005_f64).ln() / 1e7;
        assert!((lower - approx).abs() / approx < 1e-3, "lower={lower}");
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            clopper_pearson(10, 1, 0.0),
            Err(CalibrationError::InvalidAlpha(_))
        ));
        assert!(matches!(
            clopper_pearson(10, 1, 1.5),
            Err(CalibrationError::InvalidAlpha(_))
        ));
        assert!(matches!(
            clopper_pearson(10, 1, f64::NAN),
            Err(CalibrationError::InvalidAlpha(_))
        ));
        assert!(matches!(
            clopper_pearson(3, 4, 0.01),
            Err(CalibrationError::CountsOutOfRange { n: 3, k: 4 })
        ));
    }
}
