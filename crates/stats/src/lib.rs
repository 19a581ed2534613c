//! Statistical helper functions for the Boreas calibration workspace.
//!
//! Everything here is NaN-tolerant in the numpy sense: invalid arithmetic
//! yields NaN instead of panicking, and reductions skip NaN entries.

use std::f64::consts::SQRT_2;

use statrs::function::erf::{erf, erfc_inv};

/// Arithmetic mean of the non-NaN values in `data`.
///
/// Returns NaN when `data` is empty or contains only NaN, matching
/// `numpy.nanmean`. Infinite values are not skipped.
pub fn nanmean(data: &[f64]) -> f64 {
    let (sum, count) = data
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_usize), |(s, n), &v| (s + v, n + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Number of NaN entries in `data`.
///
/// Accepts anything that iterates over `&f64`: slices, `Vec`s, or
/// `ndarray` arrays by reference.
pub fn count_nan<'a>(data: impl IntoIterator<Item = &'a f64>) -> usize {
    data.into_iter().filter(|v| v.is_nan()).count()
}

/// Normal CDF with mean `mu` and standard deviation `sigma`, via the
/// error-function identity `0.5 * (1 + erf(((x - mu) / sigma) / sqrt(2)))`.
///
/// `sigma == 0` gives a step (or NaN when `x == mu`); NaN inputs give NaN.
pub fn norm_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Normal survival function, `1 - norm_cdf(x, mu, sigma)`.
pub fn norm_sf(x: f64, mu: f64, sigma: f64) -> f64 {
    1.0 - norm_cdf(x, mu, sigma)
}

/// Standard-normal quantile function (inverse CDF).
///
/// `p` outside `[0, 1]` returns NaN; `p == 0` and `p == 1` return the
/// corresponding infinities.
pub fn norm_ppf(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}
