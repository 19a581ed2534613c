//! Physical bounds on the climatological variances and covariance.

use ndarray::{Array1, Zip};

/// Variance and covariance fields after bounding.
#[derive(Debug, Clone)]
pub(crate) struct Bounded {
    pub(crate) xv: Array1<f64>,
    pub(crate) yv: Array1<f64>,
    pub(crate) cov: Array1<f64>,
}

/// Raises `v` to `bound` when below it. NaN passes through.
pub(crate) fn floor_at(v: f64, bound: f64) -> f64 {
    if v < bound { bound } else { v }
}

/// Lowers `v` to `bound` when above it. NaN passes through.
pub(crate) fn cap_at(v: f64, bound: f64) -> f64 {
    if v > bound { bound } else { v }
}

/// Bounds `xv`, then `yv` and `cov` against the bounded `xv`:
///
/// 1. `xv >= xv_min`
/// 2. `yv_min_frac * xv <= yv <= xv`
/// 3. `0 <= cov <= xv`
///
/// Inputs are left untouched; fresh arrays are returned.
pub(crate) fn clamp_bounds(
    xv: &Array1<f64>,
    yv: &Array1<f64>,
    cov: &Array1<f64>,
    xv_min: f64,
    yv_min_frac: f64,
) -> Bounded {
    let xv = xv.mapv(|x| floor_at(x, xv_min));
    let yv = Zip::from(yv)
        .and(&xv)
        .map_collect(|&y, &x| cap_at(floor_at(y, yv_min_frac * x), x));
    let cov = Zip::from(cov)
        .and(&xv)
        .map_collect(|&c, &x| cap_at(floor_at(c, 0.0), x));

    Bounded { xv, yv, cov }
}
