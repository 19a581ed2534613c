//! Probability-of-exceedance estimation over the percentile grid.
//!
//! For percentile `p`, member `m` and point `j`:
//!
//! ```text
//! z_p        = Φ⁻¹(p / 100)
//! POE[p,m,j] = 1 - Φ(z_p; μ = a1·y_anom[m,j]/√xv, σ = ebest/√xv)
//! POE[p,j]   = nanmean over m
//! ```

use boreas_stats::{nanmean, norm_ppf, norm_sf};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;

/// Standard-normal quantiles of a percentile grid given in percent.
pub(crate) fn percentile_quantiles(percentiles: &[f64]) -> Vec<f64> {
    percentiles.iter().map(|&p| norm_ppf(p / 100.0)).collect()
}

/// POE curve for a single point, one entry per quantile in `z`.
fn point_poe(members: ArrayView1<'_, f64>, a1: f64, ebest: f64, xv: f64, z: &[f64]) -> Vec<f64> {
    let sd = xv.sqrt();
    let sigma = ebest / sd;
    let mus: Vec<f64> = members.iter().map(|&y| a1 * y / sd).collect();

    let mut member_poe = vec![0.0; mus.len()];
    z.iter()
        .map(|&zp| {
            for (slot, &mu) in member_poe.iter_mut().zip(&mus) {
                *slot = norm_sf(zp, mu, sigma);
            }
            nanmean(&member_poe)
        })
        .collect()
}

/// Member-averaged POE field, percentile x point.
///
/// Points are processed in parallel; each point's arithmetic runs in a fixed
/// order so the result does not depend on scheduling.
pub(crate) fn exceedance(
    y_anom: &Array2<f64>,
    a1: &Array1<f64>,
    ebest: &Array1<f64>,
    xv: &Array1<f64>,
    percentiles: &[f64],
) -> Array2<f64> {
    let z = percentile_quantiles(percentiles);
    let n_points = y_anom.ncols();

    let columns: Vec<Vec<f64>> = (0..n_points)
        .into_par_iter()
        .map(|j| point_poe(y_anom.column(j), a1[j], ebest[j], xv[j], &z))
        .collect();

    Array2::from_shape_fn((z.len(), n_points), |(i, j)| columns[j][i])
}
