//! Best-member regression coefficients and errors.

use ndarray::{Array1, Zip};

use crate::dispersion::Dispersion;

/// Regression terms per spatial point.
#[derive(Debug, Clone)]
pub(crate) struct Regression {
    /// Correlation after the climatology fallback.
    pub(crate) rxy: Array1<f64>,
    /// Slope mapping forecast anomalies to observation space.
    pub(crate) a1: Array1<f64>,
    /// Best-member regression standard error.
    pub(crate) ebest: Array1<f64>,
    /// Ensemble-mean regression standard error.
    pub(crate) emean: Array1<f64>,
}

/// Computes the regression terms from the dispersion stage.
///
/// Correlations below `rxy_min` are zeroed, so those points revert to
/// climatology (`a1 = 0`). A zero `ebest` is replaced by `ebest_floor`.
pub(crate) fn regress(
    disp: &Dispersion,
    xv: &Array1<f64>,
    num_years: f64,
    rxy_min: f64,
    ebest_floor: f64,
) -> Regression {
    let rxy = disp.rxy.mapv(|r| if r < rxy_min { 0.0 } else { r });
    let inflation = num_years / (num_years - 2.0);

    let a1 = Zip::from(&rxy)
        .and(xv)
        .and(&disp.yv)
        .map_collect(|&r, &x, &y| r * (x / y).sqrt());

    let ebest = Zip::from(&rxy)
        .and(xv)
        .and(&disp.yv)
        .and(&disp.es)
        .and(&disp.k)
        .map_collect(|&r, &x, &y, &e, &k| {
            let eb = (inflation * x * (1.0 - r * r * (1.0 + k * k * e / y))).sqrt();
            if eb == 0.0 { ebest_floor } else { eb }
        });

    let emean = Zip::from(&rxy)
        .and(xv)
        .map_collect(|&r, &x| (inflation * x * (1.0 - r * r)).sqrt());

    Regression {
        rxy,
        a1,
        ebest,
        emean,
    }
}
