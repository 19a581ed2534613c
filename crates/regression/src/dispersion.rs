//! Ensemble-size correction and over-dispersion correction of member anomalies.

use boreas_stats::nanmean;
use ndarray::{Array1, Array2, ArrayView2, Zip};

use crate::clamp::{Bounded, cap_at, floor_at};

/// Member counts entering the dispersion formulas.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemberCounts {
    /// Members used when estimating the statistics.
    pub(crate) stats: f64,
    /// Members in the live forecast.
    pub(crate) fcst: f64,
}

/// Options for [`correct_dispersion`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct DispersionOptions {
    pub(crate) ens_size_correction: bool,
    pub(crate) reclamp_corrected_yv: bool,
    pub(crate) yv_min_frac: f64,
}

/// Output of the dispersion stage.
#[derive(Debug, Clone)]
pub(crate) struct Dispersion {
    /// Correlation of observation and ensemble mean.
    pub(crate) rxy: Array1<f64>,
    /// Spread error variance, size-corrected if requested.
    pub(crate) es: Array1<f64>,
    /// Ensemble-mean variance, size-corrected if requested.
    pub(crate) yv: Array1<f64>,
    /// Correlation of observation and best member.
    pub(crate) rbest: Array1<f64>,
    /// Dispersion factor in (0, 1].
    pub(crate) k: Array1<f64>,
    /// Member anomalies after contraction, member x point.
    pub(crate) y_anom: Array2<f64>,
    /// NaN-ignoring ensemble mean anomaly per point.
    pub(crate) y_anom_mean: Array1<f64>,
}

/// Rescales `es` and `yv` for a live ensemble of a different size than the
/// one behind the statistics, and adjusts `rxy` for the new `yv`.
fn ens_size_correct(
    rxy: &mut Array1<f64>,
    es: &mut Array1<f64>,
    yv: &mut Array1<f64>,
    xv: &Array1<f64>,
    counts: MemberCounts,
    opts: DispersionOptions,
) {
    let (ns, nf) = (counts.stats, counts.fcst);

    es.mapv_inplace(|e| e * (ns / nf) * (nf - 1.0) / (ns - 1.0));

    let yv_uncorrected = yv.clone();
    yv.mapv_inplace(|y| y - (nf - ns));
    if opts.reclamp_corrected_yv {
        Zip::from(&mut *yv)
            .and(xv)
            .for_each(|y, &x| *y = cap_at(floor_at(*y, opts.yv_min_frac * x), x));
    }

    Zip::from(rxy)
        .and(&*yv)
        .and(&yv_uncorrected)
        .for_each(|r, &y, &y0| *r *= (y / y0).sqrt());
}

/// Dispersion factor for one point.
///
/// Invalid arithmetic (zero spread, zero correlation) yields inf or NaN
/// rather than failing. The factor never inflates the ensemble, and is
/// forced to 1 unless `rbest > 1`.
fn dispersion_factor(yv: f64, es: f64, rxy: f64, rbest: f64, nf: f64) -> f64 {
    let k = (yv / es * (nf - 1.0) / nf * (1.0 / (rxy * rxy) - 1.0)).sqrt();
    let k = if k > 1.0 { 1.0 } else { k };
    if rbest > 1.0 { k } else { 1.0 }
}

/// Runs the dispersion stage on bounded statistics.
///
/// `raw_fcst` is member x point; `ym` and `es` are per point.
pub(crate) fn correct_dispersion(
    raw_fcst: ArrayView2<'_, f64>,
    ym: &Array1<f64>,
    es: &Array1<f64>,
    bounded: &Bounded,
    counts: MemberCounts,
    opts: DispersionOptions,
) -> Dispersion {
    let mut rxy = Zip::from(&bounded.cov)
        .and(&bounded.xv)
        .and(&bounded.yv)
        .map_collect(|&c, &x, &y| c / (x * y).sqrt());
    let mut es = es.clone();
    let mut yv = bounded.yv.clone();

    if opts.ens_size_correction {
        ens_size_correct(&mut rxy, &mut es, &mut yv, &bounded.xv, counts, opts);
    }

    let rbest = Zip::from(&rxy)
        .and(&es)
        .and(&yv)
        .map_collect(|&r, &e, &y| r * (1.0 + e / y).sqrt());

    let mut y_anom = raw_fcst.to_owned();
    for mut member in y_anom.rows_mut() {
        member -= ym;
    }
    let y_anom_mean = Array1::from_iter(
        y_anom
            .columns()
            .into_iter()
            .map(|point| nanmean(&point.to_vec())),
    );

    let k = Zip::from(&yv)
        .and(&es)
        .and(&rxy)
        .and(&rbest)
        .map_collect(|&y, &e, &r, &rb| dispersion_factor(y, e, r, rb, counts.fcst));

    for mut member in y_anom.rows_mut() {
        Zip::from(&mut member)
            .and(&y_anom_mean)
            .and(&k)
            .for_each(|a, &mean, &kk| *a = mean + kk * (*a - mean));
    }

    Dispersion {
        rxy,
        es,
        yv,
        rbest,
        k,
        y_anom,
        y_anom_mean,
    }
}
