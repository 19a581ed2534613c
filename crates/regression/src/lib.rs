//! Ensemble Regression (ER) calibration of ensemble forecasts.
//!
//! Turns raw ensemble member values into a calibrated probability of
//! exceedance (POE) for each percentile of the observed climatology, using
//! precomputed statistics relating the ensemble mean to observations.
//!
//! # Pipeline
//!
//! 1. **Validate** the statistics bundle (all nine statistics, matching shapes)
//! 2. **Bound** `xv`, `yv` and `cov` to physically sane ranges
//! 3. **Correct dispersion**: optional ensemble-size correction, correlations,
//!    dispersion factor `k`, contraction of member anomalies toward their mean
//! 4. **Regress**: climatology fallback, slope `a1`, errors `ebest`/`emean`
//! 5. **Estimate exceedance**: normal survival per percentile and member,
//!    averaged over members
//!
//! Invalid arithmetic yields NaN in the affected cells only; it never fails
//! the run.
//!
//! # Glossary
//!
//! - **x / y**: observation / ensemble-mean forecast
//! - **cov, xv, yv**: covariance and variances of x and y
//! - **es**: spread error variance of the members about their mean
//! - **rxy / rbest**: correlation of x with the ensemble mean / best member
//! - **k**: dispersion factor (1 = no contraction)
//!
//! # Quick Start
//!
//! ```no_run
//! use boreas_regression::{ErConfig, StatisticsBundle, calibrate};
//! use ndarray::Array2;
//!
//! // 20 members at 3 points.
//! let raw = Array2::from_shape_fn((20, 3), |(m, _)| m as f64 / 10.0 - 1.0);
//! let stats = StatisticsBundle::new()
//!     .with_cov(vec![0.5, 0.3, 0.02])
//!     .with_es(2.0)
//!     .with_xm(0.0)
//!     .with_xv(1.0)
//!     .with_ym(0.0)
//!     .with_yv(1.0)
//!     .with_num_stats_members(20)
//!     .with_num_fcst_members(20)
//!     .with_num_years(30);
//!
//! let result = calibrate(raw.view(), &stats, &ErConfig::new()).unwrap();
//! assert_eq!(result.poe().dim(), (19, 3));
//! ```

mod bundle;
mod clamp;
mod config;
mod dispersion;
mod error;
mod exceedance;
mod regression;
mod result;
mod validate;

pub use bundle::{REQUIRED_STATS, StatValue, StatisticsBundle};
pub use config::{DEFAULT_PERCENTILES, ErConfig, RegressionMethod};
pub use error::{CalibrationError, StatsError};
pub use result::{CalibrationResult, Diagnostics};
pub use validate::validate_stats;

use boreas_stats::count_nan;
use ndarray::ArrayView2;
use tracing::{debug, warn};

use crate::dispersion::{DispersionOptions, MemberCounts};

/// Calibrates a raw ensemble into a POE field.
///
/// # Arguments
///
/// * `raw_fcst` — Member x point forecast values. NaN marks a missing value.
/// * `stats` — Climatological statistics, scalar or one value per point.
/// * `config` — Calibration options, including the percentile grid and
///   whether to apply the ensemble-size correction.
///
/// # Errors
///
/// Returns [`CalibrationError::Stats`] if a statistic is missing or has the
/// wrong number of points, [`CalibrationError::InvalidConfig`] for an
/// invalid configuration, and [`CalibrationError::EmptyForecast`] if the
/// forecast has no members or no points.
#[tracing::instrument(skip_all, fields(members = raw_fcst.nrows(), points = raw_fcst.ncols()))]
pub fn calibrate(
    raw_fcst: ArrayView2<'_, f64>,
    stats: &StatisticsBundle,
    config: &ErConfig,
) -> Result<CalibrationResult, CalibrationError> {
    // Presence only; shapes need the point count and are checked in
    // `resolve_stats`. A missing statistic is reported ahead of config errors.
    validate_stats(stats)?;
    config.validate()?;

    let (n_members, n_points) = raw_fcst.dim();
    if n_members == 0 || n_points == 0 {
        return Err(CalibrationError::EmptyForecast {
            members: n_members,
            points: n_points,
        });
    }

    let resolved = validate::resolve_stats(stats, n_points)?;
    if n_members as f64 != resolved.num_fcst_members {
        warn!(
            members = n_members,
            num_fcst_members = resolved.num_fcst_members,
            "forecast member count differs from num_fcst_members"
        );
    }

    // --- Step 1: Bounds ---
    let bounded = clamp::clamp_bounds(
        &resolved.xv,
        &resolved.yv,
        &resolved.cov,
        config.xv_min(),
        config.yv_min_frac(),
    );
    debug!(stage = "bounds", method = ?config.method(), "applied");

    // --- Step 2: Dispersion ---
    let disp = dispersion::correct_dispersion(
        raw_fcst,
        &resolved.ym,
        &resolved.es,
        &bounded,
        MemberCounts {
            stats: resolved.num_stats_members,
            fcst: resolved.num_fcst_members,
        },
        DispersionOptions {
            ens_size_correction: config.ens_size_correction(),
            reclamp_corrected_yv: config.reclamp_corrected_yv(),
            yv_min_frac: config.yv_min_frac(),
        },
    );
    debug!(
        stage = "dispersion",
        ens_size_correction = config.ens_size_correction(),
        contracted_points = disp.k.iter().filter(|&&k| k < 1.0).count(),
        "applied"
    );

    // --- Step 3: Regression ---
    let reg = regression::regress(
        &disp,
        &bounded.xv,
        resolved.num_years,
        config.rxy_min(),
        config.ebest_floor(),
    );
    debug!(
        stage = "regression",
        climatology_points = reg.rxy.iter().filter(|&&r| r == 0.0).count(),
        undefined_points = count_nan(&reg.ebest),
        "applied"
    );

    // --- Step 4: Exceedance ---
    let poe = exceedance::exceedance(
        &disp.y_anom,
        &reg.a1,
        &reg.ebest,
        &bounded.xv,
        config.percentiles(),
    );
    debug!(
        stage = "exceedance",
        percentiles = config.percentiles().len(),
        undefined_cells = count_nan(&poe),
        "applied"
    );

    let diagnostics = result::Diagnostics::from_stages(disp, reg);

    Ok(CalibrationResult::new(
        poe,
        config.percentiles().to_vec(),
        diagnostics,
    ))
}
