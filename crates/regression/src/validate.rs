//! Completeness and shape checks for the statistics bundle.

use ndarray::Array1;

use crate::bundle::{REQUIRED_STATS, StatValue, StatisticsBundle};
use crate::error::StatsError;

/// Statistics expanded to one value per spatial point.
///
/// Member counts and record length are carried as `f64` since they only
/// enter floating-point formulas.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedStats {
    pub(crate) cov: Array1<f64>,
    pub(crate) es: Array1<f64>,
    pub(crate) xv: Array1<f64>,
    pub(crate) ym: Array1<f64>,
    pub(crate) yv: Array1<f64>,
    pub(crate) num_stats_members: f64,
    pub(crate) num_fcst_members: f64,
    pub(crate) num_years: f64,
}

fn missing(stat: &str) -> StatsError {
    StatsError::MissingStat {
        stat: stat.to_string(),
        required: REQUIRED_STATS.iter().map(|s| s.to_string()).collect(),
    }
}

fn require<'a>(value: Option<&'a StatValue>, stat: &str) -> Result<&'a StatValue, StatsError> {
    value.ok_or_else(|| missing(stat))
}

fn require_count(value: Option<u32>, stat: &str) -> Result<f64, StatsError> {
    value.map(f64::from).ok_or_else(|| missing(stat))
}

/// Checks that every statistic in [`REQUIRED_STATS`] is present.
///
/// # Errors
///
/// Returns [`StatsError::MissingStat`] naming the first absent statistic.
pub fn validate_stats(stats: &StatisticsBundle) -> Result<(), StatsError> {
    match REQUIRED_STATS.iter().find(|s| !stats.contains(s)) {
        Some(stat) => Err(missing(stat)),
        None => Ok(()),
    }
}

/// Broadcasts every field of `stats` to `n_points`.
///
/// Every statistic is looked up, in [`REQUIRED_STATS`] order, before any
/// shape is checked, so a missing statistic wins over a shape mismatch.
/// `xm` is checked for shape but not kept; the regression works on anomalies.
pub(crate) fn resolve_stats(
    stats: &StatisticsBundle,
    n_points: usize,
) -> Result<ResolvedStats, StatsError> {
    let cov = require(stats.cov(), "cov")?;
    let es = require(stats.es(), "es")?;
    let xm = require(stats.xm(), "xm")?;
    let xv = require(stats.xv(), "xv")?;
    let ym = require(stats.ym(), "ym")?;
    let yv = require(stats.yv(), "yv")?;
    let num_stats_members = require_count(stats.num_stats_members(), "num_stats_members")?;
    let num_fcst_members = require_count(stats.num_fcst_members(), "num_fcst_members")?;
    let num_years = require_count(stats.num_years(), "num_years")?;

    let cov = cov.broadcast("cov", n_points)?;
    let es = es.broadcast("es", n_points)?;
    xm.broadcast("xm", n_points)?;

    Ok(ResolvedStats {
        cov,
        es,
        xv: xv.broadcast("xv", n_points)?,
        ym: ym.broadcast("ym", n_points)?,
        yv: yv.broadcast("yv", n_points)?,
        num_stats_members,
        num_fcst_members,
        num_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_bundle() -> StatisticsBundle {
        StatisticsBundle::new()
            .with_cov(vec![0.5, 0.2, 0.1])
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(1.0)
            .with_ym(vec![0.0, 1.0, 2.0])
            .with_yv(1.0)
            .with_num_stats_members(20)
            .with_num_fcst_members(20)
            .with_num_years(30)
    }

    #[test]
    fn complete_bundle_passes() {
        assert!(validate_stats(&full_bundle()).is_ok());
    }

    #[test]
    fn missing_cov_is_reported_with_full_list() {
        let stats = StatisticsBundle::new()
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(1.0)
            .with_ym(0.0)
            .with_yv(1.0)
            .with_num_stats_members(20)
            .with_num_fcst_members(20)
            .with_num_years(30);
        match validate_stats(&stats) {
            Err(StatsError::MissingStat { stat, required }) => {
                assert_eq!(stat, "cov");
                assert_eq!(required.len(), 9);
                for name in REQUIRED_STATS {
                    assert!(required.iter().any(|r| r == name), "{name} not listed");
                }
            }
            other => panic!("expected MissingStat, got {other:?}"),
        }
    }

    #[test]
    fn first_missing_stat_is_reported() {
        // Both yv and num_years absent: yv comes first in check order.
        let stats = StatisticsBundle::new()
            .with_cov(0.5)
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(1.0)
            .with_ym(0.0)
            .with_num_stats_members(20)
            .with_num_fcst_members(20);
        let err = validate_stats(&stats).unwrap_err();
        assert!(matches!(err, StatsError::MissingStat { ref stat, .. } if stat == "yv"));
    }

    #[test]
    fn missing_scalar_count_is_reported() {
        let stats = StatisticsBundle::new()
            .with_cov(0.5)
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(1.0)
            .with_ym(0.0)
            .with_yv(1.0)
            .with_num_stats_members(20)
            .with_num_years(30);
        let err = validate_stats(&stats).unwrap_err();
        assert!(err.to_string().contains("num_fcst_members"));
    }

    #[test]
    fn resolve_broadcasts_scalars() {
        let r = resolve_stats(&full_bundle(), 3).unwrap();
        assert_eq!(r.es.to_vec(), vec![2.0, 2.0, 2.0]);
        assert_eq!(r.ym.to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(r.cov.to_vec(), vec![0.5, 0.2, 0.1]);
        assert_eq!(r.num_stats_members, 20.0);
        assert_eq!(r.num_fcst_members, 20.0);
        assert_eq!(r.num_years, 30.0);
    }

    #[test]
    fn resolve_rejects_wrong_point_count() {
        let err = resolve_stats(&full_bundle(), 4).unwrap_err();
        assert!(matches!(err, StatsError::ShapeMismatch { ref stat, expected: 4, got: 3 } if stat == "cov"));
    }

    #[test]
    fn resolve_checks_xm_shape() {
        let stats = full_bundle().with_xm(vec![0.0, 0.0]);
        let err = resolve_stats(&stats, 3).unwrap_err();
        assert!(matches!(err, StatsError::ShapeMismatch { ref stat, .. } if stat == "xm"));
    }

    #[test]
    fn resolve_reports_trailing_missing_count_before_shape() {
        // xv has the wrong length, but num_years is absent.
        let stats = StatisticsBundle::new()
            .with_cov(0.5)
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(vec![1.0, 1.0])
            .with_ym(0.0)
            .with_yv(1.0)
            .with_num_stats_members(20)
            .with_num_fcst_members(20);
        let err = resolve_stats(&stats, 3).unwrap_err();
        assert!(matches!(err, StatsError::MissingStat { ref stat, .. } if stat == "num_years"));
        assert_eq!(err, validate_stats(&stats).unwrap_err());
    }

    #[test]
    fn resolve_reports_missing_before_shape() {
        let stats = StatisticsBundle::new().with_cov(vec![1.0, 2.0]);
        let err = resolve_stats(&stats, 5).unwrap_err();
        assert!(matches!(err, StatsError::MissingStat { ref stat, .. } if stat == "es"));
    }
}
