//! Climatological statistics bundle consumed by the calibration.

use ndarray::Array1;
use serde::Deserialize;

use crate::error::StatsError;

/// Names of the statistics a bundle must carry, in validation order.
pub const REQUIRED_STATS: [&str; 9] = [
    "cov",
    "es",
    "xm",
    "xv",
    "ym",
    "yv",
    "num_stats_members",
    "num_fcst_members",
    "num_years",
];

/// A climatological statistic: one value for every point, or one per point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    /// Single value broadcast to every spatial point.
    Scalar(f64),
    /// One value per spatial point.
    Field(Vec<f64>),
}

impl StatValue {
    /// Expands the value to `n_points` entries.
    ///
    /// A one-element field broadcasts like a scalar.
    pub(crate) fn broadcast(&self, stat: &str, n_points: usize) -> Result<Array1<f64>, StatsError> {
        match self {
            StatValue::Scalar(v) => Ok(Array1::from_elem(n_points, *v)),
            StatValue::Field(values) => match values.len() {
                0 => Err(StatsError::EmptyField {
                    stat: stat.to_string(),
                }),
                1 => Ok(Array1::from_elem(n_points, values[0])),
                len if len == n_points => Ok(Array1::from(values.clone())),
                len => Err(StatsError::ShapeMismatch {
                    stat: stat.to_string(),
                    expected: n_points,
                    got: len,
                }),
            },
        }
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Scalar(v)
    }
}

impl From<Vec<f64>> for StatValue {
    fn from(v: Vec<f64>) -> Self {
        StatValue::Field(v)
    }
}

impl From<&[f64]> for StatValue {
    fn from(v: &[f64]) -> Self {
        StatValue::Field(v.to_vec())
    }
}

impl From<Array1<f64>> for StatValue {
    fn from(v: Array1<f64>) -> Self {
        StatValue::Field(v.to_vec())
    }
}

/// Long-term statistics relating the observed quantity (`x`) to the
/// forecast ensemble mean (`y`).
///
/// Every statistic is optional at construction time so that an incomplete
/// bundle can be reported precisely; [`calibrate`](crate::calibrate) rejects
/// bundles missing any of [`REQUIRED_STATS`].
///
/// # Example
///
/// ```
/// use boreas_regression::StatisticsBundle;
///
/// let stats = StatisticsBundle::new()
///     .with_cov(vec![0.5, 0.4])
///     .with_es(2.0)
///     .with_xm(0.0)
///     .with_xv(1.0)
///     .with_ym(0.0)
///     .with_yv(1.0)
///     .with_num_stats_members(20)
///     .with_num_fcst_members(20)
///     .with_num_years(30);
///
/// assert!(stats.is_complete());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatisticsBundle {
    /// Covariance between observation and ensemble-mean forecast.
    cov: Option<StatValue>,
    /// Ensemble spread error variance.
    es: Option<StatValue>,
    /// Observation climatological mean.
    xm: Option<StatValue>,
    /// Observation climatological variance.
    xv: Option<StatValue>,
    /// Ensemble-mean forecast climatological mean.
    ym: Option<StatValue>,
    /// Ensemble-mean forecast climatological variance.
    yv: Option<StatValue>,
    /// Member count used when the statistics were estimated.
    num_stats_members: Option<u32>,
    /// Member count of the live forecast.
    num_fcst_members: Option<u32>,
    /// Length of the climatological record in years.
    num_years: Option<u32>,
}

impl StatisticsBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Builder methods ---

    /// Sets the observation / ensemble-mean covariance.
    pub fn with_cov(mut self, v: impl Into<StatValue>) -> Self {
        self.cov = Some(v.into());
        self
    }

    /// Sets the ensemble spread error variance.
    pub fn with_es(mut self, v: impl Into<StatValue>) -> Self {
        self.es = Some(v.into());
        self
    }

    /// Sets the observation climatological mean.
    pub fn with_xm(mut self, v: impl Into<StatValue>) -> Self {
        self.xm = Some(v.into());
        self
    }

    /// Sets the observation climatological variance.
    pub fn with_xv(mut self, v: impl Into<StatValue>) -> Self {
        self.xv = Some(v.into());
        self
    }

    /// Sets the ensemble-mean climatological mean.
    pub fn with_ym(mut self, v: impl Into<StatValue>) -> Self {
        self.ym = Some(v.into());
        self
    }

    /// Sets the ensemble-mean climatological variance.
    pub fn with_yv(mut self, v: impl Into<StatValue>) -> Self {
        self.yv = Some(v.into());
        self
    }

    /// Sets the member count behind the statistics.
    pub fn with_num_stats_members(mut self, n: u32) -> Self {
        self.num_stats_members = Some(n);
        self
    }

    /// Sets the member count of the live forecast.
    pub fn with_num_fcst_members(mut self, n: u32) -> Self {
        self.num_fcst_members = Some(n);
        self
    }

    /// Sets the length of the climatological record in years.
    pub fn with_num_years(mut self, n: u32) -> Self {
        self.num_years = Some(n);
        self
    }

    // --- Accessors ---

    /// Returns the covariance, if set.
    pub fn cov(&self) -> Option<&StatValue> {
        self.cov.as_ref()
    }

    /// Returns the spread error variance, if set.
    pub fn es(&self) -> Option<&StatValue> {
        self.es.as_ref()
    }

    /// Returns the observation mean, if set.
    pub fn xm(&self) -> Option<&StatValue> {
        self.xm.as_ref()
    }

    /// Returns the observation variance, if set.
    pub fn xv(&self) -> Option<&StatValue> {
        self.xv.as_ref()
    }

    /// Returns the ensemble-mean mean, if set.
    pub fn ym(&self) -> Option<&StatValue> {
        self.ym.as_ref()
    }

    /// Returns the ensemble-mean variance, if set.
    pub fn yv(&self) -> Option<&StatValue> {
        self.yv.as_ref()
    }

    /// Returns the member count behind the statistics, if set.
    pub fn num_stats_members(&self) -> Option<u32> {
        self.num_stats_members
    }

    /// Returns the live forecast member count, if set.
    pub fn num_fcst_members(&self) -> Option<u32> {
        self.num_fcst_members
    }

    /// Returns the record length in years, if set.
    pub fn num_years(&self) -> Option<u32> {
        self.num_years
    }

    /// Returns `true` if the named statistic is present.
    ///
    /// Unknown names return `false`.
    pub fn contains(&self, stat: &str) -> bool {
        match stat {
            "cov" => self.cov.is_some(),
            "es" => self.es.is_some(),
            "xm" => self.xm.is_some(),
            "xv" => self.xv.is_some(),
            "ym" => self.ym.is_some(),
            "yv" => self.yv.is_some(),
            "num_stats_members" => self.num_stats_members.is_some(),
            "num_fcst_members" => self.num_fcst_members.is_some(),
            "num_years" => self.num_years.is_some(),
            _ => false,
        }
    }

    /// Returns `true` if every statistic in [`REQUIRED_STATS`] is present.
    pub fn is_complete(&self) -> bool {
        REQUIRED_STATS.iter().all(|s| self.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_bundle() -> StatisticsBundle {
        StatisticsBundle::new()
            .with_cov(0.5)
            .with_es(2.0)
            .with_xm(0.0)
            .with_xv(1.0)
            .with_ym(0.0)
            .with_yv(1.0)
            .with_num_stats_members(20)
            .with_num_fcst_members(20)
            .with_num_years(30)
    }

    #[test]
    fn empty_bundle_contains_nothing() {
        let b = StatisticsBundle::new();
        for stat in REQUIRED_STATS {
            assert!(!b.contains(stat), "{stat} should be absent");
        }
        assert!(!b.is_complete());
    }

    #[test]
    fn full_bundle_is_complete() {
        let b = full_bundle();
        assert!(b.is_complete());
        assert_eq!(b.cov(), Some(&StatValue::Scalar(0.5)));
        assert_eq!(b.num_years(), Some(30));
    }

    #[test]
    fn contains_unknown_name() {
        assert!(!full_bundle().contains("rxy"));
    }

    #[test]
    fn broadcast_scalar() {
        let v = StatValue::Scalar(2.5).broadcast("es", 3).unwrap();
        assert_eq!(v.to_vec(), vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn broadcast_single_value_field() {
        let v = StatValue::Field(vec![4.0]).broadcast("xv", 2).unwrap();
        assert_eq!(v.to_vec(), vec![4.0, 4.0]);
    }

    #[test]
    fn broadcast_full_field() {
        let v = StatValue::from(vec![1.0, 2.0, 3.0])
            .broadcast("yv", 3)
            .unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn broadcast_shape_mismatch() {
        let err = StatValue::from(vec![1.0, 2.0])
            .broadcast("cov", 5)
            .unwrap_err();
        assert_eq!(
            err,
            StatsError::ShapeMismatch {
                stat: "cov".to_string(),
                expected: 5,
                got: 2,
            }
        );
    }

    #[test]
    fn broadcast_empty_field() {
        let err = StatValue::Field(vec![]).broadcast("ym", 5).unwrap_err();
        assert!(matches!(err, StatsError::EmptyField { .. }));
    }

    #[test]
    fn from_array() {
        let v = StatValue::from(Array1::from(vec![0.1, 0.2]));
        assert_eq!(v, StatValue::Field(vec![0.1, 0.2]));
    }

    #[test]
    fn deserialize_json_mixes_scalars_and_fields() {
        let b: StatisticsBundle = serde_json::from_str(
            r#"{
                "cov": [0.5, 0.3], "es": 2.0, "xm": 0.0, "xv": [1.0, 2.0],
                "ym": 0.0, "yv": 1.0,
                "num_stats_members": 10, "num_fcst_members": 20, "num_years": 30
            }"#,
        )
        .unwrap();
        assert!(b.is_complete());
        assert_eq!(b.cov(), Some(&StatValue::Field(vec![0.5, 0.3])));
        assert_eq!(b.es(), Some(&StatValue::Scalar(2.0)));
        assert_eq!(b.num_fcst_members(), Some(20));
    }

    #[test]
    fn deserialize_json_missing_key_is_none() {
        let b: StatisticsBundle = serde_json::from_str(r#"{"es": 2.0}"#).unwrap();
        assert!(!b.contains("cov"));
        assert!(b.contains("es"));
    }

    #[test]
    fn deserialize_json_rejects_unknown_key() {
        let result: Result<StatisticsBundle, _> = serde_json::from_str(r#"{"rxy": 0.5}"#);
        assert!(result.is_err());
    }
}
