//! Configuration for Ensemble Regression calibration.

use serde::Deserialize;

use crate::error::CalibrationError;

/// Percentile grid used when none is configured.
pub const DEFAULT_PERCENTILES: [f64; 19] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 25.0, 33.0, 40.0, 50.0, 60.0, 67.0, 75.0, 80.0, 85.0, 90.0,
    95.0, 98.0, 99.0,
];

/// Regression flavour applied to the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionMethod {
    /// Best-member regression over the full ensemble.
    #[default]
    Ensemble,
}

/// Configuration for [`calibrate`](crate::calibrate).
///
/// Use the builder methods to customise parameters. The struct also
/// deserialises from TOML/JSON with every field optional.
///
/// # Example
///
/// ```
/// use boreas_regression::ErConfig;
///
/// let config = ErConfig::new()
///     .with_ens_size_correction(true)
///     .with_percentiles(vec![10.0, 50.0, 90.0]);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErConfig {
    #[serde(default)]
    method: RegressionMethod,
    #[serde(default)]
    ens_size_correction: bool,
    #[serde(default = "default_percentiles")]
    percentiles: Vec<f64>,
    #[serde(default = "default_xv_min")]
    xv_min: f64,
    #[serde(default = "default_yv_min_frac")]
    yv_min_frac: f64,
    #[serde(default = "default_rxy_min")]
    rxy_min: f64,
    #[serde(default = "default_ebest_floor")]
    ebest_floor: f64,
    #[serde(default)]
    reclamp_corrected_yv: bool,
}

fn default_percentiles() -> Vec<f64> {
    DEFAULT_PERCENTILES.to_vec()
}
fn default_xv_min() -> f64 {
    0.1
}
fn default_yv_min_frac() -> f64 {
    0.1
}
fn default_rxy_min() -> f64 {
    0.05
}
fn default_ebest_floor() -> f64 {
    1e-5
}

impl ErConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `method = Ensemble`, `ens_size_correction = false`,
    /// `percentiles = DEFAULT_PERCENTILES`, `xv_min = 0.1`,
    /// `yv_min_frac = 0.1`, `rxy_min = 0.05`, `ebest_floor = 1e-5`,
    /// `reclamp_corrected_yv = false`.
    pub fn new() -> Self {
        Self {
            method: RegressionMethod::Ensemble,
            ens_size_correction: false,
            percentiles: default_percentiles(),
            xv_min: default_xv_min(),
            yv_min_frac: default_yv_min_frac(),
            rxy_min: default_rxy_min(),
            ebest_floor: default_ebest_floor(),
            reclamp_corrected_yv: false,
        }
    }

    // --- Builder methods ---

    /// Sets the regression method.
    pub fn with_method(mut self, method: RegressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Enables or disables the ensemble-size correction of `es`, `yv` and `rxy`.
    pub fn with_ens_size_correction(mut self, b: bool) -> Self {
        self.ens_size_correction = b;
        self
    }

    /// Sets the percentile grid (values in the open interval (0, 100), ascending).
    pub fn with_percentiles(mut self, percentiles: Vec<f64>) -> Self {
        self.percentiles = percentiles;
        self
    }

    /// Sets the floor applied to the observed variance `xv`.
    pub fn with_xv_min(mut self, v: f64) -> Self {
        self.xv_min = v;
        self
    }

    /// Sets the floor of `yv` as a fraction of `xv`.
    pub fn with_yv_min_frac(mut self, v: f64) -> Self {
        self.yv_min_frac = v;
        self
    }

    /// Sets the correlation below which the forecast falls back to climatology.
    pub fn with_rxy_min(mut self, v: f64) -> Self {
        self.rxy_min = v;
        self
    }

    /// Sets the value substituted for a zero best-member error.
    pub fn with_ebest_floor(mut self, v: f64) -> Self {
        self.ebest_floor = v;
        self
    }

    /// Re-clamps `yv` to `[yv_min_frac * xv, xv]` after the ensemble-size correction.
    pub fn with_reclamp_corrected_yv(mut self, b: bool) -> Self {
        self.reclamp_corrected_yv = b;
        self
    }

    // --- Accessors ---

    /// Returns the regression method.
    pub fn method(&self) -> RegressionMethod {
        self.method
    }

    /// Returns whether the ensemble-size correction is applied.
    pub fn ens_size_correction(&self) -> bool {
        self.ens_size_correction
    }

    /// Returns the percentile grid.
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    /// Returns the floor applied to `xv`.
    pub fn xv_min(&self) -> f64 {
        self.xv_min
    }

    /// Returns the floor of `yv` as a fraction of `xv`.
    pub fn yv_min_frac(&self) -> f64 {
        self.yv_min_frac
    }

    /// Returns the climatology fallback correlation threshold.
    pub fn rxy_min(&self) -> f64 {
        self.rxy_min
    }

    /// Returns the floor substituted for a zero `ebest`.
    pub fn ebest_floor(&self) -> f64 {
        self.ebest_floor
    }

    /// Returns whether `yv` is re-clamped after the ensemble-size correction.
    pub fn reclamp_corrected_yv(&self) -> bool {
        self.reclamp_corrected_yv
    }

    /// Validates this configuration.
    ///
    /// Checks that `xv_min` and `ebest_floor` are finite and positive,
    /// `yv_min_frac` is in (0, 1], `rxy_min` is finite, and the percentile
    /// grid is non-empty, strictly ascending and inside (0, 100).
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.xv_min.is_finite() || self.xv_min <= 0.0 {
            return Err(CalibrationError::InvalidConfig {
                reason: format!("xv_min must be finite and > 0, got {}", self.xv_min),
            });
        }

        if !self.yv_min_frac.is_finite() || self.yv_min_frac <= 0.0 || self.yv_min_frac > 1.0 {
            return Err(CalibrationError::InvalidConfig {
                reason: format!("yv_min_frac must be in (0, 1], got {}", self.yv_min_frac),
            });
        }

        if !self.rxy_min.is_finite() {
            return Err(CalibrationError::InvalidConfig {
                reason: format!("rxy_min must be finite, got {}", self.rxy_min),
            });
        }

        if !self.ebest_floor.is_finite() || self.ebest_floor <= 0.0 {
            return Err(CalibrationError::InvalidConfig {
                reason: format!(
                    "ebest_floor must be finite and > 0, got {}",
                    self.ebest_floor
                ),
            });
        }

        if self.percentiles.is_empty() {
            return Err(CalibrationError::InvalidConfig {
                reason: "percentiles must not be empty".to_string(),
            });
        }

        for &p in &self.percentiles {
            if !(p > 0.0 && p < 100.0) {
                return Err(CalibrationError::InvalidConfig {
                    reason: format!("percentiles must lie in (0, 100), got {p}"),
                });
            }
        }

        if let Some(w) = self.percentiles.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CalibrationError::InvalidConfig {
                reason: format!(
                    "percentiles must be strictly ascending, got {} before {}",
                    w[0], w[1]
                ),
            });
        }

        Ok(())
    }
}

impl Default for ErConfig {
    fn default() -> Self {
        Self::new()
    }
}
