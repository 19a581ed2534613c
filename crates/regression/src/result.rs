//! Result types for Ensemble Regression calibration.

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::dispersion::Dispersion;
use crate::error::CalibrationError;
use crate::regression::Regression;

/// Intermediate per-point fields of a calibration run.
///
/// Exposed so callers can map or plot them; none of them feed back into the
/// calibration. NaN marks cells where the arithmetic was undefined.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    a1: Array1<f64>,
    ebest: Array1<f64>,
    emean: Array1<f64>,
    k: Array1<f64>,
    rxy: Array1<f64>,
    es: Array1<f64>,
    yv: Array1<f64>,
    rbest: Array1<f64>,
    y_anom_mean: Array1<f64>,
}

#[derive(Serialize)]
struct DiagnosticsRecord {
    a1: Vec<f64>,
    ebest: Vec<f64>,
    emean: Vec<f64>,
    k: Vec<f64>,
    rxy: Vec<f64>,
    es: Vec<f64>,
    yv: Vec<f64>,
    rbest: Vec<f64>,
    y_anom_mean: Vec<f64>,
}

impl Diagnostics {
    /// Collects the per-point fields of the dispersion and regression stages.
    ///
    /// `rxy` is taken after the climatology fallback.
    pub(crate) fn from_stages(disp: Dispersion, reg: Regression) -> Self {
        Self {
            a1: reg.a1,
            ebest: reg.ebest,
            emean: reg.emean,
            k: disp.k,
            rxy: reg.rxy,
            es: disp.es,
            yv: disp.yv,
            rbest: disp.rbest,
            y_anom_mean: disp.y_anom_mean,
        }
    }

    /// Regression slope.
    pub fn a1(&self) -> &Array1<f64> {
        &self.a1
    }

    /// Best-member regression standard error (after the zero floor).
    pub fn ebest(&self) -> &Array1<f64> {
        &self.ebest
    }

    /// Ensemble-mean regression standard error.
    pub fn emean(&self) -> &Array1<f64> {
        &self.emean
    }

    /// Dispersion factor.
    pub fn k(&self) -> &Array1<f64> {
        &self.k
    }

    /// Observation / ensemble-mean correlation used by the regression
    /// (after any size correction and the climatology fallback).
    pub fn rxy(&self) -> &Array1<f64> {
        &self.rxy
    }

    /// Spread error variance (after any size correction).
    pub fn es(&self) -> &Array1<f64> {
        &self.es
    }

    /// Ensemble-mean variance (after bounding and any size correction).
    pub fn yv(&self) -> &Array1<f64> {
        &self.yv
    }

    /// Observation / best-member correlation.
    pub fn rbest(&self) -> &Array1<f64> {
        &self.rbest
    }

    /// Ensemble mean of the member anomalies.
    pub fn y_anom_mean(&self) -> &Array1<f64> {
        &self.y_anom_mean
    }

    /// Serialises every field to pretty-printed JSON. NaN becomes `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::Serialization`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, CalibrationError> {
        let record = DiagnosticsRecord {
            a1: self.a1.to_vec(),
            ebest: self.ebest.to_vec(),
            emean: self.emean.to_vec(),
            k: self.k.to_vec(),
            rxy: self.rxy.to_vec(),
            es: self.es.to_vec(),
            yv: self.yv.to_vec(),
            rbest: self.rbest.to_vec(),
            y_anom_mean: self.y_anom_mean.to_vec(),
        };
        serde_json::to_string_pretty(&record).map_err(|e| CalibrationError::Serialization {
            reason: e.to_string(),
        })
    }
}

/// The output of a calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationResult {
    /// POE field, percentile x point.
    poe: Array2<f64>,
    /// Percentile grid labelling the rows of `poe`.
    percentiles: Vec<f64>,
    /// Intermediate fields.
    diagnostics: Diagnostics,
}

impl CalibrationResult {
    pub(crate) fn new(poe: Array2<f64>, percentiles: Vec<f64>, diagnostics: Diagnostics) -> Self {
        Self {
            poe,
            percentiles,
            diagnostics,
        }
    }

    /// Returns the POE field (percentile x point).
    pub fn poe(&self) -> &Array2<f64> {
        &self.poe
    }

    /// Consumes `self` and returns the owned POE field.
    pub fn into_poe(self) -> Array2<f64> {
        self.poe
    }

    /// Returns the percentile grid, one entry per POE row.
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    /// Returns the intermediate fields.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Number of spatial points.
    pub fn n_points(&self) -> usize {
        self.poe.ncols()
    }
}
