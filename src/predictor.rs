//! Predictor Adapter: validation around the model plus display calibration.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::model::{LinearModel, ScoreError};
use crate::types::{PredictionRequest, PredictionResult};

/// Why a complete request still could not be priced.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("kilometers driven must be between {min} and {max}, got {got}")]
    KmsOutOfRange { got: i64, min: i64, max: i64 },
    #[error("{field} \"{value}\" is not one of the offered options")]
    UnknownOption { field: &'static str, value: String },
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Wraps the trained model: checks the request against the configured bounds
/// and the catalog's option sets, then applies the fixed display calibration
/// (multiplier and 2-decimal rounding) to the raw model price.
pub struct Predictor {
    model: Arc<LinearModel>,
    catalog: Arc<Catalog>,
    multiplier: f64,
    kms_min: i64,
    kms_max: i64,
}

impl Predictor {
    pub fn new(model: Arc<LinearModel>, catalog: Arc<Catalog>, config: &AppConfig) -> Self {
        Self {
            model,
            catalog,
            multiplier: config.price_multiplier,
            kms_min: config.kms_min,
            kms_max: config.kms_max,
        }
    }

    /// Price one request. Deterministic: identical requests always produce
    /// identical results.
    pub fn predict(&self, req: &PredictionRequest) -> Result<PredictionResult, PredictError> {
        if req.kms_driven < self.kms_min || req.kms_driven > self.kms_max {
            return Err(PredictError::KmsOutOfRange {
                got: req.kms_driven,
                min: self.kms_min,
                max: self.kms_max,
            });
        }
        self.check_against_catalog(req)?;

        let raw = self.model.predict_raw(req)?;
        let price = round2(raw * self.multiplier);
        Ok(PredictionResult { price })
    }

    /// Reject values the Catalog Filter never offered. The model performs
    /// its own strict encoding check afterwards; this layer exists so a
    /// hand-crafted submission fails the same way the dropdowns would have
    /// prevented it.
    fn check_against_catalog(&self, req: &PredictionRequest) -> Result<(), PredictError> {
        if !self.catalog.contains_company(&req.company) {
            return Err(unknown_option("company", &req.company));
        }
        if !self.catalog.has_model(&req.company, &req.name) {
            return Err(unknown_option("name", &req.name));
        }
        if !self.catalog.contains_year(req.year) {
            return Err(unknown_option("year", &req.year.to_string()));
        }
        if !self.catalog.contains_fuel_type(&req.fuel_type) {
            return Err(unknown_option("fuel_type", &req.fuel_type));
        }
        Ok(())
    }
}

fn unknown_option(field: &'static str, value: &str) -> PredictError {
    PredictError::UnknownOption {
        field,
        value: value.to_string(),
    }
}

/// Round to two decimal places, the display contract for prices.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
