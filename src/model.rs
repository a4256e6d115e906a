//! Linear regression scoring.
//!
//! The trained model ships as a JSON artifact listing one coefficient per
//! feature column: numeric passthrough columns (year, kms driven) and one
//! one-hot column per categorical level seen in training. Every column names
//! the field (and level) it belongs to, so the encoding that was implicit in
//! the training pipeline's column order is explicit here and scoring does not
//! depend on artifact order at all.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::types::PredictionRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Year,
    KmsDriven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Name,
    Company,
    FuelType,
}

impl CategoryField {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryField::Name => "name",
            CategoryField::Company => "company",
            CategoryField::FuelType => "fuel_type",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Column {
    Numeric {
        field: NumericField,
        coefficient: f64,
    },
    Category {
        field: CategoryField,
        value: String,
        coefficient: f64,
    },
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    intercept: f64,
    columns: Vec<Column>,
}

/// Scoring failure for one request. Unknown categories mirror a strict
/// one-hot encoder: a value the model was never fitted on cannot be encoded.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("model was not trained on {field} \"{value}\"")]
    UnknownCategory { field: &'static str, value: String },
    #[error("model produced a non-finite price")]
    NonFinite,
}

/// The trained linear model: `price = intercept + sum(matched coefficients)`.
#[derive(Debug)]
pub struct LinearModel {
    intercept: f64,
    columns: Vec<Column>,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact at {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid model artifact at {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ModelFile =
            serde_json::from_str(text).context("failed to parse model JSON")?;

        if file.columns.is_empty() {
            bail!("model artifact has no columns");
        }
        if !file.intercept.is_finite() {
            bail!("model intercept is not finite");
        }

        let mut numeric_seen = HashSet::new();
        let mut category_seen = HashSet::new();
        for column in &file.columns {
            match column {
                Column::Numeric { field, coefficient } => {
                    if !coefficient.is_finite() {
                        bail!("non-finite coefficient for numeric column {:?}", field);
                    }
                    if !numeric_seen.insert(*field) {
                        bail!("duplicate numeric column {:?}", field);
                    }
                }
                Column::Category {
                    field,
                    value,
                    coefficient,
                } => {
                    if !coefficient.is_finite() {
                        bail!(
                            "non-finite coefficient for {} \"{}\"",
                            field.as_str(),
                            value
                        );
                    }
                    if !category_seen.insert((*field, value.clone())) {
                        bail!("duplicate column for {} \"{}\"", field.as_str(), value);
                    }
                }
            }
        }

        Ok(Self {
            intercept: file.intercept,
            columns: file.columns,
        })
    }

    /// Raw predicted price for one request, before any display calibration.
    ///
    /// Each submitted categorical value must match one of its field's trained
    /// columns; otherwise the request is unencodable and scoring fails.
    pub fn predict_raw(&self, req: &PredictionRequest) -> Result<f64, ScoreError> {
        let mut price = self.intercept;
        let mut name_matched = false;
        let mut company_matched = false;
        let mut fuel_matched = false;

        for column in &self.columns {
            match column {
                Column::Numeric { field, coefficient } => {
                    let value = match field {
                        NumericField::Year => req.year as f64,
                        NumericField::KmsDriven => req.kms_driven as f64,
                    };
                    price += coefficient * value;
                }
                Column::Category {
                    field,
                    value,
                    coefficient,
                } => {
                    let (submitted, matched) = match field {
                        CategoryField::Name => (&req.name, &mut name_matched),
                        CategoryField::Company => (&req.company, &mut company_matched),
                        CategoryField::FuelType => (&req.fuel_type, &mut fuel_matched),
                    };
                    if submitted == value {
                        *matched = true;
                        price += coefficient;
                    }
                }
            }
        }

        if !name_matched {
            return Err(ScoreError::UnknownCategory {
                field: "name",
                value: req.name.clone(),
            });
        }
        if !company_matched {
            return Err(ScoreError::UnknownCategory {
                field: "company",
                value: req.company.clone(),
            });
        }
        if !fuel_matched {
            return Err(ScoreError::UnknownCategory {
                field: "fuel_type",
                value: req.fuel_type.clone(),
            });
        }
        if !price.is_finite() {
            return Err(ScoreError::NonFinite);
        }
        Ok(price)
    }

    /// Whether the model was trained on this categorical value.
    pub fn knows(&self, field: CategoryField, value: &str) -> bool {
        self.columns.iter().any(|column| match column {
            Column::Category {
                field: f, value: v, ..
            } => *f == field && v == value,
            Column::Numeric { .. } => false,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> String {
        serde_json::json!({
            "intercept": 1000.0,
            "columns": [
                {"kind": "numeric", "field": "year", "coefficient": 10.0},
                {"kind": "numeric", "field": "kms_driven", "coefficient": -0.5},
                {"kind": "category", "field": "name", "value": "Swift", "coefficient": 500.0},
                {"kind": "category", "field": "name", "value": "Alto", "coefficient": -200.0},
                {"kind": "category", "field": "company", "value": "Maruti", "coefficient": 250.0},
                {"kind": "category", "field": "fuel_type", "value": "Petrol", "coefficient": 100.0},
                {"kind": "category", "field": "fuel_type", "value": "Diesel", "coefficient": 150.0}
            ]
        })
        .to_string()
    }

    fn swift_request() -> PredictionRequest {
        PredictionRequest {
            name: "Swift".to_string(),
            company: "Maruti".to_string(),
            year: 2015,
            kms_driven: 40000,
            fuel_type: "Petrol".to_string(),
        }
    }

    #[test]
    fn scores_are_intercept_plus_matched_coefficients() {
        let model = LinearModel::from_json(&sample_json()).expect("valid artifact");
        let raw = model.predict_raw(&swift_request()).expect("encodable");
        // 1000 + 2015*10 + 40000*-0.5 + 500 + 250 + 100
        assert_eq!(raw, 2000.0);
    }

    #[test]
    fn artifact_order_does_not_matter() {
        let model = LinearModel::from_json(&sample_json()).expect("valid artifact");
        let shuffled = serde_json::json!({
            "intercept": 1000.0,
            "columns": [
                {"kind": "category", "field": "fuel_type", "value": "Diesel", "coefficient": 150.0},
                {"kind": "category", "field": "company", "value": "Maruti", "coefficient": 250.0},
                {"kind": "numeric", "field": "kms_driven", "coefficient": -0.5},
                {"kind": "category", "field": "name", "value": "Alto", "coefficient": -200.0},
                {"kind": "category", "field": "fuel_type", "value": "Petrol", "coefficient": 100.0},
                {"kind": "numeric", "field": "year", "coefficient": 10.0},
                {"kind": "category", "field": "name", "value": "Swift", "coefficient": 500.0}
            ]
        })
        .to_string();
        let reordered = LinearModel::from_json(&shuffled).expect("valid artifact");

        let req = swift_request();
        assert_eq!(
            model.predict_raw(&req).unwrap(),
            reordered.predict_raw(&req).unwrap()
        );
    }

    #[test]
    fn unknown_values_fail_per_field() {
        let model = LinearModel::from_json(&sample_json()).expect("valid artifact");

        let mut req = swift_request();
        req.name = "Nano".to_string();
        match model.predict_raw(&req) {
            Err(ScoreError::UnknownCategory { field, value }) => {
                assert_eq!(field, "name");
                assert_eq!(value, "Nano");
            }
            other => panic!("expected unknown name, got {:?}", other.map(|_| ())),
        }

        let mut req = swift_request();
        req.company = "Tata".to_string();
        match model.predict_raw(&req) {
            Err(ScoreError::UnknownCategory { field, .. }) => assert_eq!(field, "company"),
            other => panic!("expected unknown company, got {:?}", other.map(|_| ())),
        }

        let mut req = swift_request();
        req.fuel_type = "Electric".to_string();
        match model.predict_raw(&req) {
            Err(ScoreError::UnknownCategory { field, .. }) => assert_eq!(field, "fuel_type"),
            other => panic!("expected unknown fuel, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(sample_json().as_bytes()).unwrap();

        let model = LinearModel::load(file.path()).expect("artifact should load");
        assert_eq!(model.column_count(), 7);
        assert!(model.knows(CategoryField::Name, "Swift"));
        assert!(model.knows(CategoryField::Company, "Maruti"));
        assert!(!model.knows(CategoryField::Company, "Tata"));
        assert!(!model.knows(CategoryField::FuelType, "Electric"));
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let err = LinearModel::load(Path::new("no/such/model.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read model artifact"));
    }

    #[test]
    fn garbage_json_is_an_error() {
        assert!(LinearModel::from_json("not json").is_err());
    }

    #[test]
    fn empty_column_list_is_rejected() {
        let text = r#"{"intercept": 1.0, "columns": []}"#;
        let err = LinearModel::from_json(text).unwrap_err();
        assert!(err.to_string().contains("no columns"));
    }

    #[test]
    fn duplicate_numeric_column_is_rejected() {
        let text = serde_json::json!({
            "intercept": 0.0,
            "columns": [
                {"kind": "numeric", "field": "year", "coefficient": 1.0},
                {"kind": "numeric", "field": "year", "coefficient": 2.0}
            ]
        })
        .to_string();
        let err = LinearModel::from_json(&text).unwrap_err();
        assert!(err.to_string().contains("duplicate numeric column"));
    }

    #[test]
    fn duplicate_category_column_is_rejected() {
        let text = serde_json::json!({
            "intercept": 0.0,
            "columns": [
                {"kind": "category", "field": "name", "value": "Swift", "coefficient": 1.0},
                {"kind": "category", "field": "name", "value": "Swift", "coefficient": 2.0}
            ]
        })
        .to_string();
        let err = LinearModel::from_json(&text).unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn non_finite_intercept_is_rejected() {
        // 1e999 overflows f64; whether the parser reports it or the finite
        // check does, a corrupt artifact like this must not load.
        let text = r#"{"intercept": 1e999, "columns": [
            {"kind": "numeric", "field": "year", "coefficient": 1.0}
        ]}"#;
        assert!(LinearModel::from_json(text).is_err());
    }

    #[test]
    fn overflowing_score_is_a_non_finite_error() {
        let text = serde_json::json!({
            "intercept": 1e308,
            "columns": [
                {"kind": "numeric", "field": "year", "coefficient": 1e308},
                {"kind": "category", "field": "name", "value": "Swift", "coefficient": 0.0},
                {"kind": "category", "field": "company", "value": "Maruti", "coefficient": 0.0},
                {"kind": "category", "field": "fuel_type", "value": "Petrol", "coefficient": 0.0}
            ]
        })
        .to_string();
        let model = LinearModel::from_json(&text).expect("finite coefficients");
        match model.predict_raw(&swift_request()) {
            Err(ScoreError::NonFinite) => {}
            other => panic!("expected non-finite error, got {:?}", other.map(|_| ())),
        }
    }
}
