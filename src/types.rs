use serde::{Deserialize, Serialize};

/// One row of the cleaned car listings dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct CarRecord {
    pub name: String,
    pub company: String,
    pub year: i32,
    pub kms_driven: i64,
    pub fuel_type: String,
    pub price: f64,
}

/// Raw submission body. Every field is optional at the wire level so an
/// unfilled form comes back as a warning instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictForm {
    pub name: Option<String>,
    pub company: Option<String>,
    pub year: Option<i32>,
    pub kms_driven: Option<i64>,
    pub fuel_type: Option<String>,
}

/// Fully populated prediction input. Only built once every field is present,
/// so the predictor never sees partial data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub name: String,
    pub company: String,
    pub year: i32,
    pub kms_driven: i64,
    pub fuel_type: String,
}

/// Display price for one prediction, after calibration and rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub price: f64,
}

impl PredictForm {
    /// Build the complete request, or report which fields are still unset.
    /// Empty and whitespace-only strings count as unset; that is what the
    /// form posts for an untouched dropdown placeholder.
    pub fn into_request(self) -> Result<PredictionRequest, Vec<&'static str>> {
        let mut missing = Vec::new();

        let name = take_text(self.name, "name", &mut missing);
        let company = take_text(self.company, "company", &mut missing);
        let year = match self.year {
            Some(y) => y,
            None => {
                missing.push("year");
                0
            }
        };
        let kms_driven = match self.kms_driven {
            Some(k) => k,
            None => {
                missing.push("kms_driven");
                0
            }
        };
        let fuel_type = take_text(self.fuel_type, "fuel_type", &mut missing);

        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(PredictionRequest {
            name,
            company,
            year,
            kms_driven,
            fuel_type,
        })
    }
}

fn take_text(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

/// Format a price for display: currency prefix, thousands separators, no
/// decimals. `format_price(350000.0)` -> `"Rs. 350,000"`.
pub fn format_price(price: f64) -> String {
    let rupees = price.round() as i64;
    let sign = if rupees < 0 { "-" } else { "" };
    let digits = rupees.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("Rs. {}{}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> PredictForm {
        PredictForm {
            name: Some("Swift".to_string()),
            company: Some("Maruti".to_string()),
            year: Some(2015),
            kms_driven: Some(40000),
            fuel_type: Some("Petrol".to_string()),
        }
    }

    #[test]
    fn complete_form_builds_a_request() {
        let req = full_form().into_request().expect("form was complete");
        assert_eq!(req.name, "Swift");
        assert_eq!(req.company, "Maruti");
        assert_eq!(req.year, 2015);
        assert_eq!(req.kms_driven, 40000);
        assert_eq!(req.fuel_type, "Petrol");
    }

    #[test]
    fn each_missing_field_is_reported() {
        let mut form = full_form();
        form.company = None;
        form.kms_driven = None;
        let missing = full_err(form);
        assert_eq!(missing, vec!["company", "kms_driven"]);
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let mut form = full_form();
        form.name = Some("".to_string());
        form.fuel_type = Some("   ".to_string());
        let missing = full_err(form);
        assert_eq!(missing, vec!["name", "fuel_type"]);
    }

    #[test]
    fn empty_form_reports_all_five_fields() {
        let missing = full_err(PredictForm::default());
        assert_eq!(
            missing,
            vec!["name", "company", "year", "kms_driven", "fuel_type"]
        );
    }

    #[test]
    fn prices_group_thousands_with_prefix() {
        assert_eq!(format_price(350000.0), "Rs. 350,000");
        assert_eq!(format_price(1234567.0), "Rs. 1,234,567");
        assert_eq!(format_price(999.0), "Rs. 999");
        assert_eq!(format_price(0.0), "Rs. 0");
    }

    #[test]
    fn formatting_rounds_away_decimals() {
        assert_eq!(format_price(350000.49), "Rs. 350,000");
        assert_eq!(format_price(999.5), "Rs. 1,000");
    }

    #[test]
    fn negative_prices_keep_the_sign_outside_the_grouping() {
        assert_eq!(format_price(-5000.0), "Rs. -5,000");
    }

    fn full_err(form: PredictForm) -> Vec<&'static str> {
        form.into_request()
            .expect_err("form should have been incomplete")
    }
}
