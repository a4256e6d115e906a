use std::path::Path;

use anyhow::{Context, Result};

use crate::types::CarRecord;

/// Dropdown option sets derived from the car listings dataset.
///
/// All sets are computed once from the loaded records and never change
/// afterwards. An empty dataset is legal and simply yields empty sets; the
/// page then has nothing to offer and a submission can never become complete.
pub struct Catalog {
    records: Vec<CarRecord>,
    companies: Vec<String>,
    years: Vec<i32>,
    fuel_types: Vec<String>,
}

impl Catalog {
    pub fn from_records(records: Vec<CarRecord>) -> Self {
        let mut companies: Vec<String> =
            records.iter().map(|r| r.company.clone()).collect();
        companies.sort();
        companies.dedup();

        // Most recent year first, the order the form offers them in.
        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years.reverse();

        let mut fuel_types: Vec<String> =
            records.iter().map(|r| r.fuel_type.clone()).collect();
        fuel_types.sort();
        fuel_types.dedup();

        Self {
            records,
            companies,
            years,
            fuel_types,
        }
    }

    /// Unique company names, ascending.
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Unique years, most recent first.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Unique fuel types, ascending.
    pub fn fuel_types(&self) -> &[String] {
        &self.fuel_types
    }

    /// Unique model names sold by `company`, ascending. Unknown (or unset,
    /// posted as empty) companies yield an empty list.
    pub fn models_for(&self, company: &str) -> Vec<String> {
        let mut models: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.company == company)
            .map(|r| r.name.clone())
            .collect();
        models.sort();
        models.dedup();
        models
    }

    pub fn contains_company(&self, company: &str) -> bool {
        self.companies.iter().any(|c| c == company)
    }

    /// Whether `name` is a model that `company` actually sells. Mirrors the
    /// dependent dropdown: a model offered only under another company does
    /// not count.
    pub fn has_model(&self, company: &str, name: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.company == company && r.name == name)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn contains_fuel_type(&self, fuel_type: &str) -> bool {
        self.fuel_types.iter().any(|f| f == fuel_type)
    }

    pub fn records(&self) -> &[CarRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the listings CSV (columns `name,company,year,kms_driven,fuel_type,price`).
/// A missing file or a malformed row is fatal to startup.
pub fn load_dataset(path: &Path) -> Result<Vec<CarRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open dataset at {}", path.display()))?;

    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: CarRecord =
            row.with_context(|| format!("malformed row in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}
