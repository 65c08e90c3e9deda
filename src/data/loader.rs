//! Load the static JSON snapshot from a data directory
//!
//! File names follow the data-preparation step. The four core files are
//! required; the cause catalog and the portfolio summaries are optional and
//! load as empty collections when absent.

use csv::Reader;
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use super::{
    AnnualPolicySummary, ClaimAggregate, ClassifiedCause, GeneralSummary, Level,
    PolicyAggregate, PolicyByAgeBand, PremiumByLevelAge,
};
use crate::error::{DashboardError, Result};

/// Default path to the data directory
pub const DEFAULT_DATA_PATH: &str = "data";

pub const CLAIMS_FILE: &str = "siniestros-agregados.json";
pub const POLICIES_FILE: &str = "polizas-agregadas.json";
pub const PREMIUMS_FILE: &str = "primas-nivel-edad.json";
pub const SUMMARY_FILE: &str = "resumen-general.json";
pub const CAUSES_FILE: &str = "clasificacion.json";
pub const ANNUAL_POLICIES_FILE: &str = "polizas-resumen-anual.json";
pub const AGE_BANDS_FILE: &str = "polizas-por-banda.json";

/// Read a JSON file and deserialize it into a typed value
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DashboardError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an optional JSON array; a missing file yields an empty vector
fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("Optional data file {} not found, using empty table", path.display());
        return Ok(Vec::new());
    }
    read_json(path)
}

pub fn load_claims(dir: &Path) -> Result<Vec<ClaimAggregate>> {
    read_json(&dir.join(CLAIMS_FILE))
}

pub fn load_policies(dir: &Path) -> Result<Vec<PolicyAggregate>> {
    read_json(&dir.join(POLICIES_FILE))
}

pub fn load_premiums(dir: &Path) -> Result<Vec<PremiumByLevelAge>> {
    read_json(&dir.join(PREMIUMS_FILE))
}

pub fn load_summary(dir: &Path) -> Result<GeneralSummary> {
    read_json(&dir.join(SUMMARY_FILE))
}

pub fn load_causes(dir: &Path) -> Result<Vec<ClassifiedCause>> {
    read_optional_json(&dir.join(CAUSES_FILE))
}

pub fn load_annual_policies(dir: &Path) -> Result<Vec<AnnualPolicySummary>> {
    read_optional_json(&dir.join(ANNUAL_POLICIES_FILE))
}

pub fn load_age_bands(dir: &Path) -> Result<Vec<PolicyByAgeBand>> {
    read_optional_json(&dir.join(AGE_BANDS_FILE))
}

/// Raw row of the upstream primas_por_nivel_edad.csv
#[derive(Debug, serde::Deserialize)]
struct PremiumCsvRow {
    #[serde(rename = "edad")]
    age: u8,
    #[serde(rename = "nivel")]
    level: u8,
    #[serde(rename = "descripcion", default)]
    description: String,
    #[serde(rename = "frecuencia")]
    frequency: Option<f64>,
    #[serde(rename = "severidad")]
    severity: Option<f64>,
    #[serde(rename = "prima_riesgo")]
    risk_premium: Option<f64>,
    #[serde(rename = "prima_mensual")]
    monthly_premium: Option<f64>,
}

impl PremiumCsvRow {
    fn into_record(self) -> Result<PremiumByLevelAge> {
        // Empty cells mean the cell had no claims
        Ok(PremiumByLevelAge {
            level: Level::try_from(self.level)?,
            age: self.age,
            frequency: self.frequency.unwrap_or(0.0),
            severity: self.severity.unwrap_or(0.0),
            annual_premium: self.risk_premium.unwrap_or(0.0),
            monthly_premium: self.monthly_premium.unwrap_or(0.0),
            description: self.description,
        })
    }
}

/// Load the premium catalog from the upstream CSV file
pub fn load_premiums_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PremiumByLevelAge>> {
    let reader = Reader::from_path(path)?;
    collect_premium_rows(reader)
}

/// Load the premium catalog from any CSV reader
pub fn load_premiums_csv_from_reader<R>(reader: R) -> Result<Vec<PremiumByLevelAge>>
where
    R: std::io::Read,
{
    collect_premium_rows(Reader::from_reader(reader))
}

fn collect_premium_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<PremiumByLevelAge>> {
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: PremiumCsvRow = result?;
        rows.push(row.into_record()?);
    }
    Ok(rows)
}

/// Every dataset the dashboard pages read
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub claims: Vec<ClaimAggregate>,
    pub policies: Vec<PolicyAggregate>,
    pub premiums: Vec<PremiumByLevelAge>,
    pub summary: Option<GeneralSummary>,
    pub causes: Vec<ClassifiedCause>,
    pub annual_policies: Vec<AnnualPolicySummary>,
    pub age_bands: Vec<PolicyByAgeBand>,
}

impl DataSnapshot {
    /// Load all datasets from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_DATA_PATH))
    }

    /// Load all datasets from a specific directory
    pub fn load_from(dir: &Path) -> Result<Self> {
        let snapshot = Self {
            claims: load_claims(dir)?,
            policies: load_policies(dir)?,
            premiums: load_premiums(dir)?,
            summary: Some(load_summary(dir)?),
            causes: load_causes(dir)?,
            annual_policies: load_annual_policies(dir)?,
            age_bands: load_age_bands(dir)?,
        };

        info!(
            "Loaded {} claim rows, {} policy rows, {} premium rows, {} causes from {}",
            snapshot.claims.len(),
            snapshot.policies.len(),
            snapshot.premiums.len(),
            snapshot.causes.len(),
            dir.display()
        );

        Ok(snapshot)
    }
}
