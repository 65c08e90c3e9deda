//! Record types matching the static JSON snapshot produced by data preparation

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::DashboardError;

/// Claim complexity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Level 1: consultations, laboratory, dental, prevention
    Ambulatory,
    /// Level 2: scheduled surgery, stays of five days or less
    Hospital,
    /// Level 3: oncology, ICU, cardiovascular, transplants
    HighSpecialty,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Ambulatory, Level::Hospital, Level::HighSpecialty];

    pub fn number(self) -> u8 {
        match self {
            Level::Ambulatory => 1,
            Level::Hospital => 2,
            Level::HighSpecialty => 3,
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = DashboardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Ambulatory),
            2 => Ok(Level::Hospital),
            3 => Ok(Level::HighSpecialty),
            other => Err(DashboardError::UnknownLevel(other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.number()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

/// Sex of the insured, as labelled in the data files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "Masculino", alias = "Male")]
    Male,
    #[serde(rename = "Femenino", alias = "Female")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Label used by the data files
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Masculino",
            Sex::Female => "Femenino",
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculino" | "male" | "m" => Ok(Sex::Male),
            "femenino" | "female" | "f" => Ok(Sex::Female),
            _ => Err(DashboardError::UnknownSex(s.to_string())),
        }
    }
}

/// Upstream writes `null` where a metric is undefined (no claims in the cell)
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Claims aggregated by (year, age, sex, level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAggregate {
    #[serde(rename = "anio")]
    pub year: u16,

    #[serde(rename = "edad")]
    pub age: u8,

    #[serde(rename = "sexo")]
    pub sex: Sex,

    #[serde(rename = "nivel")]
    pub level: Level,

    #[serde(rename = "num_siniestros")]
    pub claim_count: u64,

    /// Paid amount in nominal pesos
    #[serde(rename = "monto_original")]
    pub raw_amount: f64,

    /// Paid amount adjusted for medical inflation to 2024 pesos
    #[serde(rename = "monto_ajustado")]
    pub adjusted_amount: f64,

    /// Average adjusted amount per claim
    #[serde(rename = "severidad", default, deserialize_with = "null_as_zero")]
    pub severity: f64,
}

impl ClaimAggregate {
    /// Severity recomputed from the amounts; 0 for cells without claims
    pub fn derived_severity(&self) -> f64 {
        if self.claim_count > 0 {
            self.adjusted_amount / self.claim_count as f64
        } else {
            0.0
        }
    }
}

/// Policies aggregated by (year, age, sex)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAggregate {
    #[serde(rename = "anio")]
    pub year: u16,

    #[serde(rename = "edad")]
    pub age: u8,

    #[serde(rename = "sexo")]
    pub sex: Sex,

    #[serde(rename = "num_asegurados")]
    pub insured_count: u64,

    #[serde(rename = "prima_emitida")]
    pub issued_premium: f64,

    #[serde(rename = "suma_asegurada")]
    pub sum_insured: f64,

    #[serde(rename = "prima_promedio", default, deserialize_with = "null_as_zero")]
    pub average_premium: f64,
}

/// Precomputed risk premium for one (level, age) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumByLevelAge {
    #[serde(rename = "nivel")]
    pub level: Level,

    #[serde(rename = "edad")]
    pub age: u8,

    /// Claims per exposed insured
    #[serde(rename = "frecuencia", default, deserialize_with = "null_as_zero")]
    pub frequency: f64,

    /// Average claim amount
    #[serde(rename = "severidad", default, deserialize_with = "null_as_zero")]
    pub severity: f64,

    /// frequency x severity
    #[serde(rename = "prima_anual", default, deserialize_with = "null_as_zero")]
    pub annual_premium: f64,

    #[serde(rename = "prima_mensual", default, deserialize_with = "null_as_zero")]
    pub monthly_premium: f64,

    #[serde(rename = "descripcion", default)]
    pub description: String,
}

/// Share of claims and amount for one level in the general summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDistribution {
    #[serde(rename = "nivel")]
    pub level: Level,

    #[serde(rename = "descripcion", default)]
    pub description: String,

    #[serde(rename = "siniestros")]
    pub claims: u64,

    #[serde(rename = "monto")]
    pub amount: f64,

    #[serde(rename = "pct_siniestros")]
    pub claims_percentage: f64,

    #[serde(rename = "pct_monto")]
    pub amount_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

/// Global rollups shown on the summary cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSummary {
    #[serde(rename = "total_siniestros")]
    pub total_claims: u64,

    #[serde(rename = "monto_total")]
    pub total_amount: f64,

    #[serde(rename = "monto_promedio")]
    pub mean_amount: f64,

    #[serde(rename = "distribucion_nivel")]
    pub by_level: Vec<LevelDistribution>,

    #[serde(rename = "anios_disponibles", default)]
    pub available_years: Vec<u16>,

    #[serde(rename = "rango_edad")]
    pub age_range: Option<AgeRange>,

    /// When the snapshot was prepared (local time, no offset)
    #[serde(rename = "generado", default)]
    pub generated_at: Option<NaiveDateTime>,
}

impl GeneralSummary {
    /// Check that per-level percentages add up to 100 within `tolerance` points
    ///
    /// The file stores percentages with one decimal, so the tolerance has to
    /// absorb that rounding.
    pub fn check_distribution(&self, tolerance: f64) -> Result<(), DashboardError> {
        if self.total_claims == 0 {
            return Ok(());
        }
        let claims: f64 = self.by_level.iter().map(|d| d.claims_percentage).sum();
        if (claims - 100.0).abs() > tolerance {
            return Err(DashboardError::invalid(
                "pct_siniestros",
                format!("level percentages sum to {claims:.3}, expected 100"),
            ));
        }
        let amount: f64 = self.by_level.iter().map(|d| d.amount_percentage).sum();
        if (amount - 100.0).abs() > tolerance {
            return Err(DashboardError::invalid(
                "pct_monto",
                format!("level percentages sum to {amount:.3}, expected 100"),
            ));
        }
        Ok(())
    }
}

/// Medical cause with its assigned level (the cause search catalog)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedCause {
    #[serde(rename = "causa")]
    pub cause: String,

    #[serde(rename = "nivel")]
    pub level: Level,

    /// Number of claim rows carrying this cause
    #[serde(rename = "frecuencia")]
    pub frequency: u64,
}

/// Portfolio totals for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualPolicySummary {
    #[serde(rename = "anio")]
    pub year: u16,

    #[serde(rename = "num_asegurados")]
    pub insured_count: u64,

    #[serde(rename = "prima_emitida")]
    pub issued_premium: f64,

    #[serde(rename = "suma_asegurada")]
    pub sum_insured: f64,
}

/// Portfolio totals for one age band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyByAgeBand {
    #[serde(rename = "banda_edad")]
    pub band: String,

    #[serde(rename = "num_asegurados")]
    pub insured_count: u64,

    #[serde(rename = "prima_emitida")]
    pub issued_premium: f64,

    #[serde(rename = "pct_asegurados")]
    pub insured_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_wire_format() {
        let level: Level = serde_json::from_str("3").unwrap();
        assert_eq!(level, Level::HighSpecialty);
        assert_eq!(serde_json::to_string(&Level::Hospital).unwrap(), "2");
        assert!(serde_json::from_str::<Level>("4").is_err());
    }

    #[test]
    fn test_sex_labels() {
        let sex: Sex = serde_json::from_str("\"Femenino\"").unwrap();
        assert_eq!(sex, Sex::Female);
        let sex: Sex = serde_json::from_str("\"Male\"").unwrap();
        assert_eq!(sex, Sex::Male);
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"Masculino\"");
        assert_eq!("femenino".parse::<Sex>().unwrap(), Sex::Female);
        assert!("otro".parse::<Sex>().is_err());
    }

    #[test]
    fn test_claim_record_from_json() {
        let json = r#"{"anio": 2022, "edad": 41, "sexo": "Masculino", "nivel": 2,
            "num_siniestros": 4, "monto_original": 100000.0,
            "monto_ajustado": 120000.0, "severidad": 30000.0}"#;
        let claim: ClaimAggregate = serde_json::from_str(json).unwrap();
        assert_eq!(claim.year, 2022);
        assert_eq!(claim.level, Level::Hospital);
        assert_eq!(claim.derived_severity(), claim.severity);
    }

    #[test]
    fn test_premium_row_null_metrics() {
        let json = r#"{"nivel": 3, "edad": 25, "frecuencia": 0.0, "severidad": null,
            "prima_anual": null, "prima_mensual": null, "descripcion": "Alta Especialidad"}"#;
        let row: PremiumByLevelAge = serde_json::from_str(json).unwrap();
        assert_eq!(row.severity, 0.0);
        assert_eq!(row.annual_premium, 0.0);
    }

    #[test]
    fn test_zero_claims_severity() {
        let claim = ClaimAggregate {
            year: 2020,
            age: 30,
            sex: Sex::Female,
            level: Level::Ambulatory,
            claim_count: 0,
            raw_amount: 0.0,
            adjusted_amount: 0.0,
            severity: 0.0,
        };
        assert_eq!(claim.derived_severity(), 0.0);
    }
}
