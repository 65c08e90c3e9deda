//! Dashboard configuration
//!
//! Every constant the calculations depend on lives here and is passed in
//! explicitly. Defaults reproduce the values the dashboard ships with; a JSON
//! file may override any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::loader::read_json;
use crate::data::Level;
use crate::error::{DashboardError, Result};

/// Monthly-payment loading applied to the base monthly premium (5.5%)
pub const DEFAULT_SURCHARGE_RATE: f64 = 0.055;

/// Youngest age with rated premiums
pub const DEFAULT_MIN_AGE: u8 = 25;

/// Oldest age with rated premiums
pub const DEFAULT_MAX_AGE: u8 = 70;

/// Display metadata for one classification level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: Level,
    pub label: String,
    pub description: String,
    /// Chart colour as a hex string
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Loading for monthly payment, as a decimal
    #[serde(default = "default_surcharge_rate")]
    pub surcharge_rate: f64,

    #[serde(default = "default_min_age")]
    pub min_age: u8,

    #[serde(default = "default_max_age")]
    pub max_age: u8,

    /// Years selected when filters are reset
    #[serde(default = "default_years")]
    pub default_years: Vec<u16>,

    #[serde(default = "default_levels")]
    pub levels: Vec<LevelInfo>,

    /// Relative tolerance for annual premium == frequency x severity
    #[serde(default = "default_premium_tolerance")]
    pub premium_tolerance: f64,

    /// Percentage points allowed between stored level shares and 100
    #[serde(default = "default_percentage_tolerance")]
    pub percentage_tolerance: f64,

    /// Frequencies above this are flagged as implausible
    #[serde(default = "default_max_plausible_frequency")]
    pub max_plausible_frequency: f64,
}

fn default_surcharge_rate() -> f64 { DEFAULT_SURCHARGE_RATE }
fn default_min_age() -> u8 { DEFAULT_MIN_AGE }
fn default_max_age() -> u8 { DEFAULT_MAX_AGE }
fn default_years() -> Vec<u16> { vec![2020, 2021, 2022, 2023, 2024] }
fn default_premium_tolerance() -> f64 { 1e-6 }
fn default_percentage_tolerance() -> f64 { 0.5 }
fn default_max_plausible_frequency() -> f64 { 0.5 }

fn default_levels() -> Vec<LevelInfo> {
    vec![
        LevelInfo {
            level: Level::Ambulatory,
            label: "Ambulatorio (L1)".to_string(),
            description: "Consultas, laboratorio, dental, prevención".to_string(),
            color: "#22c55e".to_string(),
        },
        LevelInfo {
            level: Level::Hospital,
            label: "Hospitalario (L2)".to_string(),
            description: "Cirugías programadas, hospitalizaciones ≤5 días".to_string(),
            color: "#eab308".to_string(),
        },
        LevelInfo {
            level: Level::HighSpecialty,
            label: "Alta Especialidad (L3)".to_string(),
            description: "Oncología, UCI, cardiovascular, trasplantes".to_string(),
            color: "#ef4444".to_string(),
        },
    ]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            surcharge_rate: default_surcharge_rate(),
            min_age: default_min_age(),
            max_age: default_max_age(),
            default_years: default_years(),
            levels: default_levels(),
            premium_tolerance: default_premium_tolerance(),
            percentage_tolerance: default_percentage_tolerance(),
            max_plausible_frequency: default_max_plausible_frequency(),
        }
    }
}

impl DashboardConfig {
    /// Load a configuration file, falling back to defaults for absent fields
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.surcharge_rate.is_finite() || self.surcharge_rate < 0.0 {
            return Err(DashboardError::invalid(
                "surcharge_rate",
                format!("must be a non-negative number, got {}", self.surcharge_rate),
            ));
        }
        if self.min_age >= self.max_age {
            return Err(DashboardError::invalid(
                "min_age",
                format!("{} must be below max_age {}", self.min_age, self.max_age),
            ));
        }
        if self.levels.is_empty() {
            return Err(DashboardError::invalid("levels", "at least one level is required"));
        }
        Ok(())
    }

    /// Ages covered by the premium catalog, inclusive
    pub fn ages(&self) -> std::ops::RangeInclusive<u8> {
        self.min_age..=self.max_age
    }

    pub fn age_in_range(&self, age: u8) -> bool {
        self.ages().contains(&age)
    }

    /// Configured levels in ascending order
    pub fn level_order(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.levels.iter().map(|l| l.level).collect();
        levels.sort();
        levels.dedup();
        levels
    }

    pub fn level_info(&self, level: Level) -> Option<&LevelInfo> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Display label for a level, falling back to its number
    pub fn label(&self, level: Level) -> String {
        self.level_info(level)
            .map(|l| l.label.clone())
            .unwrap_or_else(|| level.to_string())
    }
}
