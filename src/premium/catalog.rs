//! Premium catalog indexed by (level, age) and its consistency checks

use log::warn;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::DashboardConfig;
use crate::data::{Level, PremiumByLevelAge};
use crate::error::{DashboardError, Result};

/// Anything that can answer a (level, age) premium lookup
pub trait PremiumSource {
    fn lookup(&self, level: Level, age: u8) -> Option<&PremiumByLevelAge>;
}

/// Plain row lists are searched linearly, first match wins
impl PremiumSource for [PremiumByLevelAge] {
    fn lookup(&self, level: Level, age: u8) -> Option<&PremiumByLevelAge> {
        self.iter().find(|p| p.level == level && p.age == age)
    }
}

impl PremiumSource for Vec<PremiumByLevelAge> {
    fn lookup(&self, level: Level, age: u8) -> Option<&PremiumByLevelAge> {
        self.as_slice().lookup(level, age)
    }
}

/// Precomputed premiums with one row per (level, age)
#[derive(Debug, Clone, Default)]
pub struct PremiumCatalog {
    rows: HashMap<(Level, u8), PremiumByLevelAge>,
}

impl PremiumCatalog {
    /// Index rows, rejecting a second row for the same cell
    pub fn from_rows(rows: Vec<PremiumByLevelAge>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for row in rows {
            let key = (row.level, row.age);
            if index.insert(key, row).is_some() {
                return Err(DashboardError::DuplicateCatalogRow {
                    level: key.0.number(),
                    age: key.1,
                });
            }
        }
        Ok(Self { rows: index })
    }

    pub fn get(&self, level: Level, age: u8) -> Option<&PremiumByLevelAge> {
        self.rows.get(&(level, age))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows sorted by age, then level
    pub fn rows(&self) -> Vec<&PremiumByLevelAge> {
        let mut rows: Vec<&PremiumByLevelAge> = self.rows.values().collect();
        rows.sort_by_key(|r| (r.age, r.level));
        rows
    }

    /// Check the catalog against the full level x age grid and its invariants
    pub fn validate(&self, config: &DashboardConfig) -> CatalogReport {
        let mut issues = Vec::new();

        for age in config.ages() {
            for level in config.level_order() {
                if self.get(level, age).is_none() {
                    issues.push(CatalogIssue::Missing { level, age });
                }
            }
        }

        for row in self.rows() {
            let (level, age) = (row.level, row.age);

            if !config.age_in_range(age) {
                issues.push(CatalogIssue::AgeOutOfRange { level, age });
            }

            let values = [row.frequency, row.severity, row.annual_premium, row.monthly_premium];
            if values.iter().any(|v| !v.is_finite()) {
                issues.push(CatalogIssue::NonFinite { level, age });
                continue;
            }

            let frequency = row.frequency;
            if !(0.0..=1.0).contains(&frequency) {
                issues.push(CatalogIssue::FrequencyOutOfRange { level, age, frequency });
            } else if frequency > config.max_plausible_frequency {
                issues.push(CatalogIssue::ImplausibleFrequency { level, age, frequency });
            }

            if row.severity < 0.0 {
                issues.push(CatalogIssue::NegativeSeverity { level, age, severity: row.severity });
            }

            let expected = row.frequency * row.severity;
            let scale = expected.abs().max(row.annual_premium.abs());
            if (row.annual_premium - expected).abs() > config.premium_tolerance * scale {
                issues.push(CatalogIssue::PremiumMismatch {
                    level,
                    age,
                    expected,
                    actual: row.annual_premium,
                });
            }
        }

        for issue in &issues {
            warn!("Premium catalog: {}", issue);
        }

        CatalogReport { issues }
    }
}

impl PremiumSource for PremiumCatalog {
    fn lookup(&self, level: Level, age: u8) -> Option<&PremiumByLevelAge> {
        self.get(level, age)
    }
}

/// A single finding from [`PremiumCatalog::validate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogIssue {
    Missing { level: Level, age: u8 },
    AgeOutOfRange { level: Level, age: u8 },
    NonFinite { level: Level, age: u8 },
    FrequencyOutOfRange { level: Level, age: u8, frequency: f64 },
    ImplausibleFrequency { level: Level, age: u8, frequency: f64 },
    NegativeSeverity { level: Level, age: u8, severity: f64 },
    PremiumMismatch { level: Level, age: u8, expected: f64, actual: f64 },
}

impl CatalogIssue {
    /// Implausible frequencies and missing cells are warnings; the rest break invariants
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            CatalogIssue::ImplausibleFrequency { .. } | CatalogIssue::Missing { .. }
        )
    }
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogIssue::Missing { level, age } => write!(f, "no row for {level}, age {age}"),
            CatalogIssue::AgeOutOfRange { level, age } => {
                write!(f, "{level}, age {age} is outside the rated ages")
            }
            CatalogIssue::NonFinite { level, age } => {
                write!(f, "{level}, age {age} has a non-finite value")
            }
            CatalogIssue::FrequencyOutOfRange { level, age, frequency } => {
                write!(f, "{level}, age {age}: frequency {frequency} outside [0, 1]")
            }
            CatalogIssue::ImplausibleFrequency { level, age, frequency } => {
                write!(f, "{level}, age {age}: frequency {frequency} above plausible maximum")
            }
            CatalogIssue::NegativeSeverity { level, age, severity } => {
                write!(f, "{level}, age {age}: negative severity {severity}")
            }
            CatalogIssue::PremiumMismatch { level, age, expected, actual } => write!(
                f,
                "{level}, age {age}: annual premium {actual} != frequency x severity {expected}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogReport {
    pub issues: Vec<CatalogIssue>,
}

impl CatalogReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(CatalogIssue::is_error)
    }
}
