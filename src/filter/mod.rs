//! Filter state and the record predicate behind the explorer pages
//!
//! A record passes when every active constraint holds. Empty year or level
//! selections match nothing: clearing every checkbox shows an empty table.

mod causes;

pub use causes::search_causes;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::DashboardConfig;
use crate::data::{ClaimAggregate, Level, PolicyAggregate, Sex};
use crate::error::{DashboardError, Result};

/// Sex selector, `All` disables the constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SexFilter {
    #[default]
    #[serde(rename = "Todos", alias = "All")]
    All,
    #[serde(rename = "Masculino", alias = "Male")]
    Male,
    #[serde(rename = "Femenino", alias = "Female")]
    Female,
}

impl SexFilter {
    pub fn matches(&self, sex: Sex) -> bool {
        match self {
            SexFilter::All => true,
            SexFilter::Male => sex == Sex::Male,
            SexFilter::Female => sex == Sex::Female,
        }
    }
}

impl std::str::FromStr for SexFilter {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "todos" | "all" => Ok(SexFilter::All),
            other => match other.parse::<Sex>()? {
                Sex::Male => Ok(SexFilter::Male),
                Sex::Female => Ok(SexFilter::Female),
            },
        }
    }
}

/// Dimensions a record exposes to the filter
pub trait Filterable {
    fn year(&self) -> u16;
    fn age(&self) -> u8;
    fn sex(&self) -> Sex;

    /// Classification level, for record kinds that carry one
    fn level(&self) -> Option<Level> {
        None
    }

    /// Amount tested against the amount bounds, for record kinds that carry one
    fn amount(&self) -> Option<f64> {
        None
    }
}

impl Filterable for ClaimAggregate {
    fn year(&self) -> u16 { self.year }
    fn age(&self) -> u8 { self.age }
    fn sex(&self) -> Sex { self.sex }
    fn level(&self) -> Option<Level> { Some(self.level) }
    fn amount(&self) -> Option<f64> { Some(self.adjusted_amount) }
}

impl Filterable for PolicyAggregate {
    fn year(&self) -> u16 { self.year }
    fn age(&self) -> u8 { self.age }
    fn sex(&self) -> Sex { self.sex }
}

/// Current selection of the explorer filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub years: BTreeSet<u16>,
    pub age_min: u8,
    pub age_max: u8,
    pub sex: SexFilter,
    pub levels: BTreeSet<Level>,
    /// Lower amount bound, inclusive
    #[serde(default)]
    pub amount_min: Option<f64>,
    /// Upper amount bound, inclusive
    #[serde(default)]
    pub amount_max: Option<f64>,
}

impl FilterState {
    /// Reset selection: every default year and level, full age range, both sexes
    pub fn default_for(config: &DashboardConfig) -> Self {
        Self {
            years: config.default_years.iter().copied().collect(),
            age_min: config.min_age,
            age_max: config.max_age,
            sex: SexFilter::All,
            levels: config.level_order().into_iter().collect(),
            amount_min: None,
            amount_max: None,
        }
    }

    pub fn reset(&mut self, config: &DashboardConfig) {
        *self = Self::default_for(config);
    }

    /// Checkbox behaviour: add the year if absent, remove it if present
    pub fn toggle_year(&mut self, year: u16) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    pub fn toggle_level(&mut self, level: Level) {
        if !self.levels.remove(&level) {
            self.levels.insert(level);
        }
    }

    /// Reject selections outside the documented domain
    pub fn validate(&self, config: &DashboardConfig) -> Result<()> {
        if self.age_min >= self.age_max {
            return Err(DashboardError::invalid(
                "age_min",
                format!("{} must be below age_max {}", self.age_min, self.age_max),
            ));
        }
        if !config.age_in_range(self.age_min) || !config.age_in_range(self.age_max) {
            return Err(DashboardError::invalid(
                "age",
                format!(
                    "{}-{} outside {}-{}",
                    self.age_min, self.age_max, config.min_age, config.max_age
                ),
            ));
        }
        for (field, bound) in [("amount_min", self.amount_min), ("amount_max", self.amount_max)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(DashboardError::invalid(
                        field,
                        format!("must be a non-negative number, got {value}"),
                    ));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.amount_min, self.amount_max) {
            if min > max {
                return Err(DashboardError::invalid(
                    "amount_min",
                    format!("{min} exceeds amount_max {max}"),
                ));
            }
        }
        let known = config.level_order();
        if let Some(level) = self.levels.iter().find(|l| !known.contains(l)) {
            return Err(DashboardError::invalid(
                "levels",
                format!("level {} is not configured", level.number()),
            ));
        }
        Ok(())
    }

    /// Whether a record satisfies every constraint
    pub fn passes<R: Filterable>(&self, record: &R) -> bool {
        if !self.years.contains(&record.year()) {
            return false;
        }
        let age = record.age();
        if age < self.age_min || age > self.age_max {
            return false;
        }
        if !self.sex.matches(record.sex()) {
            return false;
        }
        if let Some(level) = record.level() {
            if !self.levels.contains(&level) {
                return false;
            }
        }
        if let Some(amount) = record.amount() {
            if self.amount_min.is_some_and(|min| amount < min) {
                return false;
            }
            if self.amount_max.is_some_and(|max| amount > max) {
                return false;
            }
        }
        true
    }

    /// Passing subset, in input order
    pub fn apply<'a, R: Filterable>(&self, records: &'a [R]) -> Vec<&'a R> {
        let selected: Vec<&R> = records.iter().filter(|r| self.passes(*r)).collect();
        debug!("Filter kept {} of {} records", selected.len(), records.len());
        selected
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::default_for(&DashboardConfig::default())
    }
}

/// Free-function form of [`FilterState::passes`]
pub fn passes<R: Filterable>(record: &R, filter: &FilterState) -> bool {
    filter.passes(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(year: u16, age: u8, sex: Sex, level: Level, amount: f64) -> ClaimAggregate {
        ClaimAggregate {
            year,
            age,
            sex,
            level,
            claim_count: 2,
            raw_amount: amount,
            adjusted_amount: amount,
            severity: amount / 2.0,
        }
    }

    fn fixture() -> Vec<ClaimAggregate> {
        vec![
            claim(2020, 25, Sex::Male, Level::Ambulatory, 10_000.0),
            claim(2021, 30, Sex::Female, Level::Hospital, 80_000.0),
            claim(2020, 35, Sex::Female, Level::HighSpecialty, 400_000.0),
            claim(2022, 40, Sex::Male, Level::Ambulatory, 12_000.0),
            claim(2020, 45, Sex::Male, Level::Hospital, 95_000.0),
            claim(2023, 50, Sex::Female, Level::Ambulatory, 15_000.0),
            claim(2024, 55, Sex::Male, Level::HighSpecialty, 600_000.0),
            claim(2020, 60, Sex::Female, Level::Ambulatory, 20_000.0),
            claim(2021, 65, Sex::Male, Level::Hospital, 110_000.0),
            claim(2024, 70, Sex::Female, Level::HighSpecialty, 750_000.0),
        ]
    }

    fn policy(year: u16, age: u8, sex: Sex) -> PolicyAggregate {
        PolicyAggregate {
            year,
            age,
            sex,
            insured_count: 100,
            issued_premium: 1_000_000.0,
            sum_insured: 50_000_000.0,
            average_premium: 10_000.0,
        }
    }

    #[test]
    fn test_default_passes_everything_in_range() {
        let filter = FilterState::default();
        assert_eq!(filter.apply(&fixture()).len(), 10);
    }

    #[test]
    fn test_single_year() {
        let mut filter = FilterState::default();
        filter.years = BTreeSet::from([2020]);
        let records = fixture();
        let selected = filter.apply(&records);
        assert_eq!(selected.len(), 4);
        assert!(selected.iter().all(|r| r.year == 2020));

        let pair = vec![
            claim(2020, 30, Sex::Male, Level::Ambulatory, 1.0),
            claim(2021, 30, Sex::Male, Level::Ambulatory, 1.0),
        ];
        assert_eq!(filter.apply(&pair).len(), 1);
    }

    #[test]
    fn test_empty_sets_match_nothing() {
        let records = fixture();

        let mut filter = FilterState::default();
        filter.years.clear();
        assert!(filter.apply(&records).is_empty());

        let mut filter = FilterState::default();
        filter.levels.clear();
        assert!(filter.apply(&records).is_empty());

        // Policies carry no level, so only the year set applies to them
        let policies = vec![policy(2020, 40, Sex::Male)];
        assert_eq!(filter.apply(&policies).len(), 1);
    }

    #[test]
    fn test_age_bounds_inclusive() {
        let mut filter = FilterState::default();
        filter.age_min = 30;
        filter.age_max = 40;
        let records = fixture();
        let ages: Vec<u8> = filter.apply(&records).iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![30, 35, 40]);
    }

    #[test]
    fn test_sex_and_level() {
        let mut filter = FilterState::default();
        filter.sex = SexFilter::Female;
        filter.levels = BTreeSet::from([Level::HighSpecialty]);
        let records = fixture();
        let selected = filter.apply(&records);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.sex == Sex::Female && r.level == Level::HighSpecialty));
    }

    #[test]
    fn test_amount_bounds() {
        let mut filter = FilterState::default();
        filter.amount_min = Some(80_000.0);
        filter.amount_max = Some(400_000.0);
        let records = fixture();
        let amounts: Vec<f64> = filter.apply(&records).iter().map(|r| r.adjusted_amount).collect();
        assert_eq!(amounts, vec![80_000.0, 400_000.0, 95_000.0, 110_000.0]);

        // Amount bounds do not apply to policies
        assert!(filter.passes(&policy(2021, 50, Sex::Female)));
    }

    #[test]
    fn test_toggle_and_reset() {
        let config = DashboardConfig::default();
        let mut filter = FilterState::default_for(&config);
        filter.toggle_year(2022);
        assert!(!filter.years.contains(&2022));
        filter.toggle_year(2022);
        assert!(filter.years.contains(&2022));
        filter.toggle_level(Level::Hospital);
        assert_eq!(filter.levels.len(), 2);
        filter.sex = SexFilter::Male;

        filter.reset(&config);
        assert_eq!(filter, FilterState::default_for(&config));
    }

    #[test]
    fn test_validate() {
        let config = DashboardConfig::default();
        assert!(FilterState::default().validate(&config).is_ok());

        let mut filter = FilterState::default();
        filter.age_min = 40;
        filter.age_max = 40;
        assert!(filter.validate(&config).is_err());

        let mut filter = FilterState::default();
        filter.age_max = 80;
        assert!(filter.validate(&config).is_err());

        let mut filter = FilterState::default();
        filter.amount_min = Some(f64::NAN);
        assert!(filter.validate(&config).is_err());

        let mut filter = FilterState::default();
        filter.amount_min = Some(10.0);
        filter.amount_max = Some(5.0);
        assert!(filter.validate(&config).is_err());
    }

    #[test]
    fn test_sex_filter_parse() {
        assert_eq!("Todos".parse::<SexFilter>().unwrap(), SexFilter::All);
        assert_eq!("female".parse::<SexFilter>().unwrap(), SexFilter::Female);
        assert!("x".parse::<SexFilter>().is_err());
    }
}
