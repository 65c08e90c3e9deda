//! Dashboard session over a loaded snapshot
//!
//! Loads the datasets once, then recomputes each page's view from a filter
//! state or an age. Nothing here mutates the data; every view is a pure
//! function of (snapshot, config, input).

use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;

use crate::aggregate::{
    aggregate_claims, aggregate_policies, annual_evolution, insured_by_age, AgeInsured,
    AnnualEvolutionPoint, ClaimMetrics, PolicyMetrics,
};
use crate::config::DashboardConfig;
use crate::data::{
    ClaimAggregate, ClassifiedCause, DataSnapshot, GeneralSummary, PolicyAggregate,
    PolicyByAgeBand,
};
use crate::error::Result;
use crate::filter::{search_causes, FilterState};
use crate::premium::{
    age_curves, premium_for, premium_schedule, AgeCurvePoint, CatalogReport, PremiumCatalog,
    PremiumQuote,
};

/// Stored severities are rounded to whole pesos upstream
const SEVERITY_TOLERANCE: f64 = 1.0;

/// Claims explorer: filtered rows and their metrics
#[derive(Debug, Clone, Serialize)]
pub struct ClaimsView<'a> {
    pub records: Vec<&'a ClaimAggregate>,
    pub metrics: ClaimMetrics,
}

/// Policy explorer: filtered rows, metrics and chart series
#[derive(Debug, Clone, Serialize)]
pub struct PoliciesView<'a> {
    pub records: Vec<&'a PolicyAggregate>,
    pub metrics: PolicyMetrics,
    pub by_age: Vec<AgeInsured>,
    pub evolution: Vec<AnnualEvolutionPoint>,
    pub age_bands: &'a [PolicyByAgeBand],
}

/// Consistency findings across the loaded snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataReport {
    pub catalog: CatalogReport,
    /// Claim rows whose stored severity disagrees with amount / count
    pub severity_mismatches: usize,
    /// Problem with the summary's level shares, if any
    pub summary_error: Option<String>,
}

impl DataReport {
    pub fn is_clean(&self) -> bool {
        self.catalog.is_clean() && self.severity_mismatches == 0 && self.summary_error.is_none()
    }
}

/// Read-only session over one snapshot
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    snapshot: DataSnapshot,
    catalog: PremiumCatalog,
}

impl Dashboard {
    /// Build a session; the premium rows are indexed once here
    pub fn new(snapshot: DataSnapshot, config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let catalog = PremiumCatalog::from_rows(snapshot.premiums.clone())?;
        Ok(Self {
            config,
            snapshot,
            catalog,
        })
    }

    /// Load every dataset from `dir`
    pub fn from_data_dir(dir: &Path, config: DashboardConfig) -> Result<Self> {
        Self::new(DataSnapshot::load_from(dir)?, config)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &DataSnapshot {
        &self.snapshot
    }

    pub fn catalog(&self) -> &PremiumCatalog {
        &self.catalog
    }

    pub fn summary(&self) -> Option<&GeneralSummary> {
        self.snapshot.summary.as_ref()
    }

    /// Filter selection the explorer pages start from
    pub fn default_filter(&self) -> FilterState {
        FilterState::default_for(&self.config)
    }

    pub fn claims_view(&self, filter: &FilterState) -> Result<ClaimsView<'_>> {
        filter.validate(&self.config)?;
        let records = filter.apply(&self.snapshot.claims);
        let metrics = aggregate_claims(records.iter().copied(), &self.config.level_order());
        debug!(
            "Claims view: {} rows, {} claims",
            records.len(),
            metrics.total_claims
        );
        Ok(ClaimsView { records, metrics })
    }

    pub fn policies_view(&self, filter: &FilterState) -> Result<PoliciesView<'_>> {
        filter.validate(&self.config)?;
        let records = filter.apply(&self.snapshot.policies);
        let metrics = aggregate_policies(records.iter().copied());
        let by_age = insured_by_age(records.iter().copied(), self.config.ages());
        let evolution = annual_evolution(&self.snapshot.annual_policies, &filter.years);
        Ok(PoliciesView {
            records,
            metrics,
            by_age,
            evolution,
            age_bands: &self.snapshot.age_bands,
        })
    }

    /// Rate calculator quote for one age
    pub fn quote(&self, age: u8) -> Result<PremiumQuote> {
        premium_for(age, &self.catalog, &self.config)
    }

    pub fn schedule(&self) -> Vec<PremiumQuote> {
        premium_schedule(&self.catalog, &self.config)
    }

    pub fn age_curves(&self) -> Vec<AgeCurvePoint> {
        age_curves(&self.catalog, &self.config)
    }

    /// Cause search, restricted to the filter's levels
    pub fn causes(&self, query: &str, filter: &FilterState, limit: usize) -> Vec<&ClassifiedCause> {
        search_causes(&self.snapshot.causes, query, Some(&filter.levels), limit)
    }

    /// Check the snapshot's invariants
    pub fn validate(&self) -> DataReport {
        let catalog = self.catalog.validate(&self.config);

        let severity_mismatches = self
            .snapshot
            .claims
            .iter()
            .filter(|c| (c.severity - c.derived_severity()).abs() > SEVERITY_TOLERANCE)
            .count();
        if severity_mismatches > 0 {
            warn!("{severity_mismatches} claim rows have inconsistent severity");
        }

        let summary_error = self.summary().and_then(|s| {
            s.check_distribution(self.config.percentage_tolerance)
                .err()
                .map(|e| e.to_string())
        });

        let report = DataReport {
            catalog,
            severity_mismatches,
            summary_error,
        };
        info!(
            "Validation finished: {} catalog issues, {} severity mismatches",
            report.catalog.issues.len(),
            report.severity_mismatches
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Level;
    use crate::error::DashboardError;
    use crate::filter::SexFilter;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    fn dashboard() -> Dashboard {
        Dashboard::from_data_dir(Path::new("data"), DashboardConfig::default())
            .expect("Failed to load bundled data")
    }

    #[test]
    fn test_bundled_data_is_consistent() {
        let report = dashboard().validate();
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_claims_view_year_filter() {
        let dash = dashboard();
        let mut filter = dash.default_filter();
        filter.years = BTreeSet::from([2020]);

        let view = dash.claims_view(&filter).unwrap();
        let expected = dash.snapshot().claims.iter().filter(|c| c.year == 2020).count();
        assert_eq!(view.records.len(), expected);
        assert!(view.records.iter().all(|c| c.year == 2020));

        let sum: f64 = view.metrics.by_level.iter().map(|b| b.percentage).sum();
        assert_relative_eq!(sum, 100.0, max_relative = 1e-6);
    }

    #[test]
    fn test_claims_view_rejects_bad_filter() {
        let dash = dashboard();
        let mut filter = dash.default_filter();
        filter.age_min = 60;
        filter.age_max = 30;
        assert!(matches!(
            dash.claims_view(&filter),
            Err(DashboardError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_policies_view() {
        let dash = dashboard();
        let mut filter = dash.default_filter();
        filter.sex = SexFilter::Female;

        let view = dash.policies_view(&filter).unwrap();
        assert!(!view.records.is_empty());
        assert_eq!(view.metrics.by_sex[0].insured, 0);
        assert_relative_eq!(view.metrics.by_sex[1].percentage, 100.0);
        assert_eq!(view.by_age.len(), 46);
        assert_eq!(view.evolution.len(), 5);
    }

    #[test]
    fn test_quote_matches_catalog() {
        let dash = dashboard();
        for age in dash.config().ages() {
            let quote = dash.quote(age).unwrap();
            assert!(quote.by_level.iter().all(|p| p.found));
            for p in &quote.by_level {
                assert_relative_eq!(
                    p.annual_premium,
                    p.frequency * p.severity,
                    max_relative = 1e-6
                );
            }
        }
        assert!(dash.quote(71).is_err());
    }

    #[test]
    fn test_causes_follow_level_filter() {
        let dash = dashboard();
        let mut filter = dash.default_filter();
        filter.levels = BTreeSet::from([Level::HighSpecialty]);
        let hits = dash.causes("", &filter, 50);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|c| c.level == Level::HighSpecialty));
    }
}
