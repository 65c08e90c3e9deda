//! Rate calculator: risk premium for an applicant's age
//!
//! Frequencies and severities are never recomputed here; the catalog is the
//! only source. A missing (level, age) cell contributes zero.

use log::debug;
use serde::{Deserialize, Serialize};

use super::PremiumSource;
use crate::aggregate::percentage_of;
use crate::config::DashboardConfig;
use crate::data::Level;
use crate::error::{DashboardError, Result};

/// How the premium is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// One annual payment, no loading
    #[default]
    #[serde(alias = "anual")]
    Annual,
    /// Twelve payments with the monthly surcharge
    #[serde(alias = "mensual")]
    Monthly,
}

impl std::str::FromStr for PaymentMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "anual" => Ok(PaymentMode::Annual),
            "monthly" | "mensual" => Ok(PaymentMode::Monthly),
            other => Err(DashboardError::invalid(
                "payment_mode",
                format!("expected annual or monthly, got '{other}'"),
            )),
        }
    }
}

/// Premium components for one level at the quoted age
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelPremium {
    pub level: Level,
    pub frequency: f64,
    pub severity: f64,
    pub annual_premium: f64,
    /// annual / 12 x (1 + surcharge)
    pub monthly_with_surcharge: f64,
    /// Percent of the quote's total annual premium
    pub share: f64,
    /// False when the catalog had no row and zeros were substituted
    pub found: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumQuote {
    pub age: u8,
    pub by_level: Vec<LevelPremium>,
    /// Sum of the per-level annual premiums
    pub total_annual: f64,
    pub monthly_base: f64,
    pub monthly_with_surcharge: f64,
    /// monthly_with_surcharge - monthly_base
    pub surcharge_amount: f64,
    pub surcharge_rate: f64,
}

impl PremiumQuote {
    /// Amount charged per payment under the given mode
    pub fn amount_due(&self, mode: PaymentMode) -> f64 {
        match mode {
            PaymentMode::Annual => self.total_annual,
            PaymentMode::Monthly => self.monthly_with_surcharge,
        }
    }

    /// Per-level amount charged per payment under the given mode
    pub fn level_amount(&self, level: Level, mode: PaymentMode) -> f64 {
        self.by_level
            .iter()
            .find(|p| p.level == level)
            .map(|p| match mode {
                PaymentMode::Annual => p.annual_premium,
                PaymentMode::Monthly => p.monthly_with_surcharge,
            })
            .unwrap_or(0.0)
    }
}

/// Quote the risk premium for `age` across every configured level
///
/// Ages outside the configured range are rejected rather than clamped, the
/// catalog holds nothing there.
pub fn premium_for<S>(age: u8, catalog: &S, config: &DashboardConfig) -> Result<PremiumQuote>
where
    S: PremiumSource + ?Sized,
{
    if !config.age_in_range(age) {
        return Err(DashboardError::invalid(
            "age",
            format!("{age} outside {}-{}", config.min_age, config.max_age),
        ));
    }

    let loading = 1.0 + config.surcharge_rate;

    let mut by_level: Vec<LevelPremium> = config
        .level_order()
        .into_iter()
        .map(|level| match catalog.lookup(level, age) {
            Some(row) => LevelPremium {
                level,
                frequency: row.frequency,
                severity: row.severity,
                annual_premium: row.annual_premium,
                monthly_with_surcharge: row.annual_premium / 12.0 * loading,
                share: 0.0,
                found: true,
            },
            None => {
                debug!("No premium row for {level}, age {age}; using zero");
                LevelPremium {
                    level,
                    frequency: 0.0,
                    severity: 0.0,
                    annual_premium: 0.0,
                    monthly_with_surcharge: 0.0,
                    share: 0.0,
                    found: false,
                }
            }
        })
        .collect();

    let total_annual: f64 = by_level.iter().map(|p| p.annual_premium).sum();
    for p in &mut by_level {
        p.share = percentage_of(p.annual_premium, total_annual);
    }
    let monthly_base = total_annual / 12.0;
    let monthly_with_surcharge = monthly_base * loading;

    Ok(PremiumQuote {
        age,
        by_level,
        total_annual,
        monthly_base,
        monthly_with_surcharge,
        surcharge_amount: monthly_with_surcharge - monthly_base,
        surcharge_rate: config.surcharge_rate,
    })
}

/// Quotes for every configured age, youngest first
pub fn premium_schedule<S>(catalog: &S, config: &DashboardConfig) -> Vec<PremiumQuote>
where
    S: PremiumSource + ?Sized,
{
    config
        .ages()
        .filter_map(|age| premium_for(age, catalog, config).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PremiumByLevelAge;
    use crate::premium::PremiumCatalog;
    use approx::assert_relative_eq;

    fn row(level: Level, age: u8, frequency: f64, severity: f64) -> PremiumByLevelAge {
        PremiumByLevelAge {
            level,
            age,
            frequency,
            severity,
            annual_premium: frequency * severity,
            monthly_premium: 0.0,
            description: String::new(),
        }
    }

    fn catalog() -> PremiumCatalog {
        let mut rows = Vec::new();
        for age in 25..=70u8 {
            let a = age as f64;
            rows.push(row(Level::Ambulatory, age, 0.20 + a / 1000.0, 3_000.0 + 20.0 * a));
            rows.push(row(Level::Hospital, age, 0.02 + a / 10_000.0, 60_000.0 + 300.0 * a));
            rows.push(row(
                Level::HighSpecialty,
                age,
                0.002 + a / 100_000.0,
                250_000.0 + 2_000.0 * a,
            ));
        }
        PremiumCatalog::from_rows(rows).unwrap()
    }

    #[test]
    fn test_quote_identities_for_every_age() {
        let config = DashboardConfig::default();
        let catalog = catalog();

        for age in 25..=70u8 {
            let quote = premium_for(age, &catalog, &config).unwrap();
            assert_eq!(quote.by_level.len(), 3);

            for p in &quote.by_level {
                assert_relative_eq!(
                    p.annual_premium,
                    p.frequency * p.severity,
                    max_relative = 1e-6
                );
            }

            let expected: f64 = quote.by_level.iter().map(|p| p.annual_premium).sum();
            assert_eq!(quote.total_annual, expected);
            assert_relative_eq!(quote.monthly_base, quote.total_annual / 12.0);
            assert_relative_eq!(
                quote.monthly_with_surcharge,
                quote.total_annual / 12.0 * 1.055,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                quote.surcharge_amount,
                quote.monthly_base * 0.055,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_out_of_range_age_rejected() {
        let config = DashboardConfig::default();
        let catalog = catalog();
        for age in [0, 24, 71, 120] {
            let err = premium_for(age, &catalog, &config).unwrap_err();
            assert!(matches!(err, DashboardError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_missing_row_contributes_zero() {
        let config = DashboardConfig::default();
        let rows = vec![row(Level::Hospital, 40, 0.05, 100_000.0)];
        let quote = premium_for(40, &rows, &config).unwrap();

        let l1 = &quote.by_level[0];
        assert!(!l1.found);
        assert_eq!((l1.frequency, l1.severity, l1.annual_premium), (0.0, 0.0, 0.0));
        assert!(quote.by_level[1].found);
        assert_relative_eq!(quote.total_annual, 5_000.0);
    }

    #[test]
    fn test_level_shares() {
        let config = DashboardConfig::default();
        let quote = premium_for(52, &catalog(), &config).unwrap();
        let total: f64 = quote.by_level.iter().map(|p| p.share).sum();
        assert_relative_eq!(total, 100.0, max_relative = 1e-9);
        for p in &quote.by_level {
            assert_relative_eq!(p.share, p.annual_premium / quote.total_annual * 100.0);
        }

        let rows = vec![row(Level::Hospital, 40, 0.05, 100_000.0)];
        let quote = premium_for(40, &rows, &config).unwrap();
        assert_eq!(quote.by_level[0].share, 0.0);
        assert_relative_eq!(quote.by_level[1].share, 100.0);
    }

    #[test]
    fn test_empty_catalog_quotes_zero() {
        let config = DashboardConfig::default();
        let quote = premium_for(30, &PremiumCatalog::default(), &config).unwrap();
        assert_eq!(quote.total_annual, 0.0);
        assert_eq!(quote.monthly_with_surcharge, 0.0);
        assert!(quote.by_level.iter().all(|p| !p.found && p.share == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let config = DashboardConfig::default();
        let catalog = catalog();
        let a = premium_for(47, &catalog, &config).unwrap();
        let b = premium_for(47, &catalog, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.total_annual.to_bits(), b.total_annual.to_bits());
        assert_eq!(a.monthly_with_surcharge.to_bits(), b.monthly_with_surcharge.to_bits());
    }

    #[test]
    fn test_surcharge_is_injected() {
        let config = DashboardConfig {
            surcharge_rate: 0.10,
            ..DashboardConfig::default()
        };
        let quote = premium_for(35, &catalog(), &config).unwrap();
        assert_relative_eq!(quote.monthly_with_surcharge, quote.monthly_base * 1.10);
    }

    #[test]
    fn test_payment_modes() {
        let config = DashboardConfig::default();
        let quote = premium_for(35, &catalog(), &config).unwrap();
        assert_eq!(quote.amount_due(PaymentMode::Annual), quote.total_annual);
        assert_eq!(quote.amount_due(PaymentMode::Monthly), quote.monthly_with_surcharge);
        assert_relative_eq!(
            quote.level_amount(Level::Hospital, PaymentMode::Monthly),
            quote.by_level[1].annual_premium / 12.0 * 1.055
        );
        assert_eq!("mensual".parse::<PaymentMode>().unwrap(), PaymentMode::Monthly);
        assert!("weekly".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_schedule_covers_all_ages() {
        let schedule = premium_schedule(&catalog(), &DashboardConfig::default());
        assert_eq!(schedule.len(), 46);
        assert_eq!(schedule.first().map(|q| q.age), Some(25));
        assert_eq!(schedule.last().map(|q| q.age), Some(70));
    }
}
