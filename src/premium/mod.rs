//! Premium catalog, rate calculator and age curves

mod catalog;
mod calculator;
mod curves;

pub use catalog::{CatalogIssue, CatalogReport, PremiumCatalog, PremiumSource};
pub use calculator::{premium_for, premium_schedule, LevelPremium, PaymentMode, PremiumQuote};
pub use curves::{age_curves, AgeCurvePoint, LevelCurvePoint};
