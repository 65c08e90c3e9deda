//! GMM Dashboard - claims, portfolio and risk-premium views for Major Medical Expense insurance
//!
//! This library provides:
//! - Loading of the static JSON snapshot (claims, policies, premium catalog, summary)
//! - Filter predicates for the claims and policy explorers
//! - Order-independent aggregation of filtered selections
//! - The rate calculator (risk premium by age, monthly surcharge)
//! - es-MX / MXN display formatting

pub mod error;
pub mod config;
pub mod data;
pub mod filter;
pub mod aggregate;
pub mod premium;
pub mod format;
pub mod dashboard;

// Re-export commonly used types
pub use error::{DashboardError, Result};
pub use config::DashboardConfig;
pub use data::{ClaimAggregate, DataSnapshot, Level, PolicyAggregate, PremiumByLevelAge, Sex};
pub use filter::{FilterState, SexFilter};
pub use premium::{premium_for, PaymentMode, PremiumCatalog, PremiumQuote};
pub use dashboard::Dashboard;
