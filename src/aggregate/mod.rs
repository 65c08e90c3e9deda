//! Summary metrics over filtered record sets
//!
//! Every reduction here is order-independent: counts are summed as integers
//! and amounts are summed in a canonical order, so any permutation of the
//! input yields bit-identical metrics.

mod claims;
mod policies;

pub use claims::{aggregate_claims, ClaimMetrics, LevelBreakdown};
pub use policies::{
    aggregate_policies, annual_evolution, insured_by_age, AgeInsured, AnnualEvolutionPoint,
    PolicyMetrics, SexBreakdown,
};

/// Sum amounts in ascending order so the result does not depend on input order
pub(crate) fn canonical_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

/// `part / total * 100`, zero when the total is zero
pub(crate) fn percentage_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// `total / count`, zero when the count is zero
pub(crate) fn mean(total: f64, count: u64) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}
