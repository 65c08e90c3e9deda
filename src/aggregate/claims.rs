//! Claim totals and the per-level distribution card

use serde::Serialize;
use std::collections::BTreeMap;

use super::{canonical_sum, mean, percentage_of};
use crate::data::{ClaimAggregate, Level};

/// Claims and amount attributed to one level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelBreakdown {
    pub level: Level,
    pub claims: u64,
    pub amount: f64,
    /// Share of total claims, in percent
    pub percentage: f64,
    /// Share of total adjusted amount, in percent
    pub amount_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimMetrics {
    pub total_claims: u64,
    /// Sum of inflation-adjusted amounts
    pub total_amount: f64,
    /// Average amount per claim, 0 for an empty selection
    pub average_amount: f64,
    pub by_level: Vec<LevelBreakdown>,
}

impl ClaimMetrics {
    pub fn level(&self, level: Level) -> Option<&LevelBreakdown> {
        self.by_level.iter().find(|b| b.level == level)
    }
}

/// Reduce claim rows into totals and a per-level breakdown
///
/// `levels` are always reported (with zeros when absent); levels found in the
/// input but not listed are appended so the shares still cover every claim.
/// Rows come out in ascending level order.
pub fn aggregate_claims<'a, I>(records: I, levels: &[Level]) -> ClaimMetrics
where
    I: IntoIterator<Item = &'a ClaimAggregate>,
{
    let mut per_level: BTreeMap<Level, (u64, Vec<f64>)> =
        levels.iter().map(|&l| (l, (0, Vec::new()))).collect();

    for record in records {
        let entry = per_level.entry(record.level).or_default();
        entry.0 += record.claim_count;
        entry.1.push(record.adjusted_amount);
    }

    let level_amounts: Vec<(Level, u64, f64)> = per_level
        .into_iter()
        .map(|(level, (claims, amounts))| (level, claims, canonical_sum(amounts)))
        .collect();

    let total_claims: u64 = level_amounts.iter().map(|(_, c, _)| c).sum();
    let total_amount = canonical_sum(level_amounts.iter().map(|(_, _, a)| *a));

    let by_level = level_amounts
        .into_iter()
        .map(|(level, claims, amount)| LevelBreakdown {
            level,
            claims,
            amount,
            percentage: percentage_of(claims as f64, total_claims as f64),
            amount_percentage: percentage_of(amount, total_amount),
        })
        .collect();

    ClaimMetrics {
        total_claims,
        total_amount,
        average_amount: mean(total_amount, total_claims),
        by_level,
    }
}
