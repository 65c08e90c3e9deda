//! Portfolio metrics for the policy explorer

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{canonical_sum, mean, percentage_of};
use crate::data::{AnnualPolicySummary, PolicyAggregate, Sex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexBreakdown {
    pub sex: Sex,
    pub insured: u64,
    /// Share of total insured, in percent
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyMetrics {
    pub total_insured: u64,
    pub total_premium: f64,
    /// Issued premium per insured, 0 for an empty selection
    pub average_premium: f64,
    pub by_sex: Vec<SexBreakdown>,
}

pub fn aggregate_policies<'a, I>(records: I) -> PolicyMetrics
where
    I: IntoIterator<Item = &'a PolicyAggregate>,
{
    let (mut male, mut female) = (0u64, 0u64);
    let mut premiums = Vec::new();

    for record in records {
        match record.sex {
            Sex::Male => male += record.insured_count,
            Sex::Female => female += record.insured_count,
        }
        premiums.push(record.issued_premium);
    }

    let total_insured = male + female;
    let total_premium = canonical_sum(premiums);

    let by_sex = [(Sex::Male, male), (Sex::Female, female)]
        .into_iter()
        .map(|(sex, insured)| SexBreakdown {
            sex,
            insured,
            percentage: percentage_of(insured as f64, total_insured as f64),
        })
        .collect();

    PolicyMetrics {
        total_insured,
        total_premium,
        average_premium: mean(total_premium, total_insured),
        by_sex,
    }
}

/// Insured counts for one age, split by sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeInsured {
    pub age: u8,
    pub male: u64,
    pub female: u64,
    pub total: u64,
}

/// One point per age in `ages`, zero where the selection has no rows
pub fn insured_by_age<'a, I>(records: I, ages: std::ops::RangeInclusive<u8>) -> Vec<AgeInsured>
where
    I: IntoIterator<Item = &'a PolicyAggregate>,
{
    let mut by_age: BTreeMap<u8, (u64, u64)> = ages.map(|a| (a, (0, 0))).collect();
    for record in records {
        if let Some(entry) = by_age.get_mut(&record.age) {
            match record.sex {
                Sex::Male => entry.0 += record.insured_count,
                Sex::Female => entry.1 += record.insured_count,
            }
        }
    }
    by_age
        .into_iter()
        .map(|(age, (male, female))| AgeInsured {
            age,
            male,
            female,
            total: male + female,
        })
        .collect()
}

/// Annual portfolio totals, with the chart's figures in millions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualEvolutionPoint {
    pub year: u16,
    pub insured_count: u64,
    pub issued_premium: f64,
    pub sum_insured: f64,
    pub premium_millions: f64,
    pub insured_millions: f64,
}

/// Annual summaries restricted to the selected years, in input order
pub fn annual_evolution(
    summaries: &[AnnualPolicySummary],
    years: &BTreeSet<u16>,
) -> Vec<AnnualEvolutionPoint> {
    summaries
        .iter()
        .filter(|s| years.contains(&s.year))
        .map(|s| AnnualEvolutionPoint {
            year: s.year,
            insured_count: s.insured_count,
            issued_premium: s.issued_premium,
            sum_insured: s.sum_insured,
            premium_millions: s.issued_premium / 1e6,
            insured_millions: s.insured_count as f64 / 1e6,
        })
        .collect()
}
