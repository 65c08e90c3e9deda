//! Dataset records and the static snapshot loader

mod records;
pub mod loader;

pub use records::{
    AgeRange, AnnualPolicySummary, ClaimAggregate, ClassifiedCause, GeneralSummary, Level,
    LevelDistribution, PolicyAggregate, PolicyByAgeBand, PremiumByLevelAge, Sex,
};
pub use loader::DataSnapshot;
