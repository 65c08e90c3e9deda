//! Write the rate calculator's quote for every rated age to CSV
//!
//! Usage: cargo run --bin premium_schedule -- [data_dir] [output.csv]

use anyhow::{Context, Result};
use gmm_dashboard::{Dashboard, DashboardConfig};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, serde::Serialize)]
struct ScheduleRow {
    age: u8,
    level1_annual: f64,
    level2_annual: f64,
    level3_annual: f64,
    total_annual: f64,
    monthly_base: f64,
    monthly_with_surcharge: f64,
    surcharge_amount: f64,
    missing_cells: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let output_path = PathBuf::from(
        args.next()
            .unwrap_or_else(|| "premium_schedule.csv".to_string()),
    );

    let start = Instant::now();
    println!("Loading snapshot from {}...", data_dir.display());
    let dashboard = Dashboard::from_data_dir(&data_dir, DashboardConfig::default())
        .with_context(|| format!("Failed to load data from {}", data_dir.display()))?;
    println!("Loaded {} premium cells in {:?}", dashboard.catalog().len(), start.elapsed());

    let schedule = dashboard.schedule();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    for quote in &schedule {
        let annual = |n: u8| {
            quote
                .by_level
                .iter()
                .find(|p| p.level.number() == n)
                .map(|p| p.annual_premium)
                .unwrap_or(0.0)
        };
        writer.serialize(ScheduleRow {
            age: quote.age,
            level1_annual: annual(1),
            level2_annual: annual(2),
            level3_annual: annual(3),
            total_annual: quote.total_annual,
            monthly_base: quote.monthly_base,
            monthly_with_surcharge: quote.monthly_with_surcharge,
            surcharge_amount: quote.surcharge_amount,
            missing_cells: quote.by_level.iter().filter(|p| !p.found).count(),
        })?;
    }
    writer.flush()?;

    println!("Wrote {} ages to {}", schedule.len(), output_path.display());
    if let (Some(first), Some(last)) = (schedule.first(), schedule.last()) {
        for quote in [first, last] {
            println!(
                "  Age {:>2}: annual ${:.2}, monthly ${:.2}",
                quote.age, quote.total_annual, quote.monthly_with_surcharge
            );
        }
    }
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
