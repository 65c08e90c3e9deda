//! GMM Dashboard CLI
//!
//! Renders the dashboard pages (claims explorer, policy explorer, rate
//! calculator, summary) from the static data directory.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use gmm_dashboard::format::{
    abbreviate, format_currency, format_frequency, format_number, format_percentage,
    DEFAULT_PERCENT_DECIMALS,
};
use gmm_dashboard::{Dashboard, DashboardConfig, FilterState, Level, PaymentMode, SexFilter};

#[derive(Parser)]
#[command(name = "gmm", version, about = "Major Medical Expense claims and premium dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the JSON snapshot
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Optional JSON configuration overriding the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Claims explorer: filtered claim rows and metrics
    Claims {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Policy explorer: portfolio metrics for the selection
    Policies {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Rate calculator: risk premium for an age
    Quote {
        /// Age of the insured
        #[arg(long)]
        age: u8,

        /// Payment mode (annual or monthly)
        #[arg(long, default_value = "annual")]
        mode: PaymentMode,
    },
    /// Global summary cards
    Summary,
    /// Search the classified causes
    Causes {
        /// Text to look for (accents and case ignored)
        #[arg(long, default_value = "")]
        query: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Check the snapshot's invariants
    Validate,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Years to include, comma separated
    #[arg(long, value_delimiter = ',')]
    years: Option<Vec<u16>>,

    #[arg(long)]
    age_min: Option<u8>,

    #[arg(long)]
    age_max: Option<u8>,

    /// Todos, Masculino or Femenino
    #[arg(long)]
    sex: Option<SexFilter>,

    /// Levels to include (1, 2, 3), comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_level)]
    levels: Option<Vec<Level>>,

    #[arg(long)]
    amount_min: Option<f64>,

    #[arg(long)]
    amount_max: Option<f64>,
}

fn parse_level(s: &str) -> Result<Level, String> {
    let n: u8 = s.trim().parse().map_err(|e| format!("{e}"))?;
    Level::try_from(n).map_err(|e| e.to_string())
}

impl FilterArgs {
    /// Overlay the given options on the default selection
    fn to_filter(&self, dashboard: &Dashboard) -> FilterState {
        let mut filter = dashboard.default_filter();
        if let Some(years) = &self.years {
            filter.years = years.iter().copied().collect();
        }
        if let Some(age_min) = self.age_min {
            filter.age_min = age_min;
        }
        if let Some(age_max) = self.age_max {
            filter.age_max = age_max;
        }
        if let Some(sex) = self.sex {
            filter.sex = sex;
        }
        if let Some(levels) = &self.levels {
            filter.levels = levels.iter().copied().collect();
        }
        filter.amount_min = self.amount_min;
        filter.amount_max = self.amount_max;
        filter
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    let dashboard = Dashboard::from_data_dir(&cli.data_dir, config)
        .with_context(|| format!("Failed to load data from {}", cli.data_dir.display()))?;

    match &cli.command {
        Commands::Claims { filter, limit } => run_claims(&dashboard, filter, *limit, cli.json),
        Commands::Policies { filter } => run_policies(&dashboard, filter, cli.json),
        Commands::Quote { age, mode } => run_quote(&dashboard, *age, *mode, cli.json),
        Commands::Summary => run_summary(&dashboard, cli.json),
        Commands::Causes { query, filter, limit } => {
            let filter = filter.to_filter(&dashboard);
            let hits = dashboard.causes(query, &filter, *limit);
            if cli.json {
                return print_json(&hits);
            }
            println!("{:<60} {:>22} {:>10}", "Causa", "Nivel", "Frecuencia");
            println!("{}", "-".repeat(94));
            for cause in hits {
                println!(
                    "{:<60} {:>22} {:>10}",
                    cause.cause,
                    dashboard.config().label(cause.level),
                    format_number(cause.frequency as f64)
                );
            }
            Ok(())
        }
        Commands::Validate => {
            let report = dashboard.validate();
            if cli.json {
                print_json(&report)?;
            } else {
                for issue in &report.catalog.issues {
                    println!("  catalog: {issue}");
                }
                if report.severity_mismatches > 0 {
                    println!(
                        "  claims: {} rows with inconsistent severity",
                        report.severity_mismatches
                    );
                }
                if let Some(error) = &report.summary_error {
                    println!("  summary: {error}");
                }
                if report.is_clean() {
                    println!("All checks passed");
                }
            }
            if report.catalog.has_errors() {
                anyhow::bail!("premium catalog violates its invariants");
            }
            Ok(())
        }
    }
}

fn run_claims(dashboard: &Dashboard, args: &FilterArgs, limit: usize, json: bool) -> Result<()> {
    let filter = args.to_filter(dashboard);
    let view = dashboard.claims_view(&filter)?;
    if json {
        return print_json(&view);
    }

    let metrics = &view.metrics;
    println!("Total Siniestros: {}", format_number(metrics.total_claims as f64));
    println!("Monto Total:      ${}", abbreviate(metrics.total_amount));
    println!("Monto Promedio:   {}", format_currency(metrics.average_amount, 0));
    println!();
    println!("Distribución por Nivel:");
    for level in &metrics.by_level {
        println!(
            "  {:<24} {:>12} {:>8}",
            dashboard.config().label(level.level),
            format_number(level.claims as f64),
            format_percentage(level.percentage / 100.0, DEFAULT_PERCENT_DECIMALS)
        );
    }
    println!();
    println!(
        "{:>5} {:>5} {:>10} {:>6} {:>10} {:>16} {:>12}",
        "Año", "Edad", "Sexo", "Nivel", "Siniestros", "Monto", "Severidad"
    );
    println!("{}", "-".repeat(72));
    for row in view.records.iter().take(limit) {
        println!(
            "{:>5} {:>5} {:>10} {:>6} {:>10} {:>16} {:>12}",
            row.year,
            row.age,
            row.sex.as_str(),
            row.level.number(),
            format_number(row.claim_count as f64),
            format_currency(row.adjusted_amount, 0),
            format_currency(row.severity, 0)
        );
    }
    if view.records.len() > limit {
        println!("... ({} more rows)", view.records.len() - limit);
    }
    Ok(())
}

fn run_policies(dashboard: &Dashboard, args: &FilterArgs, json: bool) -> Result<()> {
    let filter = args.to_filter(dashboard);
    let view = dashboard.policies_view(&filter)?;
    if json {
        return print_json(&view);
    }

    let metrics = &view.metrics;
    println!("Total Asegurados: {}", format_number(metrics.total_insured as f64));
    println!("Prima Emitida:    ${}", abbreviate(metrics.total_premium));
    println!("Prima Promedio:   {}", format_currency(metrics.average_premium, 0));
    for sex in &metrics.by_sex {
        println!(
            "  {:<10} {:>14} {:>8}",
            sex.sex.as_str(),
            format_number(sex.insured as f64),
            format_percentage(sex.percentage / 100.0, DEFAULT_PERCENT_DECIMALS)
        );
    }
    if !view.evolution.is_empty() {
        println!();
        println!("{:>5} {:>16} {:>16}", "Año", "Asegurados (M)", "Prima (M)");
        for point in &view.evolution {
            println!(
                "{:>5} {:>16.2} {:>16.1}",
                point.year, point.insured_millions, point.premium_millions
            );
        }
    }
    if !view.age_bands.is_empty() {
        println!();
        for band in view.age_bands {
            println!(
                "  {:<10} {:>14} {:>18} {:>8}",
                band.band,
                format_number(band.insured_count as f64),
                format_currency(band.issued_premium, 0),
                format_percentage(band.insured_percentage / 100.0, DEFAULT_PERCENT_DECIMALS)
            );
        }
    }
    Ok(())
}

fn run_quote(dashboard: &Dashboard, age: u8, mode: PaymentMode, json: bool) -> Result<()> {
    let quote = dashboard
        .quote(age)
        .with_context(|| format!("Cannot quote age {age}"))?;
    if json {
        return print_json(&quote);
    }

    println!("Edad del asegurado: {age}");
    println!(
        "{:<24} {:>10} {:>14} {:>14} {:>8}",
        "Nivel", "Frecuencia", "Severidad", "Prima", "% Total"
    );
    println!("{}", "-".repeat(74));
    for level in &quote.by_level {
        println!(
            "{:<24} {:>10} {:>14} {:>14} {:>8}",
            dashboard.config().label(level.level),
            format_frequency(level.frequency),
            format_currency(level.severity, 0),
            format_currency(quote.level_amount(level.level, mode), 2),
            format_percentage(level.share / 100.0, DEFAULT_PERCENT_DECIMALS)
        );
    }
    println!();
    match mode {
        PaymentMode::Annual => {
            println!("Prima anual:          {}", format_currency(quote.total_annual, 2));
            println!("Equivalente mensual:  {}/mes", format_currency(quote.monthly_base, 2));
        }
        PaymentMode::Monthly => {
            println!("Prima mensual:        {}", format_currency(quote.monthly_with_surcharge, 2));
            println!("Prima base mensual:   {}", format_currency(quote.monthly_base, 2));
            println!(
                "Recargo ({}):       +{}",
                format_percentage(quote.surcharge_rate, 1),
                format_currency(quote.surcharge_amount, 2)
            );
        }
    }
    Ok(())
}

fn run_summary(dashboard: &Dashboard, json: bool) -> Result<()> {
    let summary = dashboard
        .summary()
        .context("Snapshot has no general summary")?;
    if json {
        return print_json(summary);
    }

    println!("Total Siniestros: {}", format_number(summary.total_claims as f64));
    println!("Monto Total:      ${}", abbreviate(summary.total_amount));
    println!("Monto Promedio:   {}", format_currency(summary.mean_amount, 0));
    if let Some(range) = summary.age_range {
        println!("Edades:           {}-{}", range.min, range.max);
    }
    if !summary.available_years.is_empty() {
        let years: Vec<String> = summary.available_years.iter().map(|y| y.to_string()).collect();
        println!("Años:             {}", years.join(", "));
    }
    if let Some(generated) = summary.generated_at {
        println!("Generado:         {}", generated.format("%Y-%m-%d %H:%M"));
    }
    println!();
    for level in &summary.by_level {
        println!(
            "  {:<24} {:>12} {:>7.1}% {:>16} {:>7.1}%",
            dashboard.config().label(level.level),
            format_number(level.claims as f64),
            level.claims_percentage,
            format_currency(level.amount, 0),
            level.amount_percentage
        );
    }
    Ok(())
}
