//! Write the catalog real price variation report to CSV
//!
//! Usage: price_report [YEAR] [OUTPUT]

use std::time::Instant;

use anyhow::Context;
use chrono::{Datelike, Local};
use log::{info, warn};

use household_budget::dashboard::DashboardRunner;
use household_budget::inflation::{CsvInflationSource, FixedInflationSource, InflationSource};
use household_budget::ledger::JsonLedgerStore;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let today = Local::now().date_naive();
    let mut args = std::env::args().skip(1);
    let year = match args.next() {
        Some(y) => y.parse::<i32>().with_context(|| format!("invalid year '{}'", y))?,
        None => today.year(),
    };
    let output = args.next().unwrap_or_else(|| format!("price_variation_{}.csv", year));

    let inflation: Box<dyn InflationSource> = match CsvInflationSource::default_location() {
        Ok(source) => Box::new(source),
        Err(e) => {
            warn!("No inflation series ({}); reporting nominal prices", e);
            Box::new(FixedInflationSource::new())
        }
    };

    let start = Instant::now();
    let runner = DashboardRunner::new(JsonLedgerStore::default_location(), inflation);
    let report = runner.price_report(year, today)?;
    info!("Analyzed {} product(s) in {:?}", report.len(), start.elapsed());

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output))?;
    for variation in report.all() {
        writer.serialize(variation)?;
    }
    writer.flush()?;

    println!("{:<12} {:>8}", "Trend", "Products");
    println!("{:<12} {:>8}", "Increase", report.increases.len());
    println!("{:<12} {:>8}", "Decrease", report.decreases.len());
    println!("{:<12} {:>8}", "Stable", report.stable.len());
    println!("{:<12} {:>8}", "No data", report.insufficient_data.len());
    println!("\nWritten {} products to {}", report.len(), output);

    Ok(())
}
