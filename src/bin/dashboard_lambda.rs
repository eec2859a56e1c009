//! AWS Lambda handler for the budget dashboard
//!
//! Accepts a `DashboardRequest` as JSON and returns the projection, KPIs
//! and optional simulation computed against the configured ledger.
//!
//! Environment:
//! - `LEDGER_PATH`: JSON ledger document (default `data/ledger.json`)
//! - `INFLATION_PATH`: CSV inflation series (default `data/inflation.csv`)

use std::time::Instant;

use chrono::Local;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;

use household_budget::dashboard::{Dashboard, DashboardRequest, DashboardRunner};
use household_budget::inflation::loader::DEFAULT_INFLATION_PATH;
use household_budget::inflation::{CsvInflationSource, FixedInflationSource, InflationSource};
use household_budget::ledger::store::DEFAULT_LEDGER_PATH;
use household_budget::ledger::JsonLedgerStore;

#[derive(Debug, Serialize)]
struct DashboardResponse {
    #[serde(flatten)]
    dashboard: Dashboard,

    /// Execution time in milliseconds
    execution_time_ms: u64,
}

fn inflation_source() -> Box<dyn InflationSource + Send + Sync> {
    let path =
        std::env::var("INFLATION_PATH").unwrap_or_else(|_| DEFAULT_INFLATION_PATH.to_string());
    match CsvInflationSource::from_path(&path) {
        Ok(source) => Box::new(source),
        Err(e) => {
            warn!("Could not load inflation from {} ({}); using none", path, e);
            Box::new(FixedInflationSource::new())
        }
    }
}

async fn handler(event: LambdaEvent<DashboardRequest>) -> Result<DashboardResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    let ledger = std::env::var("LEDGER_PATH").unwrap_or_else(|_| DEFAULT_LEDGER_PATH.to_string());
    let runner = DashboardRunner::new(JsonLedgerStore::new(&ledger), inflation_source());
    let dashboard = runner.run(&request, Local::now().date_naive())?;

    info!("Dashboard for {} computed in {:?}", request.year, start.elapsed());
    Ok(DashboardResponse {
        dashboard,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
