//! Household Budget CLI
//!
//! Runs the dashboard projection, the catalog price report, long-range
//! simulations and AI reply imports against a JSON ledger

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::warn;

use household_budget::dashboard::{current_month_for, DashboardRequest, DashboardRunner};
use household_budget::import::{decode_reply, merge_parsed_items};
use household_budget::inflation::{
    loader::DEFAULT_INFLATION_PATH, CsvInflationSource, FixedInflationSource, InflationSource,
};
use household_budget::ledger::store::DEFAULT_LEDGER_PATH;
use household_budget::ledger::{JsonLedgerStore, LedgerStore};
use household_budget::prices::PriceHistoryAnalyzer;
use household_budget::simulation::YearMonth;

const MONTH_NAMES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Set", "Oct", "Nov", "Dic",
];

#[derive(Parser)]
#[command(
    name = "household_budget",
    version,
    about = "Household budget projections and price analysis"
)]
struct Cli {
    /// JSON ledger document
    #[arg(long, default_value = DEFAULT_LEDGER_PATH)]
    ledger: PathBuf,

    /// CSV inflation series (year,month,rate)
    #[arg(long, default_value = DEFAULT_INFLATION_PATH)]
    inflation: PathBuf,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Balance projection and KPIs for a year
    Dashboard {
        #[arg(long)]
        year: Option<i32>,

        /// Simulate wealth up to this month (YYYY-MM)
        #[arg(long, value_parser = parse_year_month)]
        simulate_to: Option<YearMonth>,

        /// Annual investment return in percent
        #[arg(long)]
        annual_return: Option<f64>,

        /// JSON request file; command-line flags override its fields
        #[arg(long)]
        request: Option<PathBuf>,

        /// Print the full dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Real price variation across the catalog, or one product's history
    Prices {
        #[arg(long)]
        year: Option<i32>,

        /// Show the history of a single product id
        #[arg(long)]
        product: Option<String>,
    },
    /// Merge a saved AI parser reply into the expenses
    Import {
        /// File holding the parser's JSON reply
        reply: PathBuf,

        /// Month (1-12) for items without one
        #[arg(long)]
        month: u32,
    },
}

/// Parse `YYYY-MM` into a 0-based year/month
fn parse_year_month(value: &str) -> Result<YearMonth, String> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{}'", value))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year in '{}'", value))?;
    let month: usize = month.parse().map_err(|_| format!("invalid month in '{}'", value))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {}", month));
    }
    Ok(YearMonth::new(year, month - 1))
}

fn inflation_source(path: &Path) -> Box<dyn InflationSource> {
    match CsvInflationSource::from_path(path) {
        Ok(source) => Box::new(source),
        Err(e) => {
            warn!("Could not load inflation from {} ({}); using none", path.display(), e);
            Box::new(FixedInflationSource::new())
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let store = JsonLedgerStore::new(&cli.ledger);
    let runner = DashboardRunner::new(store, inflation_source(&cli.inflation));

    match cli.command {
        Command::Dashboard {
            year,
            simulate_to,
            annual_return,
            request,
            json,
        } => {
            let mut request = match request {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<DashboardRequest>(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => DashboardRequest::for_year(today.year()),
            };
            if let Some(year) = year {
                request.year = year;
            }
            if simulate_to.is_some() {
                request.simulation_target = simulate_to;
            }
            if annual_return.is_some() {
                request.annual_return_pct = annual_return;
            }
            let dashboard = runner.run(&request, today)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            println!(
                "Dashboard {} (start month: {})",
                dashboard.year,
                MONTH_NAMES[dashboard.start_month.min(11)]
            );
            println!(
                "{:>4} {:>14} {:>14} {:>14} {:>14} {:>24}",
                "Mes", "Actual", "Proyectado", "Real act.", "Real proy.", "Margen"
            );
            println!("{}", "-".repeat(90));
            for point in &dashboard.projection.points {
                let band = point
                    .error_band
                    .map(|b| format!("[{:.0}, {:.0}]", b.low, b.high))
                    .unwrap_or_default();
                println!(
                    "{:>4} {:>14} {:>14} {:>14} {:>14} {:>24}{}",
                    MONTH_NAMES[point.month_index],
                    fmt_opt(point.actual),
                    fmt_opt(point.projected),
                    fmt_opt(point.real_actual),
                    fmt_opt(point.real_projected),
                    band,
                    if point.is_unrecorded {
                        " (sin registro)"
                    } else {
                        ""
                    },
                );
            }

            let kpis = &dashboard.kpis;
            println!("\nSummary:");
            println!("  Income:            ${:.2}", kpis.total_income);
            println!("  Expenses:          ${:.2}", kpis.total_expenses);
            println!(
                "  Avg savings:       ${:.2} (std dev {:.2})",
                dashboard.projection.stats.average, dashboard.projection.stats.std_dev
            );
            println!("  Stable wealth:     ${:.2}", kpis.stable_wealth);
            match kpis.runway_months {
                Some(months) => println!("  Runway:            {:.1} months", months),
                None => println!("  Runway:            -"),
            }
            println!(
                "  Year end:          ${:.2} (real ${:.2})",
                kpis.year_end_nominal, kpis.year_end_real
            );

            if let Some(sim) = dashboard.simulation {
                println!("\nSimulation ({} months):", sim.months);
                println!("  Nominal:           ${:.2}", sim.nominal);
                println!(
                    "  Real:              ${:.2} (inflation {:.2}%/month)",
                    sim.real, sim.avg_monthly_inflation
                );
                if let Some(inv) = sim.investment {
                    println!(
                        "  Invested:          ${:.2} (real ${:.2}, profit ${:.2})",
                        inv.total, inv.real_total, inv.profit
                    );
                }
            }
        }
        Command::Prices { year, product } => {
            let year = year.unwrap_or(today.year());
            match product {
                None => {
                    let report = runner.price_report(year, today)?;
                    println!(
                        "{:<30} {:>12} {:>12} {:>10} {:>10}",
                        "Product", "First", "Last", "Var %", "Trend"
                    );
                    println!("{}", "-".repeat(78));
                    for v in report.all() {
                        println!(
                            "{:<30} {:>12.2} {:>12.2} {:>10.2} {:>10}",
                            v.product_name,
                            v.first_real_price,
                            v.last_real_price,
                            v.variation_pct,
                            v.trend.as_str()
                        );
                    }
                    println!(
                        "\n{} product(s) without enough history",
                        report.insufficient_data.len()
                    );
                }
                Some(id) => {
                    let snapshot = runner.store().snapshot()?;
                    let Some(product) = snapshot.products.iter().find(|p| p.id == id) else {
                        bail!("Product {} not found", id);
                    };
                    let rates = runner.inflation().monthly_inflation_or_zero(year);
                    let (current_month, _) = current_month_for(year, today);
                    let analyzer = PriceHistoryAnalyzer::new(
                        &snapshot.expenses,
                        rates.as_slice(),
                        current_month,
                    );
                    let history = analyzer.history(product);

                    println!("{} (reference ${:.2})", product.name, product.unit_price);
                    if history.is_empty() {
                        println!("  No purchases recorded yet");
                    }
                    for point in &history {
                        println!(
                            "  {} {:>10.2} {:>10.2}  {}",
                            point.timestamp.format("%Y-%m-%d"),
                            point.unit_price,
                            point.real_price,
                            point.description
                        );
                    }
                }
            }
        }
        Command::Import { reply, month } => {
            if !(1..=12).contains(&month) {
                bail!("month must be 1-12, got {}", month);
            }
            let text = fs::read_to_string(&reply)
                .with_context(|| format!("reading {}", reply.display()))?;
            let items = decode_reply(&text)?;

            let mut store = JsonLedgerStore::new(&cli.ledger);
            let merged =
                merge_parsed_items(&store.expenses()?, &items, month as usize - 1, Utc::now())?;
            store.save_expenses(&merged)?;
            println!(
                "Imported {} item(s) into {}",
                items.len(),
                cli.ledger.display()
            );
        }
    }

    Ok(())
}
