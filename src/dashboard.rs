//! Dashboard runner: loads collaborator data once per request and derives
//! every dashboard figure from that snapshot
//!
//! Nothing is cached between runs; any change to the ledger, opening
//! balance, year configuration or inflation means a fresh run.

use chrono::{Datelike, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{check_month, Result};
use crate::inflation::{InflationRates, InflationSource};
use crate::ledger::{LedgerSnapshot, LedgerStore, MonthlySeries, YearConfig};
use crate::prices::{PriceHistoryAnalyzer, VariationReport};
use crate::projection::{
    reliable_months, ProjectionConfig, ProjectionEngine, ProjectionInput, ProjectionResult,
};
use crate::simulation::{FutureSimulator, SimulationConfig, SimulationInput, SimulationResult, YearMonth};

/// Dashboard request, as accepted by the CLI and the Lambda handler
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardRequest {
    /// Year shown on the dashboard
    pub year: i32,

    /// Override for today's date (defaults to the local date)
    #[serde(default)]
    pub today: Option<NaiveDate>,

    /// Override for the persisted opening balance
    #[serde(default)]
    pub opening_balance: Option<f64>,

    /// Month to simulate wealth up to
    #[serde(default)]
    pub simulation_target: Option<YearMonth>,

    /// Annual investment return in percent for the simulation
    #[serde(default)]
    pub annual_return_pct: Option<f64>,
}

impl DashboardRequest {
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            today: None,
            opening_balance: None,
            simulation_target: None,
            annual_return_pct: None,
        }
    }

    /// Reject month indices outside 0-11
    pub fn validate(&self) -> Result<()> {
        if let Some(target) = &self.simulation_target {
            check_month(target.month)?;
        }
        Ok(())
    }
}

/// Current month for the selected year: today's month in the current year,
/// December otherwise (past and not-yet-started years alike)
pub fn current_month_for(year: i32, today: NaiveDate) -> (usize, bool) {
    if today.year() == year {
        (today.month0() as usize, true)
    } else {
        (11, false)
    }
}

/// Headline figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,

    /// Mean monthly expense over reliable, closed months
    pub avg_monthly_expense: f64,

    /// Balance at the end of the last closed month
    pub stable_wealth: f64,

    /// Months of average expenses covered by the stable wealth
    pub runway_months: Option<f64>,

    pub year_end_nominal: f64,
    pub year_end_real: f64,
}

/// Everything the dashboard displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub year: i32,
    pub start_month: usize,
    pub inflation: InflationRates,
    pub projection: ProjectionResult,
    pub kpis: DashboardKpis,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationResult>,
}

/// Derive the dashboard from a snapshot
pub fn build_dashboard(
    snapshot: &LedgerSnapshot,
    inflation: &InflationRates,
    request: &DashboardRequest,
    today: NaiveDate,
    config: &ProjectionConfig,
) -> Result<Dashboard> {
    request.validate()?;
    let (current_month, is_current_year) = current_month_for(request.year, today);
    let start_month = YearConfig::start_month_for(&snapshot.year_configs, request.year);
    let opening_balance = request.opening_balance.unwrap_or(snapshot.opening_balance);

    let income = MonthlySeries::sum_of(snapshot.income.iter().map(|e| &e.amounts));
    let expenses = MonthlySeries::sum_of(snapshot.expenses.iter().map(|e| &e.amounts));

    let input = ProjectionInput {
        net_savings: income.minus(&expenses),
        opening_balance,
        current_month,
        is_current_year,
        start_month,
    };
    let projection = ProjectionEngine::new(config.clone()).project(&input, inflation.as_slice());

    let expense_months: Vec<f64> = reliable_months(start_month, current_month)
        .map(|m| expenses.get(m))
        .collect();
    let avg_monthly_expense = if expense_months.is_empty() {
        0.0
    } else {
        expense_months.iter().sum::<f64>() / expense_months.len() as f64
    };

    let stable_wealth = projection.closed_balance();
    let summary = projection.summary();
    let kpis = DashboardKpis {
        total_income: income.total(),
        total_expenses: expenses.total(),
        net_savings: income.total() - expenses.total(),
        avg_monthly_expense,
        stable_wealth,
        runway_months: (avg_monthly_expense > 0.0).then(|| stable_wealth / avg_monthly_expense),
        year_end_nominal: summary.year_end_nominal,
        year_end_real: summary.year_end_real,
    };

    let simulation = request.simulation_target.map(|target| {
        let simulator = FutureSimulator::new(SimulationConfig {
            annual_return_pct: request.annual_return_pct,
            ..Default::default()
        });
        let input = SimulationInput {
            current: YearMonth::new(today.year(), today.month0() as usize),
            target,
            current_wealth: stable_wealth,
            avg_savings: projection.stats.average,
        };
        simulator.simulate(&input, inflation.as_slice())
    });

    Ok(Dashboard {
        year: request.year,
        start_month,
        inflation: *inflation,
        projection,
        kpis,
        simulation,
    })
}

/// Pairs a ledger store with an inflation source
#[derive(Debug, Clone)]
pub struct DashboardRunner<S, I> {
    store: S,
    inflation: I,
    config: ProjectionConfig,
}

impl<S: LedgerStore, I: InflationSource> DashboardRunner<S, I> {
    pub fn new(store: S, inflation: I) -> Self {
        Self {
            store,
            inflation,
            config: ProjectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProjectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn inflation(&self) -> &I {
        &self.inflation
    }

    /// Run the dashboard for `request`
    pub fn run(&self, request: &DashboardRequest, today: NaiveDate) -> Result<Dashboard> {
        let snapshot = self.store.snapshot()?;
        let inflation = self.inflation.monthly_inflation_or_zero(request.year);
        let today = request.today.unwrap_or(today);
        info!("Building dashboard for {} as of {}", request.year, today);
        build_dashboard(&snapshot, &inflation, request, today, &self.config)
    }

    /// Catalog price variation report for `year`
    pub fn price_report(&self, year: i32, today: NaiveDate) -> Result<VariationReport> {
        let snapshot = self.store.snapshot()?;
        let inflation = self.inflation.monthly_inflation_or_zero(year);
        let (current_month, _) = current_month_for(year, today);
        let analyzer = PriceHistoryAnalyzer::new(&snapshot.expenses, inflation.as_slice(), current_month);
        Ok(analyzer.report(&snapshot.products))
    }
}
