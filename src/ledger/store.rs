//! Persistence collaborator: get/save per entity
//!
//! The engine only ever sees snapshots; stores live at the edges.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::{LedgerEntry, LedgerSnapshot, Product, YearConfig};
use crate::error::Result;

/// Default location of the JSON ledger document
pub const DEFAULT_LEDGER_PATH: &str = "data/ledger.json";

const TMP_SUFFIX: &str = "tmp";

/// Read/write access to persisted ledger data
pub trait LedgerStore {
    fn expenses(&self) -> Result<Vec<LedgerEntry>>;
    fn save_expenses(&mut self, expenses: &[LedgerEntry]) -> Result<()>;

    fn income(&self) -> Result<Vec<LedgerEntry>>;
    fn save_income(&mut self, income: &[LedgerEntry]) -> Result<()>;

    fn opening_balance(&self) -> Result<f64>;
    fn save_opening_balance(&mut self, amount: f64) -> Result<()>;

    fn year_configs(&self) -> Result<Vec<YearConfig>>;
    fn save_year_configs(&mut self, configs: &[YearConfig]) -> Result<()>;

    fn products(&self) -> Result<Vec<Product>>;
    fn save_products(&mut self, products: &[Product]) -> Result<()>;

    /// Read everything at once
    fn snapshot(&self) -> Result<LedgerSnapshot> {
        Ok(LedgerSnapshot {
            expenses: self.expenses()?,
            income: self.income()?,
            opening_balance: self.opening_balance()?,
            year_configs: self.year_configs()?,
            products: self.products()?,
        })
    }
}

/// An in-memory snapshot doubles as a store
impl LedgerStore for LedgerSnapshot {
    fn expenses(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.expenses.clone())
    }

    fn save_expenses(&mut self, expenses: &[LedgerEntry]) -> Result<()> {
        self.expenses = expenses.to_vec();
        Ok(())
    }

    fn income(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.income.clone())
    }

    fn save_income(&mut self, income: &[LedgerEntry]) -> Result<()> {
        self.income = income.to_vec();
        Ok(())
    }

    fn opening_balance(&self) -> Result<f64> {
        Ok(self.opening_balance)
    }

    fn save_opening_balance(&mut self, amount: f64) -> Result<()> {
        self.opening_balance = amount;
        Ok(())
    }

    fn year_configs(&self) -> Result<Vec<YearConfig>> {
        Ok(self.year_configs.clone())
    }

    fn save_year_configs(&mut self, configs: &[YearConfig]) -> Result<()> {
        self.year_configs = configs.to_vec();
        Ok(())
    }

    fn products(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    fn save_products(&mut self, products: &[Product]) -> Result<()> {
        self.products = products.to_vec();
        Ok(())
    }
}

/// Store backed by a single JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the default `data/ledger.json` location
    pub fn default_location() -> Self {
        Self::new(DEFAULT_LEDGER_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document; a missing file is an empty ledger
    pub fn load(&self) -> Result<LedgerSnapshot> {
        if !self.path.exists() {
            return Ok(LedgerSnapshot::default());
        }
        let text = fs::read_to_string(&self.path)?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&text)?;
        info!(
            "Loaded ledger from {} ({} expenses, {} income, {} products)",
            self.path.display(),
            snapshot.expenses.len(),
            snapshot.income.len(),
            snapshot.products.len()
        );
        Ok(snapshot)
    }

    /// Write the whole document.
    ///
    /// The new content goes to a sibling temp file first and is renamed over
    /// the ledger, so an interrupted write leaves the previous document intact.
    pub fn persist(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, serde_json::to_string_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        info!("Saved ledger to {}", self.path.display());
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut LedgerSnapshot)) -> Result<()> {
        let mut snapshot = self.load()?;
        apply(&mut snapshot);
        self.persist(&snapshot)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

impl LedgerStore for JsonLedgerStore {
    fn expenses(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.load()?.expenses)
    }

    fn save_expenses(&mut self, expenses: &[LedgerEntry]) -> Result<()> {
        self.update(|s| s.expenses = expenses.to_vec())
    }

    fn income(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.load()?.income)
    }

    fn save_income(&mut self, income: &[LedgerEntry]) -> Result<()> {
        self.update(|s| s.income = income.to_vec())
    }

    fn opening_balance(&self) -> Result<f64> {
        Ok(self.load()?.opening_balance)
    }

    fn save_opening_balance(&mut self, amount: f64) -> Result<()> {
        self.update(|s| s.opening_balance = amount)
    }

    fn year_configs(&self) -> Result<Vec<YearConfig>> {
        Ok(self.load()?.year_configs)
    }

    fn save_year_configs(&mut self, configs: &[YearConfig]) -> Result<()> {
        self.update(|s| s.year_configs = configs.to_vec())
    }

    fn products(&self) -> Result<Vec<Product>> {
        Ok(self.load()?.products)
    }

    fn save_products(&mut self, products: &[Product]) -> Result<()> {
        self.update(|s| s.products = products.to_vec())
    }

    fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("nothing.json"));
        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.expenses.is_empty());
        assert_eq!(snapshot.opening_balance, 0.0);
    }

    #[test]
    fn test_json_store_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonLedgerStore::new(dir.path().join("nested").join("ledger.json"));

        let expenses = vec![LedgerEntry::new("e1", "Hogar", "UTE").with_amounts([2100.0; 12])];
        store.save_expenses(&expenses).unwrap();
        store.save_opening_balance(15_000.0).unwrap();
        store
            .save_year_configs(&[YearConfig { year: 2024, start_month_index: 2 }])
            .unwrap();
        store.save_products(&[Product::new("p1", "Yerba", 250.0)]).unwrap();

        let reopened = JsonLedgerStore::new(store.path());
        assert_eq!(reopened.expenses().unwrap(), expenses);
        assert_eq!(reopened.opening_balance().unwrap(), 15_000.0);
        assert_eq!(reopened.year_configs().unwrap()[0].start_month_index, 2);
        assert_eq!(reopened.products().unwrap()[0].name, "Yerba");
        assert!(reopened.income().unwrap().is_empty());
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonLedgerStore::new(dir.path().join("ledger.json"));
        store.save_opening_balance(100.0).unwrap();

        assert_eq!(tmp_path(store.path()), dir.path().join("ledger.json.tmp"));
        assert!(!dir.path().join("ledger.json.tmp").exists());
        assert_eq!(store.opening_balance().unwrap(), 100.0);
    }

    #[test]
    fn test_failed_write_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonLedgerStore::new(dir.path().join("ledger.json"));
        store.save_opening_balance(1_000.0).unwrap();

        // a directory in the temp file's place makes the write fail
        fs::create_dir(dir.path().join("ledger.json.tmp")).unwrap();
        assert!(store.save_opening_balance(2_000.0).is_err());

        let reopened = JsonLedgerStore::new(store.path());
        assert_eq!(reopened.opening_balance().unwrap(), 1_000.0);
    }

    #[test]
    fn test_snapshot_as_store() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.save_opening_balance(500.0).unwrap();
        assert_eq!(LedgerStore::opening_balance(&snapshot).unwrap(), 500.0);
    }
}
