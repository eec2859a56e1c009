//! CSV-backed inflation source
//!
//! Reads `year,month,rate` rows (month 1-12, rate in percent) from
//! data/inflation.csv. Months missing from the file are 0.

use std::collections::BTreeMap;
use std::path::Path;

use csv::Reader;
use log::{info, warn};

use super::{InflationRates, InflationSource};
use crate::error::{BudgetError, Result};
use crate::ledger::MONTHS;

/// Default path to the inflation series
pub const DEFAULT_INFLATION_PATH: &str = "data/inflation.csv";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    year: i32,
    month: usize,
    rate: f64,
}

/// Inflation rates loaded once from a CSV file
#[derive(Debug, Clone, Default)]
pub struct CsvInflationSource {
    years: BTreeMap<i32, [f64; MONTHS]>,
}

impl CsvInflationSource {
    /// Load all years from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::from_path(path.as_ref())?;
        let source = Self::load(reader)?;
        info!(
            "Loaded inflation for {} year(s) from {}",
            source.years.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    /// Load from any reader (e.g., string buffer, HTTP body)
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::load(Reader::from_reader(reader))
    }

    /// Load from the default data/inflation.csv location
    pub fn default_location() -> Result<Self> {
        Self::from_path(DEFAULT_INFLATION_PATH)
    }

    fn load<R: std::io::Read>(mut reader: Reader<R>) -> Result<Self> {
        let mut years: BTreeMap<i32, [f64; MONTHS]> = BTreeMap::new();

        for result in reader.deserialize() {
            let row: CsvRow = result?;
            if row.month == 0 || row.month > MONTHS {
                return Err(BudgetError::InvalidInput(format!(
                    "inflation row for {} has month {} (expected 1-12)",
                    row.year, row.month
                )));
            }
            if !row.rate.is_finite() {
                warn!("Non-finite inflation for {}-{:02}; using 0", row.year, row.month);
            }
            years.entry(row.year).or_insert([0.0; MONTHS])[row.month - 1] = row.rate;
        }

        Ok(Self { years })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }
}

impl InflationSource for CsvInflationSource {
    fn monthly_inflation(&self, year: i32) -> Result<InflationRates> {
        self.years
            .get(&year)
            .map(|rates| InflationRates::new(year, *rates))
            .ok_or_else(|| BudgetError::NotFound(format!("inflation rates for {}", year)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "year,month,rate\n2024,1,0.52\n2024,2,0.61\n2024,12,0.4\n2023,6,0.3\n";

    #[test]
    fn test_load_from_reader() {
        let source = CsvInflationSource::from_reader(SAMPLE.as_bytes()).unwrap();
        let rates = source.monthly_inflation(2024).unwrap();

        assert_eq!(rates.rate(0), 0.52);
        assert_eq!(rates.rate(1), 0.61);
        assert_eq!(rates.rate(5), 0.0);
        assert_eq!(rates.rate(11), 0.4);
        assert_eq!(source.years().collect::<Vec<_>>(), vec![2023, 2024]);
    }

    #[test]
    fn test_missing_year_is_not_found() {
        let source = CsvInflationSource::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(matches!(source.monthly_inflation(2030), Err(BudgetError::NotFound(_))));
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        let bad = "year,month,rate\n2024,13,0.5\n";
        assert!(CsvInflationSource::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CsvInflationSource::from_path(file.path()).unwrap();
        assert_eq!(source.monthly_inflation(2023).unwrap().rate(5), 0.3);
    }
}
