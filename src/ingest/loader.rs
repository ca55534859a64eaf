//! CSV sales data loader.
//!
//! Parses daily sales CSV files into per-store [`SalesSeries`]. Expected
//! columns (v1 contract): Date, Store, Sales.

use crate::core::SalesSeries;
use crate::error::{DemandError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps the logical fields to physical CSV headers.
///
/// Versioned so a layout change ships as a new constructor instead of a
/// breaking edit to the loader.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: String,
    pub store: String,
    pub sales: String,
}

impl ColumnMap {
    /// The v1 layout: `Date`, `Store`, `Sales`.
    pub fn v1() -> Self {
        Self {
            date: "Date".into(),
            store: "Store".into(),
            sales: "Sales".into(),
        }
    }

    pub fn with_date(mut self, header: &str) -> Self {
        self.date = header.into();
        self
    }

    pub fn with_store(mut self, header: &str) -> Self {
        self.store = header.into();
        self
    }

    pub fn with_sales(mut self, header: &str) -> Self {
        self.sales = header.into();
        self
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::v1()
    }
}

/// One well-formed row of the sales file.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub store: String,
    pub sales: f64,
}

/// Wire-level row, deserialized against canonicalized headers. The date
/// stays a string here so a bad value fails the row, not the file.
#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    store: String,
    sales: f64,
}

/// Counts from a lenient load pass.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Loaded sales data, one gap-filled daily series per store.
#[derive(Debug, Clone)]
pub struct SalesData {
    series: BTreeMap<String, SalesSeries>,
    report: LoadReport,
}

impl SalesData {
    /// Store ids in sorted order.
    pub fn stores(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn series(&self, store: &str) -> Result<&SalesSeries> {
        self.series
            .get(store)
            .ok_or_else(|| DemandError::UnknownStore(store.to_string()))
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Load sales data from any reader.
///
/// Rows with a malformed date or sales value, or missing fields, are skipped
/// and counted in the report. Multiple rows for the same store and date are
/// summed. A header row missing one of the mapped columns is an error, since
/// every subsequent row would be unusable.
pub fn load_sales<R: Read>(reader: R, columns: &ColumnMap) -> Result<SalesData> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for name in [&columns.date, &columns.store, &columns.sales] {
        if !headers.iter().any(|h| h == name) {
            return Err(DemandError::InvalidParameter(format!(
                "missing CSV column '{name}'"
            )));
        }
    }

    // Rename the mapped headers to the RawRow field names so one serde
    // struct serves every column layout.
    let canonical: csv::StringRecord = headers
        .iter()
        .map(|h| {
            if h == columns.date {
                "date"
            } else if h == columns.store {
                "store"
            } else if h == columns.sales {
                "sales"
            } else {
                h
            }
        })
        .collect();
    csv_reader.set_headers(canonical);

    let mut report = LoadReport::default();
    let mut by_store: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for row in csv_reader.deserialize::<RawRow>() {
        report.rows_read += 1;

        let Some(record) = row.ok().and_then(parse_row) else {
            report.rows_skipped += 1;
            continue;
        };

        *by_store
            .entry(record.store)
            .or_default()
            .entry(record.date)
            .or_insert(0.0) += record.sales;
    }

    let mut series = BTreeMap::new();
    for (store, days) in by_store {
        let observations: Vec<(NaiveDate, f64)> = days.into_iter().collect();
        series.insert(store, SalesSeries::from_observations(observations)?);
    }

    Ok(SalesData { series, report })
}

/// Load sales data from a CSV file path.
pub fn load_sales_file<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<SalesData> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| DemandError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_sales(file, columns)
}

fn parse_row(row: RawRow) -> Option<SalesRecord> {
    let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).ok()?;
    if row.store.is_empty() || !row.sales.is_finite() {
        return None;
    }
    Some(SalesRecord {
        date,
        store: row.store,
        sales: row.sales,
    })
}
