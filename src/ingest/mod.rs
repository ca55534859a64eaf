//! Sales data ingestion.

mod loader;

pub use loader::{load_sales, load_sales_file, ColumnMap, LoadReport, SalesData, SalesRecord};
