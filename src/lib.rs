//! # demandiq
//!
//! Retail demand analysis library for per-store daily sales: CSV ingestion,
//! STL decomposition, five forecasting backends compared by walk-forward
//! validation, 14-day forecasts with prediction intervals, inventory
//! guidance, anomaly detection, and a plain-language narrative.

#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

pub mod analysis;
pub mod core;
pub mod decompose;
pub mod detect;
pub mod error;
pub mod ingest;
pub mod insight;
pub mod inventory;
pub mod metrics;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{DemandError, Result};

pub mod prelude {
    pub use crate::analysis::{analyze, analyze_store, AnalysisRequest, StoreAnalysis};
    pub use crate::core::{Forecast, SalesSeries};
    pub use crate::error::{DemandError, Result};
    pub use crate::ingest::{load_sales, load_sales_file, ColumnMap};
    pub use crate::inventory::InventoryPolicy;
    pub use crate::metrics::{calculate_metrics, ErrorMetrics};
    pub use crate::models::{Backend, Forecaster};
}
