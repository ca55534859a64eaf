//! Core data structures: the daily sales series and forecast results.

mod forecast;
mod series;

pub use forecast::Forecast;
pub use series::SalesSeries;
