//! Shared numeric utilities.

pub mod optimization;
pub mod stats;

pub use optimization::{minimize, MinimizeConfig, MinimizeResult};
pub use stats::{mean, quantile, quantile_normal, std_dev, variance};
