//! Series decomposition into trend, seasonal, and residual components.

mod stl;

pub use stl::{Decomposition, Stl};
