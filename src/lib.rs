//! Adaptive Grid Trading Core
//!
//! Analytical core of an adaptive grid trading system: derives grid geometry
//! from observed volatility and governs trading with performance-driven risk
//! directives. Exchange connectivity, order placement, and scheduling are
//! external collaborators; this crate consumes a price window and a trade
//! history and emits grid levels and risk directives.

pub mod config;
pub mod error;
pub mod governor;
pub mod grid;
pub mod performance;
pub mod trend;
pub mod types;
pub mod volatility;

pub use config::{EngineConfig, GridConfig, RiskConfig};
pub use error::{EngineError, Result};
pub use types::*;
