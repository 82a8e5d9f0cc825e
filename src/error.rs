//! Error taxonomy for the analytical core
//!
//! Every variant is local and recoverable: the execution loop is expected to
//! skip the tick and keep the previous grid/directive rather than crash.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid price: {0} must be positive")]
    InvalidPrice(f64),

    #[error("invalid grid range: lower ({lower}) must be below upper ({upper})")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("invalid level count: {0} (at least 2 levels required)")]
    InvalidLevelCount(usize),

    #[error("trade history is empty, metrics are undefined")]
    EmptyHistory,
}

pub type Result<T> = std::result::Result<T, EngineError>;
