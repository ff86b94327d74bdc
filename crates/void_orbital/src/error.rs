//! Error types for orbital reach

use thiserror::Error;

/// Orbital reach errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrbitalError {
    /// A drive is already running for another request
    #[error("Orbital drive already active")]
    Busy,

    /// Calibration values are inconsistent
    #[error("Invalid orbital configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for orbital operations
pub type Result<T> = std::result::Result<T, OrbitalError>;
