//! Error types for the Wayfinder planning core

use thiserror::Error;

/// Wayfinder core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("location ({x:.1}, {y:.1}) is unreachable: no walkable cell within snap radius")]
    Unreachable { x: f64, y: f64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("calibration error: {0}")]
    Calibration(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
