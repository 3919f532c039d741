//! Configuration errors
//!
//! Gameplay decisions (a missed jump window, a refused switch, a probe that
//! finds nothing) are never errors. Only tuning that cannot drive a component
//! ends up here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("required component missing: {component}")]
    MissingComponent { component: &'static str },
}

/// Reject zero, negative and NaN values
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
