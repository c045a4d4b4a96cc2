//! Error types shared across the sounding core.
//!
//! Three failure classes with distinct propagation policies:
//!
//! - [`CoreError::MalformedRecord`] is recovered locally: the offending row is
//!   dropped and counted, the batch continues.
//! - [`CoreError::InsufficientData`] is an explicit "no result" outcome for
//!   empty or too-small inputs; it is never silently zero-filled.
//! - [`CoreError::InvalidConfiguration`] is fatal at configuration-validation
//!   time, before any simulation or analysis runs.
//!
//! "No inversion found" and similar negative findings are normal results, not
//! errors.

use thiserror::Error;

/// Errors produced by the simulation and analysis core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required numeric field was missing or failed to parse.
    ///
    /// Recovered locally by batch loaders: the record is skipped and the skip
    /// is counted, never fatal to the batch.
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord {
        /// Row number in the input batch, 1-based as reported to operators.
        row: usize,
        /// Field name and cause, e.g. `"pm2_5: not a number"`.
        reason: String,
    },

    /// Fewer samples than the operation needs to produce a meaningful result.
    #[error("insufficient data: needed {needed} samples, got {got}")]
    InsufficientData {
        /// Minimum sample count the operation requires.
        needed: usize,
        /// Samples actually available.
        got: usize,
    },

    /// Configuration rejected before any run, e.g. altitude thresholds out of
    /// physical order.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable cause.
        reason: String,
    },
}

impl CoreError {
    /// Shorthand for an [`CoreError::InvalidConfiguration`] with a formatted reason.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        CoreError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InsufficientData { needed: 2, got: 0 };
        assert_eq!(err.to_string(), "insufficient data: needed 2 samples, got 0");

        let err = CoreError::invalid_config("deploy altitude above separation altitude");
        assert!(err.to_string().contains("deploy altitude"));
    }
}
