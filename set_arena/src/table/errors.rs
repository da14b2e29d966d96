//! Table error types.

use crate::game::entities::{ClaimId, PlayerId};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the table actors and their handles
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The dealer no longer accepts messages
    #[error("Dealer is closed")]
    DealerClosed,

    /// The dealer dropped a claim without answering it
    #[error("No verdict received for claim {0}")]
    VerdictDropped(ClaimId),

    /// Configuration rejected at startup
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// No such player in this game
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Actors did not stop within the grace period
    #[error("Shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    /// An actor task panicked or was aborted
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TableError::InvalidConfig {
            field: "table_size",
            reason: "Must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for table_size: Must be greater than 0"
        );
        assert_eq!(TableError::UnknownPlayer(4).to_string(), "Unknown player 4");
    }
}
