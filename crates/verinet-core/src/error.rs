// crates/verinet-core/src/error.rs

use thiserror::Error;

/// Protocol-wide error types for the Verinet network.
///
/// Expected misuse of the ledger (duplicate votes, unregistered voters,
/// redundant registrations) is reported through outcome enums instead;
/// this type covers rejected input and I/O at the edges.
#[derive(Debug, Error)]
pub enum VerinetError {
    /// Claim category outside the accepted 1..=10 range.
    #[error("Invalid category: {0} (expected 1..=10)")]
    InvalidCategory(u8),

    /// Configuration or query parameter out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A claim with the same id is already published.
    #[error("Duplicate claim: {0}")]
    DuplicateClaim(String),

    /// Filesystem error while writing reports.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for VerinetError {
    fn from(e: std::io::Error) -> Self {
        VerinetError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for VerinetError {
    fn from(e: serde_json::Error) -> Self {
        VerinetError::Serialization(e.to_string())
    }
}
