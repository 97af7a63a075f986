// crates/verinet-core/src/lib.rs
//
// verinet-core: Core types, claim identity, and error primitives for the
// Verinet content-verification network.
//
// This is the leaf crate that the other crates in the workspace depend on.
// It defines the claim record and its weighted-majority result, voter
// identities and behavioral kinds, claim id derivation, and the error type.

pub mod claim;
pub mod crypto;
pub mod error;
pub mod identity;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use verinet_core::ClaimRecord;`

// Claim types
pub use claim::{validate_category, ClaimId, ClaimRecord, ClaimResult, TrustWeights, CATEGORY_RANGE};

// Identity types
pub use identity::{VoterId, VoterKind};

// Error type
pub use error::VerinetError;
