// crates/verinet-reputation/src/lib.rs
//
// verinet-reputation: Voter registry, weighted-majority voting, and trust
// recomputation for the Verinet network.
//
// The ledger owns the only trust-weight mapping. Every accepted vote
// triggers a full recomputation of every voter's weight over every claim,
// and every claim result is computed against the live mapping.

pub mod ledger;
pub mod stats;
pub mod trust;

pub use ledger::{DeregistrationOutcome, RegistrationOutcome, TrustLedger, VoteOutcome};
pub use stats::{TrustPoint, VoterInfo};
pub use trust::{calculate_trust, VoteTally};
