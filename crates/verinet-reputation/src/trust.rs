// crates/verinet-reputation/src/trust.rs
//
// Trust formula: the share of a voter's votes that agreed with the
// reference outcome (weighted-majority result or ground truth).

use serde::{Deserialize, Serialize};

/// Trust value for a voter with the given agreement counts.
///
/// Returns 1.0 when the voter has no qualifying votes.
pub fn calculate_trust(correct: u64, incorrect: u64) -> f64 {
    let total = correct + incorrect;
    if total == 0 {
        1.0
    } else {
        correct as f64 / total as f64
    }
}

/// Running count of agreeing and disagreeing votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub correct: u64,
    pub incorrect: u64,
}

impl VoteTally {
    /// Count one vote.
    pub fn record(&mut self, agreed: bool) {
        if agreed {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }

    /// [`calculate_trust`] over this tally.
    pub fn trust(&self) -> f64 {
        calculate_trust(self.correct, self.incorrect)
    }
}
