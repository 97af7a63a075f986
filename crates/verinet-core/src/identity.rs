// crates/verinet-core/src/identity.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a voter on the Verinet network.
///
/// Voter ids are assigned by the simulation driver (1..=N) and are stable
/// for the whole run, including across deregistration and re-registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoterId(pub u32);

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VoterId {
    fn from(id: u32) -> Self {
        VoterId(id)
    }
}

/// Behavioral policy of a simulated voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoterKind {
    /// Always votes the negation of the ground truth.
    Malicious,
    /// Votes the ground truth with probability 0.7.
    Trustworthy,
    /// Votes the ground truth with probability 0.9.
    VeryTrustworthy,
}

impl VoterKind {
    /// All kinds, in report order.
    pub const ALL: [VoterKind; 3] = [
        VoterKind::Malicious,
        VoterKind::Trustworthy,
        VoterKind::VeryTrustworthy,
    ];

    /// Numeric code used in report files (0 = malicious, 1 = trustworthy,
    /// 2 = very trustworthy).
    pub fn code(self) -> u8 {
        match self {
            VoterKind::Malicious => 0,
            VoterKind::Trustworthy => 1,
            VoterKind::VeryTrustworthy => 2,
        }
    }

    /// Probability that a voter of this kind reports the ground truth.
    pub fn honesty(self) -> f64 {
        match self {
            VoterKind::Malicious => 0.0,
            VoterKind::Trustworthy => 0.7,
            VoterKind::VeryTrustworthy => 0.9,
        }
    }

    /// Report label.
    pub fn label(self) -> &'static str {
        match self {
            VoterKind::Malicious => "malicious",
            VoterKind::Trustworthy => "trustworthy",
            VoterKind::VeryTrustworthy => "very_trustworthy",
        }
    }
}

impl fmt::Display for VoterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
