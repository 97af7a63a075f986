// crates/verinet-core/src/claim.rs

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::VerinetError;
use crate::identity::VoterId;

/// Accepted claim categories.
pub const CATEGORY_RANGE: RangeInclusive<u8> = 1..=10;

/// Live trust-weight mapping owned by the ledger: voter -> weight in [0, 1].
///
/// Ordered so that every weighted sum is accumulated in the same order on
/// every run.
pub type TrustWeights = BTreeMap<VoterId, f64>;

/// Reject a category outside [`CATEGORY_RANGE`]. `None` is always accepted.
pub fn validate_category(category: Option<u8>) -> Result<(), VerinetError> {
    match category {
        Some(c) if !CATEGORY_RANGE.contains(&c) => Err(VerinetError::InvalidCategory(c)),
        _ => Ok(()),
    }
}

/// Opaque claim identifier: hex-encoded SHA-256 over author, title,
/// content, a random salt, and a second-resolution timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimId(String);

impl ClaimId {
    /// Derive the id for a claim.
    ///
    /// Uniqueness is probabilistic: two publishes collide only if author,
    /// title, content, salt and timestamp all match.
    pub fn derive(
        author: VoterId,
        title: &str,
        content: &str,
        salt: u64,
        published_at: &DateTime<Utc>,
    ) -> Self {
        let article_data = format!(
            "{} publishes {} with content as {}{}{}",
            author,
            title,
            content,
            salt,
            published_at.format("%Y-%m-%d %H:%M:%S")
        );
        ClaimId(crypto::hash_hex(article_data.as_bytes()))
    }

    /// Full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of the weighted-majority computation over a claim's votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimResult {
    /// No votes have been cast on the claim.
    Undetermined,
    /// Trust-weighted "true" votes strictly outweigh "false" votes.
    MajorityTrue,
    /// "False" votes outweigh or tie with "true" votes.
    MajorityFalse,
}

impl ClaimResult {
    /// The binary verdict, if any.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            ClaimResult::Undetermined => None,
            ClaimResult::MajorityTrue => Some(true),
            ClaimResult::MajorityFalse => Some(false),
        }
    }

    /// Whether `vote` matches this result. An undetermined result matches
    /// nothing.
    pub fn agrees_with(self, vote: bool) -> bool {
        self.as_bool() == Some(vote)
    }
}

impl fmt::Display for ClaimResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimResult::Undetermined => write!(f, "undetermined"),
            ClaimResult::MajorityTrue => write!(f, "majority-true"),
            ClaimResult::MajorityFalse => write!(f, "majority-false"),
        }
    }
}

/// A published claim, its fixed ground truth, and its tally of votes.
///
/// Everything except `votes` is fixed at construction. Votes only grow:
/// a voter can vote on a given claim once, and the first vote stands.
/// The claim holds no trust weights of its own; [`ClaimRecord::result`]
/// takes the ledger's current mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredClaim")]
pub struct ClaimRecord {
    id: ClaimId,
    category: Option<u8>,
    title: String,
    content: String,
    author: VoterId,
    ground_truth: bool,
    published_at: DateTime<Utc>,
    votes: BTreeMap<VoterId, bool>,
}

/// Wire form of a [`ClaimRecord`]; the category is checked before a
/// record is built from it.
#[derive(Deserialize)]
struct StoredClaim {
    id: ClaimId,
    category: Option<u8>,
    title: String,
    content: String,
    author: VoterId,
    ground_truth: bool,
    published_at: DateTime<Utc>,
    votes: BTreeMap<VoterId, bool>,
}

impl TryFrom<StoredClaim> for ClaimRecord {
    type Error = VerinetError;

    fn try_from(stored: StoredClaim) -> Result<Self, Self::Error> {
        validate_category(stored.category)?;
        Ok(Self {
            id: stored.id,
            category: stored.category,
            title: stored.title,
            content: stored.content,
            author: stored.author,
            ground_truth: stored.ground_truth,
            published_at: stored.published_at,
            votes: stored.votes,
        })
    }
}

impl ClaimRecord {
    /// Create a claim stamped with the current wall-clock second and a
    /// fresh random salt.
    pub fn new(
        category: Option<u8>,
        title: impl Into<String>,
        content: impl Into<String>,
        author: VoterId,
        ground_truth: bool,
    ) -> Result<Self, VerinetError> {
        let published_at = Utc::now().trunc_subsecs(0);
        let salt: u64 = rand::random();
        Self::new_at(category, title, content, author, ground_truth, published_at, salt)
    }

    /// Create a claim with an explicit timestamp and salt.
    pub fn new_at(
        category: Option<u8>,
        title: impl Into<String>,
        content: impl Into<String>,
        author: VoterId,
        ground_truth: bool,
        published_at: DateTime<Utc>,
        salt: u64,
    ) -> Result<Self, VerinetError> {
        validate_category(category)?;
        let title = title.into();
        let content = content.into();
        let id = ClaimId::derive(author, &title, &content, salt, &published_at);
        Ok(Self {
            id,
            category,
            title,
            content,
            author,
            ground_truth,
            published_at,
            votes: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &ClaimId {
        &self.id
    }

    pub fn category(&self) -> Option<u8> {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> VoterId {
        self.author
    }

    pub fn ground_truth(&self) -> bool {
        self.ground_truth
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// All votes cast on this claim.
    pub fn votes(&self) -> &BTreeMap<VoterId, bool> {
        &self.votes
    }

    /// The vote `voter` cast on this claim, if any.
    pub fn vote_of(&self, voter: VoterId) -> Option<bool> {
        self.votes.get(&voter).copied()
    }

    /// Record a vote. Returns `false` (and keeps the earlier vote) if the
    /// voter already voted on this claim.
    pub fn record_vote(&mut self, voter: VoterId, vote: bool) -> bool {
        if self.votes.contains_key(&voter) {
            return false;
        }
        self.votes.insert(voter, vote);
        true
    }

    /// Weighted majority over the current votes under `weights`.
    ///
    /// Voters with zero or missing weight contribute nothing. Ties resolve
    /// to [`ClaimResult::MajorityFalse`].
    pub fn result(&self, weights: &TrustWeights) -> ClaimResult {
        if self.votes.is_empty() {
            return ClaimResult::Undetermined;
        }

        let mut positive = 0.0_f64;
        let mut negative = 0.0_f64;
        for (voter, &vote) in &self.votes {
            let weight = weights.get(voter).copied().unwrap_or(0.0);
            if weight == 0.0 {
                continue;
            }
            if vote {
                positive += weight;
            } else {
                negative += weight;
            }
        }

        if positive > negative {
            ClaimResult::MajorityTrue
        } else {
            ClaimResult::MajorityFalse
        }
    }
}

impl fmt::Display for ClaimRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Content: {}", self.content)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Timestamp: {}", self.published_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Claim ID: {}", self.id)?;
        writeln!(f, "Ground Truth: {}", self.ground_truth)
    }
}
