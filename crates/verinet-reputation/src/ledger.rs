// crates/verinet-reputation/src/ledger.rs
//
// TrustLedger: voter registry, claim store, and the live trust-weight map.
//
// All mutation happens through `&mut self`, so a single owner (the
// simulation driver) serializes every publish, vote and query. A caller that
// shares the ledger across threads must wrap it in a lock.

use std::collections::{BTreeMap, HashMap};

use verinet_core::{
    validate_category, ClaimId, ClaimRecord, ClaimResult, TrustWeights, VerinetError, VoterId,
};

use crate::trust::VoteTally;

/// Result of [`TrustLedger::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new voter was added with full trust.
    Registered,
    /// A previously deregistered voter is active again.
    Reactivated,
    /// The voter was already active; nothing changed.
    AlreadyActive,
}

/// Result of [`TrustLedger::deregister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeregistrationOutcome {
    /// The voter is now inactive.
    Deregistered,
    /// The voter was already inactive; nothing changed.
    AlreadyInactive,
    /// The voter was never registered; nothing changed.
    Unknown,
}

/// Result of [`TrustLedger::cast_vote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// First vote by this voter on this claim; weights were recomputed.
    Accepted,
    /// The voter already voted on this claim; the earlier vote stands.
    Duplicate,
    /// The voter is unknown or deregistered; nothing changed.
    UnregisteredVoter,
    /// No claim with the given id exists; nothing changed.
    UnknownClaim,
}

impl VoteOutcome {
    pub fn is_accepted(self) -> bool {
        self == VoteOutcome::Accepted
    }
}

/// Registry of voters and claims plus the trust-weight mapping.
#[derive(Debug, Default)]
pub struct TrustLedger {
    /// Every voter ever registered -> active flag.
    registered_voters: BTreeMap<VoterId, bool>,
    /// Claims in publish order.
    claims: Vec<ClaimRecord>,
    /// Claim id -> position in `claims`.
    claim_index: HashMap<ClaimId, usize>,
    /// Live weights; the only copy.
    trust_weights: TrustWeights,
}

impl TrustLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------

    /// Activate a voter. New voters start with trust 1.0.
    pub fn register(&mut self, voter: VoterId) -> RegistrationOutcome {
        match self.registered_voters.get_mut(&voter) {
            Some(active) if *active => {
                tracing::warn!("Voter {} is already registered", voter);
                RegistrationOutcome::AlreadyActive
            }
            Some(active) => {
                *active = true;
                tracing::debug!("Voter {} re-registered", voter);
                RegistrationOutcome::Reactivated
            }
            None => {
                self.registered_voters.insert(voter, true);
                self.trust_weights.entry(voter).or_insert(1.0);
                tracing::debug!("Voter {} registered", voter);
                RegistrationOutcome::Registered
            }
        }
    }

    /// Mark a voter inactive. Its identity, weight and past votes remain.
    pub fn deregister(&mut self, voter: VoterId) -> DeregistrationOutcome {
        match self.registered_voters.get_mut(&voter) {
            Some(active) if *active => {
                *active = false;
                tracing::debug!("Voter {} deregistered", voter);
                DeregistrationOutcome::Deregistered
            }
            Some(_) => {
                tracing::warn!("Voter {} is not registered", voter);
                DeregistrationOutcome::AlreadyInactive
            }
            None => {
                tracing::warn!("Voter {} is not registered", voter);
                DeregistrationOutcome::Unknown
            }
        }
    }

    /// Whether `voter` is currently active.
    pub fn is_active(&self, voter: VoterId) -> bool {
        self.registered_voters.get(&voter).copied().unwrap_or(false)
    }

    /// Every voter ever registered, in id order, with its active flag.
    pub fn registered_voters(&self) -> impl Iterator<Item = (VoterId, bool)> + '_ {
        self.registered_voters.iter().map(|(&v, &active)| (v, active))
    }

    pub fn active_voter_count(&self) -> usize {
        self.registered_voters.values().filter(|&&active| active).count()
    }

    // -----------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------

    /// Create and append a claim.
    ///
    /// Rejects an out-of-range category with
    /// [`VerinetError::InvalidCategory`]; no claim is created.
    pub fn publish(
        &mut self,
        category: Option<u8>,
        title: &str,
        content: &str,
        author: VoterId,
        ground_truth: bool,
    ) -> Result<&ClaimRecord, VerinetError> {
        let claim = match ClaimRecord::new(category, title, content, author, ground_truth) {
            Ok(claim) => claim,
            Err(e) => {
                tracing::warn!("Voter {} publish rejected: {}", author, e);
                return Err(e);
            }
        };
        self.insert_claim(claim)
    }

    /// Append a claim built elsewhere. It must not carry votes yet.
    pub fn insert_claim(&mut self, claim: ClaimRecord) -> Result<&ClaimRecord, VerinetError> {
        if let Err(e) = validate_category(claim.category()) {
            tracing::warn!("Voter {} publish rejected: {}", claim.author(), e);
            return Err(e);
        }
        if self.claim_index.contains_key(claim.id()) {
            return Err(VerinetError::DuplicateClaim(claim.id().to_string()));
        }
        if !claim.votes().is_empty() {
            return Err(VerinetError::InvalidConfig(format!(
                "claim {} already carries {} votes",
                claim.id().short(),
                claim.votes().len()
            )));
        }

        let position = self.claims.len();
        tracing::debug!(
            "Voter {} published claim {} (#{})",
            claim.author(),
            claim.id().short(),
            position
        );
        self.claim_index.insert(claim.id().clone(), position);
        self.claims.push(claim);
        Ok(&self.claims[position])
    }

    /// All claims in publish order.
    pub fn claims(&self) -> &[ClaimRecord] {
        &self.claims
    }

    pub fn claim(&self, id: &ClaimId) -> Option<&ClaimRecord> {
        self.claim_index.get(id).map(|&i| &self.claims[i])
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    // -----------------------------------------------------------------
    // Voting and results
    // -----------------------------------------------------------------

    /// Record `voter`'s vote on a claim.
    ///
    /// A first vote triggers a full trust recomputation; a duplicate vote
    /// leaves both the claim and the weights untouched.
    pub fn cast_vote(&mut self, voter: VoterId, claim_id: &ClaimId, vote: bool) -> VoteOutcome {
        if !self.is_active(voter) {
            tracing::warn!("Voter {} is not registered", voter);
            return VoteOutcome::UnregisteredVoter;
        }
        let Some(&position) = self.claim_index.get(claim_id) else {
            tracing::warn!("Voter {} voted on unknown claim {}", voter, claim_id.short());
            return VoteOutcome::UnknownClaim;
        };

        if !self.claims[position].record_vote(voter, vote) {
            tracing::warn!(
                "Voter {} has already voted on claim {}",
                voter,
                claim_id.short()
            );
            return VoteOutcome::Duplicate;
        }

        tracing::debug!("Voter {} voted {} on claim {}", voter, vote, claim_id.short());
        self.recompute_trust_weights();
        VoteOutcome::Accepted
    }

    /// Weighted-majority result of `claim` under the live weights.
    pub fn result_of(&self, claim: &ClaimRecord) -> ClaimResult {
        claim.result(&self.trust_weights)
    }

    /// [`TrustLedger::result_of`] by id. `None` for an unknown id.
    pub fn result_by_id(&self, id: &ClaimId) -> Option<ClaimResult> {
        self.claim(id).map(|claim| self.result_of(claim))
    }

    /// Current results of every claim, in publish order.
    pub fn current_results(&self) -> Vec<ClaimResult> {
        self.claims.iter().map(|c| self.result_of(c)).collect()
    }

    /// Recompute every voter's weight over every claim.
    ///
    /// Claim results are evaluated once, under the weights as they were
    /// before this call, and the new map is swapped in only after every
    /// voter's weight is known. Cost is O(voters x claims).
    pub fn recompute_trust_weights(&mut self) {
        let results = self.current_results();

        let updated: TrustWeights = self
            .registered_voters
            .keys()
            .map(|&voter| {
                let mut tally = VoteTally::default();
                for (claim, result) in self.claims.iter().zip(&results) {
                    if let Some(vote) = claim.vote_of(voter) {
                        tally.record(result.agrees_with(vote));
                    }
                }
                (voter, tally.trust())
            })
            .collect();

        self.trust_weights = updated;
    }

    /// The live trust-weight mapping.
    pub fn trust_weights(&self) -> &TrustWeights {
        &self.trust_weights
    }

    /// Current weight of `voter`, if it was ever registered.
    pub fn trust_weight(&self, voter: VoterId) -> Option<f64> {
        self.trust_weights.get(&voter).copied()
    }
}
