// crates/verinet-sim/src/agent.rs
//
// Simulated voter: one identity, one behavioral kind, and three recurring
// behaviors (publish, vote, query) driven by the scheduler.

use std::collections::HashSet;
use std::fmt;

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use verinet_core::{ClaimId, ClaimResult, VerinetError, VoterId, VoterKind};
use verinet_reputation::{TrustLedger, VoteOutcome};

/// Length of generated claim titles.
const TITLE_LEN: usize = 15;
/// Length of generated claim contents.
const CONTENT_LEN: usize = 100;

/// The three recurring behaviors every agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Publisher,
    Voter,
    Querier,
}

impl Behavior {
    /// Start order used by the driver.
    pub const ALL: [Behavior; 3] = [Behavior::Publisher, Behavior::Voter, Behavior::Querier];
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Publisher => write!(f, "publisher"),
            Behavior::Voter => write!(f, "voter"),
            Behavior::Querier => write!(f, "querier"),
        }
    }
}

/// Tally of one voting round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteRound {
    pub accepted: u64,
    pub duplicate: u64,
    pub rejected: u64,
}

/// What one behavior step did.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Published(ClaimId),
    PublishRejected,
    Voted(VoteRound),
    Queried(ClaimId, ClaimResult),
    NothingToQuery,
}

/// One simulated voter.
#[derive(Debug, Clone)]
pub struct Agent {
    id: VoterId,
    kind: VoterKind,
    /// Claims this agent has already voted on.
    voted_claims: HashSet<ClaimId>,
}

impl Agent {
    pub fn new(id: VoterId, kind: VoterKind) -> Self {
        Self {
            id,
            kind,
            voted_claims: HashSet::new(),
        }
    }

    pub fn id(&self) -> VoterId {
        self.id
    }

    pub fn kind(&self) -> VoterKind {
        self.kind
    }

    pub fn voted_count(&self) -> usize {
        self.voted_claims.len()
    }

    pub fn has_voted(&self, claim: &ClaimId) -> bool {
        self.voted_claims.contains(claim)
    }

    /// Vote this agent casts on a claim with the given ground truth.
    ///
    /// Malicious agents always negate the truth without consulting `rng`.
    pub fn decide_vote<R: Rng + ?Sized>(&self, ground_truth: bool, rng: &mut R) -> bool {
        match self.kind {
            VoterKind::Malicious => !ground_truth,
            kind => {
                if rng.gen_bool(kind.honesty()) {
                    ground_truth
                } else {
                    !ground_truth
                }
            }
        }
    }

    /// Run one step of `behavior` against the ledger.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        behavior: Behavior,
        ledger: &mut TrustLedger,
        rng: &mut R,
    ) -> Action {
        match behavior {
            Behavior::Publisher => match self.publish(ledger, rng) {
                Ok(id) => Action::Published(id),
                Err(_) => Action::PublishRejected,
            },
            Behavior::Voter => Action::Voted(self.vote_round(ledger, rng)),
            Behavior::Querier => match self.query(ledger, rng) {
                Some((id, result)) => Action::Queried(id, result),
                None => Action::NothingToQuery,
            },
        }
    }

    /// Publish a synthetic claim with a fair-coin ground truth.
    pub fn publish<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut TrustLedger,
        rng: &mut R,
    ) -> Result<ClaimId, VerinetError> {
        let title = random_text(rng, TITLE_LEN);
        let content = random_text(rng, CONTENT_LEN);
        let category: u8 = rng.gen_range(1..=10);
        let ground_truth = rng.gen_bool(0.5);

        let claim = ledger.publish(Some(category), &title, &content, self.id, ground_truth)?;
        tracing::debug!("Voter {} uploads claim {}", self.id, claim.id().short());
        Ok(claim.id().clone())
    }

    /// Vote on every claim this agent has not voted on yet, in publish
    /// order.
    ///
    /// Every claim is marked locally once its vote is submitted, whatever
    /// the ledger answers. Claims seen while deregistered are never
    /// revisited after re-registration.
    pub fn vote_round<R: Rng + ?Sized>(&mut self, ledger: &mut TrustLedger, rng: &mut R) -> VoteRound {
        let pending: Vec<(ClaimId, bool)> = ledger
            .claims()
            .iter()
            .filter(|claim| !self.voted_claims.contains(claim.id()))
            .map(|claim| (claim.id().clone(), claim.ground_truth()))
            .collect();

        let mut round = VoteRound::default();
        for (claim_id, ground_truth) in pending {
            let vote = self.decide_vote(ground_truth, rng);
            match ledger.cast_vote(self.id, &claim_id, vote) {
                VoteOutcome::Accepted => round.accepted += 1,
                VoteOutcome::Duplicate => round.duplicate += 1,
                VoteOutcome::UnregisteredVoter | VoteOutcome::UnknownClaim => round.rejected += 1,
            }
            self.voted_claims.insert(claim_id);
        }

        if round.accepted > 0 {
            tracing::debug!("Voter {} cast {} votes", self.id, round.accepted);
        }
        round
    }

    /// Ask for the current result of one claim chosen uniformly at random.
    pub fn query<R: Rng + ?Sized>(
        &self,
        ledger: &TrustLedger,
        rng: &mut R,
    ) -> Option<(ClaimId, ClaimResult)> {
        let claim = ledger.claims().choose(rng)?;
        let result = ledger.result_of(claim);
        tracing::debug!(
            "Voter {} asks for claim {}: {}",
            self.id,
            claim.id().short(),
            result
        );
        Some((claim.id().clone(), result))
    }
}

fn random_text<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn ledger_with(ids: &[u32]) -> TrustLedger {
        let mut ledger = TrustLedger::new();
        for &id in ids {
            ledger.register(VoterId(id));
        }
        ledger
    }

    #[test]
    fn test_malicious_always_negates() {
        let agent = Agent::new(VoterId(1), VoterKind::Malicious);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(!agent.decide_vote(true, &mut rng));
            assert!(agent.decide_vote(false, &mut rng));
        }
    }

    #[test]
    fn test_honest_kinds_follow_truth_at_their_rate() {
        let mut rng = StdRng::seed_from_u64(7);
        for (kind, expected) in [(VoterKind::Trustworthy, 0.7), (VoterKind::VeryTrustworthy, 0.9)] {
            let agent = Agent::new(VoterId(1), kind);
            let trials = 20_000;
            let truthful = (0..trials)
                .filter(|_| agent.decide_vote(true, &mut rng))
                .count();
            let rate = truthful as f64 / trials as f64;
            assert!((rate - expected).abs() < 0.02, "{:?} rate {}", kind, rate);
        }
    }

    #[test]
    fn test_publish_appends_claim() {
        let mut ledger = ledger_with(&[1]);
        let mut agent = Agent::new(VoterId(1), VoterKind::Trustworthy);
        let mut rng = StdRng::seed_from_u64(3);

        let id = agent.publish(&mut ledger, &mut rng).unwrap();
        let claim = ledger.claim(&id).unwrap();
        assert_eq!(claim.author(), VoterId(1));
        assert_eq!(claim.title().len(), TITLE_LEN);
        assert_eq!(claim.content().len(), CONTENT_LEN);
        assert!(claim.category().map_or(false, |c| (1..=10).contains(&c)));
    }

    #[test]
    fn test_vote_round_covers_each_claim_once() {
        let mut ledger = ledger_with(&[1, 2]);
        let mut author = Agent::new(VoterId(2), VoterKind::Trustworthy);
        let mut agent = Agent::new(VoterId(1), VoterKind::VeryTrustworthy);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..3 {
            author.publish(&mut ledger, &mut rng).unwrap();
        }

        let first = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(first.accepted, 3);
        assert_eq!(agent.voted_count(), 3);

        let second = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(second, VoteRound::default());

        author.publish(&mut ledger, &mut rng).unwrap();
        let third = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(third.accepted, 1);
    }

    #[test]
    fn test_deregistered_agent_does_not_catch_up() {
        let mut ledger = ledger_with(&[1, 2]);
        let mut author = Agent::new(VoterId(2), VoterKind::Trustworthy);
        let mut agent = Agent::new(VoterId(1), VoterKind::Malicious);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..3 {
            author.publish(&mut ledger, &mut rng).unwrap();
        }

        ledger.deregister(VoterId(1));
        let round = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(round.accepted, 0);
        assert_eq!(round.rejected, 3);
        assert_eq!(agent.voted_count(), 3);

        ledger.register(VoterId(1));
        let round = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(round, VoteRound::default());
        assert!(ledger.claims().iter().all(|c| c.vote_of(VoterId(1)).is_none()));

        // Claims published after re-registration are voted on as usual.
        author.publish(&mut ledger, &mut rng).unwrap();
        let round = agent.vote_round(&mut ledger, &mut rng);
        assert_eq!(round.accepted, 1);
    }

    #[test]
    fn test_query_empty_ledger() {
        let ledger = ledger_with(&[1]);
        let agent = Agent::new(VoterId(1), VoterKind::Trustworthy);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(agent.query(&ledger, &mut rng).is_none());
    }

    #[test]
    fn test_query_does_not_mutate() {
        let mut ledger = ledger_with(&[1]);
        let mut agent = Agent::new(VoterId(1), VoterKind::Trustworthy);
        let mut rng = StdRng::seed_from_u64(0);
        agent.publish(&mut ledger, &mut rng).unwrap();

        let weights_before = ledger.trust_weights().clone();
        let (_, result) = agent.query(&ledger, &mut rng).unwrap();
        assert_eq!(result, ClaimResult::Undetermined);
        assert_eq!(ledger.trust_weights(), &weights_before);
    }

    #[test]
    fn test_act_dispatches() {
        let mut ledger = ledger_with(&[1]);
        let mut agent = Agent::new(VoterId(1), VoterKind::Trustworthy);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(
            agent.act(Behavior::Querier, &mut ledger, &mut rng),
            Action::NothingToQuery
        );
        assert!(matches!(
            agent.act(Behavior::Publisher, &mut ledger, &mut rng),
            Action::Published(_)
        ));
        assert!(matches!(
            agent.act(Behavior::Voter, &mut ledger, &mut rng),
            Action::Voted(VoteRound { accepted: 1, .. })
        ));
    }
}
