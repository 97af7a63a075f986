// crates/verinet-reputation/src/stats.rs
//
// Read-only reporting queries over the ledger: per-voter agreement counts
// and trust time series sampled along publish order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verinet_core::{VerinetError, VoterId};

use crate::ledger::TrustLedger;
use crate::trust::VoteTally;

/// Per-voter agreement summary.
///
/// "Correct" counts compare each vote with the claim's current weighted
/// result; "actual" counts compare it with the claim's ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoterInfo {
    pub correct_votes: u64,
    pub incorrect_votes: u64,
    /// Trust recomputed against the current results.
    pub trust_weight: f64,
    pub actual_correct_votes: u64,
    pub actual_incorrect_votes: u64,
    /// Trust the voter would have if scored against ground truth.
    pub actual_trust_weight: f64,
}

impl VoterInfo {
    pub fn total_votes(&self) -> u64 {
        self.correct_votes + self.incorrect_votes
    }
}

/// One sample of a voter's trust series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustPoint {
    pub trust_weight: f64,
    pub correct_votes: u64,
    pub incorrect_votes: u64,
}

impl TrustPoint {
    /// The point every series starts from.
    pub const ORIGIN: TrustPoint = TrustPoint {
        trust_weight: 1.0,
        correct_votes: 0,
        incorrect_votes: 0,
    };

    fn from_tally(tally: &VoteTally) -> Self {
        Self {
            trust_weight: tally.trust(),
            correct_votes: tally.correct,
            incorrect_votes: tally.incorrect,
        }
    }
}

impl TrustLedger {
    /// Agreement summary for every voter ever registered.
    pub fn per_voter_info(&self) -> BTreeMap<VoterId, VoterInfo> {
        let results = self.current_results();

        self.registered_voters()
            .map(|(voter, _)| {
                let mut against_result = VoteTally::default();
                let mut against_truth = VoteTally::default();
                for (claim, result) in self.claims().iter().zip(&results) {
                    if let Some(vote) = claim.vote_of(voter) {
                        against_truth.record(claim.ground_truth() == vote);
                        against_result.record(result.agrees_with(vote));
                    }
                }
                let info = VoterInfo {
                    correct_votes: against_result.correct,
                    incorrect_votes: against_result.incorrect,
                    trust_weight: against_result.trust(),
                    actual_correct_votes: against_truth.correct,
                    actual_incorrect_votes: against_truth.incorrect,
                    actual_trust_weight: against_truth.trust(),
                };
                (voter, info)
            })
            .collect()
    }

    /// Cumulative trust series per voter, sampled after every
    /// `interval`-th claim in publish order.
    ///
    /// Each series starts at [`TrustPoint::ORIGIN`], so it holds
    /// `1 + claims / interval` points.
    pub fn report_stats(
        &self,
        interval: usize,
    ) -> Result<BTreeMap<VoterId, Vec<TrustPoint>>, VerinetError> {
        if interval == 0 {
            return Err(VerinetError::InvalidConfig(
                "report interval must be at least 1".to_string(),
            ));
        }

        let results = self.current_results();
        let stats = self
            .registered_voters()
            .map(|(voter, _)| {
                let mut series = vec![TrustPoint::ORIGIN];
                let mut tally = VoteTally::default();
                for (i, (claim, result)) in self.claims().iter().zip(&results).enumerate() {
                    if let Some(vote) = claim.vote_of(voter) {
                        tally.record(result.agrees_with(vote));
                    }
                    if (i + 1) % interval == 0 {
                        series.push(TrustPoint::from_tally(&tally));
                    }
                }
                (voter, series)
            })
            .collect();

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use verinet_core::ClaimId;

    use super::*;

    fn setup() -> (TrustLedger, Vec<ClaimId>) {
        let mut ledger = TrustLedger::new();
        for v in 1..=3 {
            ledger.register(VoterId(v));
        }
        let claims = (0..4)
            .map(|i| {
                ledger
                    .publish(None, "t", "c", VoterId(1), i % 2 == 0)
                    .unwrap()
                    .id()
                    .clone()
            })
            .collect();
        (ledger, claims)
    }

    #[test]
    fn test_per_voter_info_counts() {
        let (mut ledger, claims) = setup();
        // Claim 0 has ground truth true; everybody votes true except voter 3.
        ledger.cast_vote(VoterId(1), &claims[0], true);
        ledger.cast_vote(VoterId(2), &claims[0], true);
        ledger.cast_vote(VoterId(3), &claims[0], false);

        let info = ledger.per_voter_info();
        assert_eq!(info.len(), 3);

        let v1 = info[&VoterId(1)];
        assert_eq!(v1.correct_votes, 1);
        assert_eq!(v1.incorrect_votes, 0);
        assert_eq!(v1.actual_correct_votes, 1);
        assert!((v1.trust_weight - 1.0).abs() < 1e-10);

        let v3 = info[&VoterId(3)];
        assert_eq!(v3.incorrect_votes, 1);
        assert_eq!(v3.actual_incorrect_votes, 1);
        assert!((v3.actual_trust_weight - 0.0).abs() < 1e-10);
        assert_eq!(v3.total_votes(), 1);
    }

    #[test]
    fn test_info_for_voter_without_votes() {
        let (ledger, _) = setup();
        let info = ledger.per_voter_info();
        let v2 = info[&VoterId(2)];
        assert_eq!(v2.total_votes(), 0);
        assert!((v2.trust_weight - 1.0).abs() < 1e-10);
        assert!((v2.actual_trust_weight - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_report_stats_shape() {
        let (mut ledger, claims) = setup();
        for claim in &claims {
            ledger.cast_vote(VoterId(1), claim, true);
        }

        let stats = ledger.report_stats(2).unwrap();
        let series = &stats[&VoterId(1)];
        // origin + after claim 2 + after claim 4
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], TrustPoint::ORIGIN);
        assert_eq!(series[1].correct_votes + series[1].incorrect_votes, 2);
        assert_eq!(series[2].correct_votes + series[2].incorrect_votes, 4);

        let idle = &stats[&VoterId(2)];
        assert!(idle.iter().all(|p| p.correct_votes == 0 && p.incorrect_votes == 0));
    }

    #[test]
    fn test_report_stats_rejects_zero_interval() {
        let (ledger, _) = setup();
        assert!(matches!(
            ledger.report_stats(0),
            Err(VerinetError::InvalidConfig(_))
        ));
    }
}
