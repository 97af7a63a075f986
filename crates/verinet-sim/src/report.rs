// crates/verinet-sim/src/report.rs
//
// Post-run reports: the human-readable info.txt and the machine-readable
// stats.json export.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use verinet_core::{VerinetError, VoterId, VoterKind};
use verinet_reputation::TrustPoint;

use crate::driver::{SimulationDriver, SimulationOutcome};
use crate::scheduler::SimTime;

pub const INFO_FILE: &str = "info.txt";
pub const STATS_FILE: &str = "stats.json";

const RULE: &str = "==============================================";

/// One voter's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterRow {
    pub id: VoterId,
    pub kind: VoterKind,
    pub votes: u64,
    pub correct_votes: u64,
    pub incorrect_votes: u64,
    pub trust_weight: f64,
    pub actual_correct_votes: u64,
    pub actual_incorrect_votes: u64,
    pub actual_trust_weight: f64,
}

/// Mean of one kind's trust series at one sample.
///
/// The means are `None` when no voter has that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindMeanPoint {
    /// Claims published up to this sample.
    pub claims: usize,
    pub mean_trust_weight: Option<f64>,
    pub mean_correct_votes: Option<f64>,
    pub mean_incorrect_votes: Option<f64>,
}

/// Per-kind summary: head count plus the mean trust series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSeries {
    pub kind: VoterKind,
    pub voters: usize,
    pub points: Vec<KindMeanPoint>,
}

/// Everything written after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub duration: SimTime,
    pub voters: usize,
    pub very_trustworthy_pct: u8,
    pub trustworthy_pct: u8,
    pub malicious_pct: u8,
    pub claims: usize,
    pub report_interval: usize,
    pub voter_rows: Vec<VoterRow>,
    pub kinds: Vec<KindSeries>,
    /// Raw per-voter series from the ledger.
    pub stats: BTreeMap<VoterId, Vec<TrustPoint>>,
}

impl SimulationReport {
    /// Collect the report from a finished driver.
    pub fn build(
        driver: &SimulationDriver,
        outcome: &SimulationOutcome,
    ) -> Result<Self, VerinetError> {
        let config = driver.config();
        let ledger = driver.ledger();
        let kinds = driver.voter_kinds();
        let stats = ledger.report_stats(config.report_interval)?;

        let voter_rows = ledger
            .per_voter_info()
            .into_iter()
            .filter_map(|(id, info)| {
                let kind = *kinds.get(&id)?;
                Some(VoterRow {
                    id,
                    kind,
                    votes: info.total_votes(),
                    correct_votes: info.correct_votes,
                    incorrect_votes: info.incorrect_votes,
                    trust_weight: info.trust_weight,
                    actual_correct_votes: info.actual_correct_votes,
                    actual_incorrect_votes: info.actual_incorrect_votes,
                    actual_trust_weight: info.actual_trust_weight,
                })
            })
            .collect();

        let samples = 1 + ledger.claim_count() / config.report_interval;
        let kind_series = VoterKind::ALL
            .iter()
            .map(|&kind| kind_means(kind, &kinds, &stats, samples, config.report_interval))
            .collect();

        Ok(Self {
            run_id: outcome.run_id,
            generated_at: Utc::now(),
            seed: config.seed,
            duration: config.duration,
            voters: config.voters,
            very_trustworthy_pct: config.very_trustworthy_pct,
            trustworthy_pct: config.trustworthy_pct(),
            malicious_pct: config.malicious_pct,
            claims: ledger.claim_count(),
            report_interval: config.report_interval,
            voter_rows,
            kinds: kind_series,
            stats,
        })
    }

    /// Write info.txt into `dir`. Returns the written path.
    pub fn write_info(&self, dir: &Path) -> Result<PathBuf, VerinetError> {
        let path = dir.join(INFO_FILE);
        fs::write(&path, self.to_string())?;
        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write stats.json into `dir`. Returns the written path.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf, VerinetError> {
        let path = dir.join(STATS_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }
}

fn kind_means(
    kind: VoterKind,
    kinds: &BTreeMap<VoterId, VoterKind>,
    stats: &BTreeMap<VoterId, Vec<TrustPoint>>,
    samples: usize,
    interval: usize,
) -> KindSeries {
    let members: Vec<&Vec<TrustPoint>> = stats
        .iter()
        .filter(|(id, _)| kinds.get(id) == Some(&kind))
        .map(|(_, series)| series)
        .collect();

    let points = (0..samples)
        .map(|tick| {
            let claims = tick * interval;
            if members.is_empty() {
                return KindMeanPoint {
                    claims,
                    mean_trust_weight: None,
                    mean_correct_votes: None,
                    mean_incorrect_votes: None,
                };
            }
            let n = members.len() as f64;
            let (mut trust, mut correct, mut incorrect) = (0.0, 0.0, 0.0);
            for point in members.iter().filter_map(|series| series.get(tick)) {
                trust += point.trust_weight;
                correct += point.correct_votes as f64;
                incorrect += point.incorrect_votes as f64;
            }
            KindMeanPoint {
                claims,
                mean_trust_weight: Some(trust / n),
                mean_correct_votes: Some(correct / n),
                mean_incorrect_votes: Some(incorrect / n),
            }
        })
        .collect();

    KindSeries {
        kind,
        voters: members.len(),
        points,
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation time: {}", self.duration)?;
        writeln!(f, "Number of voters in the network (N): {}", self.voters)?;
        writeln!(
            f,
            "Percentage of very trustworthy voters (p): {}",
            self.very_trustworthy_pct
        )?;
        writeln!(
            f,
            "Percentage of trustworthy voters (100-p-q): {}",
            self.trustworthy_pct
        )?;
        writeln!(f, "Percentage of malicious voters (q): {}", self.malicious_pct)?;
        writeln!(f, "Number of articles published for voting: {}", self.claims)?;
        writeln!(f, "Run id: {}", self.run_id)?;
        writeln!(f, "Seed: {}", self.seed)?;
        writeln!(f, "{}", RULE)?;

        writeln!(
            f,
            "ID,Type,Votes,Correct Votes,Incorrect Votes,Trustworthiness,\
             Actual Correct Votes,Actual Incorrect Votes,Actual Trustworthiness"
        )?;
        for row in &self.voter_rows {
            writeln!(
                f,
                "{},{},{},{},{},{:.4},{},{},{:.4}",
                row.id,
                row.kind.code(),
                row.votes,
                row.correct_votes,
                row.incorrect_votes,
                row.trust_weight,
                row.actual_correct_votes,
                row.actual_incorrect_votes,
                row.actual_trust_weight
            )?;
        }

        writeln!(f, "{}", RULE)?;
        writeln!(f, "Statistics")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Type,Number of Voters")?;
        for series in &self.kinds {
            writeln!(f, "{},{}", series.kind.code(), series.voters)?;
        }

        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "Type,Article's Count,Mean Trustworthiness,Mean Correct Votes,Mean Incorrect Votes"
        )?;
        for series in &self.kinds {
            for point in &series.points {
                match (
                    point.mean_trust_weight,
                    point.mean_correct_votes,
                    point.mean_incorrect_votes,
                ) {
                    (Some(trust), Some(correct), Some(incorrect)) => writeln!(
                        f,
                        "{},{},{:.4},{},{}",
                        series.kind.code(),
                        point.claims,
                        trust,
                        correct,
                        incorrect
                    )?,
                    _ => writeln!(f, "{},{},NA,0,0", series.kind.code(), point.claims)?,
                }
            }
        }

        writeln!(f, "{}", RULE)?;
        writeln!(f, "End of simulation")
    }
}
