// crates/verinet-sim/tests/integration_simulation.rs
//
// End-to-end tests for the Verinet simulator.
//
// Drives full simulations through the public API of verinet-sim and checks
// reproducibility, trust bounds, deregistration, and the written reports.

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use verinet_core::{ClaimResult, VoterId};
use verinet_reputation::{TrustLedger, VoteOutcome};
use verinet_sim::report::{INFO_FILE, STATS_FILE};
use verinet_sim::{SimConfig, SimTask, SimulationDriver, SimulationReport};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory using UUID to avoid conflicts.
fn temp_dir(label: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("verinet_test_{}_{}", label, Uuid::now_v7()));
    fs::create_dir_all(&path).unwrap();
    path
}

fn traced(seed: u64) -> SimConfig {
    SimConfig {
        voters: 10,
        duration: 80,
        articles_per_voter: 4,
        query_interval: 7,
        seed,
        record_trace: true,
        ..Default::default()
    }
}

fn votes_by(ledger: &TrustLedger, voter: VoterId) -> usize {
    ledger
        .claims()
        .iter()
        .filter(|claim| claim.vote_of(voter).is_some())
        .count()
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn test_same_seed_reproduces_trace_and_weights() {
    let mut first = SimulationDriver::new(traced(99)).unwrap();
    let mut second = SimulationDriver::new(traced(99)).unwrap();
    let a = first.run();
    let b = second.run();

    assert_eq!(a.trace, b.trace);
    assert_eq!(a.trust_weights, b.trust_weights);
    assert_eq!(a.counters, b.counters);
    assert_eq!(first.voter_kinds(), second.voter_kinds());
    assert_ne!(a.run_id, b.run_id);

    let votes_a: Vec<_> = first.ledger().claims().iter().map(|c| c.votes().clone()).collect();
    let votes_b: Vec<_> = second.ledger().claims().iter().map(|c| c.votes().clone()).collect();
    assert_eq!(votes_a, votes_b);
}

#[test]
fn test_trace_is_ordered_by_time_then_sequence() {
    let mut driver = SimulationDriver::new(traced(5)).unwrap();
    let outcome = driver.run();
    let trace = outcome.trace.unwrap();

    assert_eq!(trace.len() as u64, outcome.resumptions);
    for pair in trace.windows(2) {
        assert!(
            (pair[0].at, pair[0].seq) < (pair[1].at, pair[1].seq),
            "out of order: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
    assert!(trace.iter().all(|e| e.at < 80));
    assert!(trace.iter().any(|e| e.task == SimTask::Clock));
}

// ---------------------------------------------------------------------------
// Trust dynamics
// ---------------------------------------------------------------------------

#[test]
fn test_trust_weights_stay_in_unit_interval() {
    for seed in [1, 2, 3] {
        let mut driver = SimulationDriver::new(SimConfig {
            voters: 15,
            duration: 100,
            seed,
            ..Default::default()
        })
        .unwrap();
        let outcome = driver.run();
        for (voter, w) in &outcome.trust_weights {
            assert!((0.0..=1.0).contains(w), "voter {} weight {}", voter, w);
        }
        for info in driver.ledger().per_voter_info().values() {
            assert!((0.0..=1.0).contains(&info.actual_trust_weight));
        }
    }
}

#[test]
fn test_honest_network_keeps_high_trust() {
    let mut driver = SimulationDriver::new(SimConfig {
        voters: 20,
        duration: 100,
        very_trustworthy_pct: 100,
        malicious_pct: 0,
        seed: 8,
        ..Default::default()
    })
    .unwrap();
    let outcome = driver.run();

    let mean: f64 =
        outcome.trust_weights.values().sum::<f64>() / outcome.trust_weights.len() as f64;
    assert!(mean > 0.75, "mean trust {}", mean);
}

#[test]
fn test_five_voter_scenario_through_public_api() {
    let mut ledger = TrustLedger::new();
    for v in 1..=5 {
        ledger.register(VoterId(v));
    }
    let claim = ledger
        .publish(Some(3), "title", "content", VoterId(1), true)
        .unwrap()
        .id()
        .clone();

    for (v, vote) in (1..=5).zip([true, true, false, true, false]) {
        assert_eq!(ledger.cast_vote(VoterId(v), &claim, vote), VoteOutcome::Accepted);
    }

    assert_eq!(ledger.result_by_id(&claim), Some(ClaimResult::MajorityTrue));
    let w = |v: u32| ledger.trust_weight(VoterId(v)).unwrap();
    for yes in [1, 2, 4] {
        for no in [3, 5] {
            assert!(w(yes) >= w(no));
        }
    }
}

// ---------------------------------------------------------------------------
// Deregistration
// ---------------------------------------------------------------------------

#[test]
fn test_deregistered_voter_stops_voting_mid_run() {
    let mut driver = SimulationDriver::new(SimConfig {
        voters: 4,
        duration: 60,
        articles_per_voter: 6,
        seed: 21,
        ..Default::default()
    })
    .unwrap();

    driver.run_until(30);
    let before = votes_by(driver.ledger(), VoterId(1));
    assert_eq!(before, driver.ledger().claim_count());

    driver.ledger_mut().deregister(VoterId(1));
    let rejected_before = driver.counters().votes_rejected;
    driver.run_until(60);

    assert!(driver.ledger().claim_count() > before);
    assert_eq!(votes_by(driver.ledger(), VoterId(1)), before);
    assert!(driver.counters().votes_rejected > rejected_before);
    // Past votes still count toward recomputation.
    assert!(driver.ledger().trust_weights().contains_key(&VoterId(1)));

    let late = driver.ledger().claims().last().unwrap().id().clone();
    assert_eq!(
        driver.ledger_mut().cast_vote(VoterId(1), &late, true),
        driver.ledger_mut().cast_vote(VoterId(99), &late, true)
    );
}

#[test]
fn test_reregistered_voter_skips_claims_from_inactive_window() {
    let mut driver = SimulationDriver::new(SimConfig {
        voters: 4,
        duration: 90,
        articles_per_voter: 9,
        seed: 13,
        ..Default::default()
    })
    .unwrap();

    // Publishes every 10; claims from t=30 and t=40 land while voter 1 is
    // inactive.
    driver.run_until(30);
    let active_before = driver.ledger().claim_count();
    driver.ledger_mut().deregister(VoterId(1));
    driver.run_until(50);
    let inactive_window = driver.ledger().claim_count();
    driver.ledger_mut().register(VoterId(1));
    driver.run_until(90);

    let claims = driver.ledger().claims();
    assert!(claims.len() > inactive_window);
    for (i, claim) in claims.iter().enumerate() {
        let voted = claim.vote_of(VoterId(1)).is_some();
        let skipped = (active_before..inactive_window).contains(&i);
        assert_eq!(voted, !skipped, "claim #{} voted={}", i, voted);
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn test_report_files_are_written() {
    let dir = temp_dir("report");
    let mut driver = SimulationDriver::new(SimConfig {
        voters: 6,
        duration: 50,
        report_interval: 5,
        seed: 4,
        ..Default::default()
    })
    .unwrap();
    let outcome = driver.run();
    let report = SimulationReport::build(&driver, &outcome).unwrap();

    let info_path = report.write_info(&dir).unwrap();
    let json_path = report.write_json(&dir).unwrap();
    assert_eq!(info_path, dir.join(INFO_FILE));
    assert_eq!(json_path, dir.join(STATS_FILE));

    let info = fs::read_to_string(&info_path).unwrap();
    assert!(info.contains("Number of voters in the network (N): 6"));
    assert!(info.ends_with("End of simulation\n"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["voters"], 6);
    assert_eq!(json["voter_rows"].as_array().unwrap().len(), 6);
    let series = json["stats"]["1"].as_array().unwrap();
    assert_eq!(series.len(), 1 + report.claims / 5);
    assert_eq!(series[0]["trust_weight"], 1.0);

    fs::remove_dir_all(&dir).unwrap();
}
