// crates/verinet-sim/src/config.rs
//
// Runtime configuration for a simulation run.
// Loaded from a TOML file or populated with sensible defaults, then
// overridden by command-line flags.

use std::fs;

use serde::{Deserialize, Serialize};
use verinet_core::VerinetError;

use crate::scheduler::SimTime;

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimConfig {
    /// Number of voters (N).
    #[serde(default = "default_voters")]
    pub voters: usize,

    /// Percentage of very trustworthy voters (p).
    #[serde(default = "default_very_trustworthy_pct")]
    pub very_trustworthy_pct: u8,

    /// Percentage of malicious voters (q).
    #[serde(default = "default_malicious_pct")]
    pub malicious_pct: u8,

    /// Claims each voter publishes over the run (A).
    #[serde(default = "default_articles_per_voter")]
    pub articles_per_voter: u64,

    /// Total simulated duration (T_sim).
    #[serde(default = "default_duration")]
    pub duration: SimTime,

    /// Claims between two trust samples in the report (I).
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,

    /// Seed for every random decision the simulation makes.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Time between two voting rounds of an agent.
    #[serde(default = "default_vote_interval")]
    pub vote_interval: SimTime,

    /// Time between two result queries of an agent.
    #[serde(default = "default_query_interval")]
    pub query_interval: SimTime,

    /// Time between two clock log lines.
    #[serde(default = "default_clock_interval")]
    pub clock_interval: SimTime,

    /// Directory for report files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Keep every scheduler wakeup in the run outcome.
    #[serde(default)]
    pub record_trace: bool,
}

fn default_voters() -> usize {
    50
}

fn default_very_trustworthy_pct() -> u8 {
    50
}

fn default_malicious_pct() -> u8 {
    20
}

fn default_articles_per_voter() -> u64 {
    4
}

fn default_duration() -> SimTime {
    400
}

fn default_report_interval() -> usize {
    50
}

fn default_seed() -> u64 {
    42
}

fn default_vote_interval() -> SimTime {
    1
}

fn default_query_interval() -> SimTime {
    50
}

fn default_clock_interval() -> SimTime {
    10
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            voters: default_voters(),
            very_trustworthy_pct: default_very_trustworthy_pct(),
            malicious_pct: default_malicious_pct(),
            articles_per_voter: default_articles_per_voter(),
            duration: default_duration(),
            report_interval: default_report_interval(),
            seed: default_seed(),
            vote_interval: default_vote_interval(),
            query_interval: default_query_interval(),
            clock_interval: default_clock_interval(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            record_trace: false,
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check every parameter range. The driver refuses an invalid config.
    pub fn validate(&self) -> Result<(), VerinetError> {
        let invalid = |msg: String| Err(VerinetError::InvalidConfig(msg));

        if self.voters < 1 {
            return invalid("number of voters (N) should be at least 1".to_string());
        }
        if self.very_trustworthy_pct > 100 {
            return invalid(format!(
                "percentage of very trustworthy voters (p) should be between 0 and 100, got {}",
                self.very_trustworthy_pct
            ));
        }
        if self.malicious_pct > 100 {
            return invalid(format!(
                "percentage of malicious voters (q) should be between 0 and 100, got {}",
                self.malicious_pct
            ));
        }
        if self.very_trustworthy_pct as u16 + self.malicious_pct as u16 > 100 {
            return invalid(format!(
                "p + q should be at most 100, got {} + {}",
                self.very_trustworthy_pct, self.malicious_pct
            ));
        }
        if self.articles_per_voter < 1 {
            return invalid("articles per voter (A) should be at least 1".to_string());
        }
        if self.report_interval < 1 {
            return invalid("report interval (I) should be at least 1".to_string());
        }
        for (name, value) in [
            ("vote_interval", self.vote_interval),
            ("query_interval", self.query_interval),
            ("clock_interval", self.clock_interval),
        ] {
            if value < 1 {
                return invalid(format!("{} should be at least 1", name));
            }
        }
        Ok(())
    }

    /// Time between two publishes of an agent: T_sim / A, at least 1.
    pub fn publish_interval(&self) -> SimTime {
        (self.duration / self.articles_per_voter.max(1)).max(1)
    }

    /// Percentage of plain trustworthy voters (100 - p - q).
    pub fn trustworthy_pct(&self) -> u8 {
        100u8
            .saturating_sub(self.very_trustworthy_pct)
            .saturating_sub(self.malicious_pct)
    }
}
