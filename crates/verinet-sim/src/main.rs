// crates/verinet-sim/src/main.rs
//
// Binary entrypoint for the Verinet simulator.
//
// Parses CLI arguments, loads configuration, initializes tracing, runs one
// simulation and writes the requested reports.

use std::fs;
use std::path::Path;

use clap::Parser;
use verinet_sim::output::{format_json, format_table, kind_summary};
use verinet_sim::{SimConfig, SimulationDriver, SimulationReport};

/// Verinet simulator: voters publish, vote on and query claims.
#[derive(Parser, Debug)]
#[command(name = "verinet-sim", version = "0.1.0", about = "Verinet trust-weighted voting simulator")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "verinet.toml")]
    config: String,

    /// Number of voters in the network.
    #[arg(long = "n")]
    voters: Option<usize>,

    /// Percentage of very trustworthy voters.
    #[arg(long = "p")]
    very_trustworthy_pct: Option<u8>,

    /// Percentage of malicious voters.
    #[arg(long = "q")]
    malicious_pct: Option<u8>,

    /// Claims each voter publishes over the run.
    #[arg(long = "a")]
    articles_per_voter: Option<u64>,

    /// Total simulated duration.
    #[arg(long = "t-sim")]
    duration: Option<u64>,

    /// Claims between two samples of the trust report.
    #[arg(long = "interval")]
    report_interval: Option<usize>,

    /// Seed for all random decisions.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for report files.
    #[arg(long)]
    output_dir: Option<String>,

    /// Write info.txt and stats.json and print the summary table.
    #[arg(long)]
    info: bool,

    /// Print the run outcome as JSON.
    #[arg(long)]
    json: bool,

    /// Record every scheduler resumption and write trace.json.
    #[arg(long)]
    trace: bool,
}

impl Args {
    /// CLI flags override the config file values.
    fn apply(&self, config: &mut SimConfig) {
        if let Some(v) = self.voters {
            config.voters = v;
        }
        if let Some(v) = self.very_trustworthy_pct {
            config.very_trustworthy_pct = v;
        }
        if let Some(v) = self.malicious_pct {
            config.malicious_pct = v;
        }
        if let Some(v) = self.articles_per_voter {
            config.articles_per_voter = v;
        }
        if let Some(v) = self.duration {
            config.duration = v;
        }
        if let Some(v) = self.report_interval {
            config.report_interval = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = &self.output_dir {
            config.output_dir = v.clone();
        }
        if self.trace {
            config.record_trace = true;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config is read before the subscriber exists so its log_level can seed
    // the filter; the load result is logged once tracing is up.
    let loaded = SimConfig::load(&args.config);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let mut config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            SimConfig::default()
        }
    };
    args.apply(&mut config);
    config.validate()?;

    tracing::info!("Verinet simulator v0.1.0");
    tracing::info!("Voters: {}", config.voters);
    tracing::info!(
        "Kinds: p={}% very trustworthy, {}% trustworthy, q={}% malicious",
        config.very_trustworthy_pct,
        config.trustworthy_pct(),
        config.malicious_pct
    );
    tracing::info!("Duration: {}", config.duration);

    let mut driver = SimulationDriver::new(config)?;
    let outcome = driver.run();

    let output_dir = Path::new(&driver.config().output_dir).to_path_buf();
    fs::create_dir_all(&output_dir)?;

    if args.info {
        let report = SimulationReport::build(&driver, &outcome)?;
        report.write_info(&output_dir)?;
        report.write_json(&output_dir)?;
        println!("{}", format_table(&kind_summary(&report)));
    }

    if let Some(trace) = &outcome.trace {
        let path = output_dir.join("trace.json");
        fs::write(&path, serde_json::to_string_pretty(trace)?)?;
        tracing::info!("Wrote {} trace entries to {}", trace.len(), path.display());
    }

    if args.json {
        println!("{}", format_json(&outcome));
    }

    Ok(())
}
