// crates/verinet-sim/src/driver.rs
//
// Simulation driver for the Verinet network.
//
// Builds N agents with randomly assigned kinds, registers them with a fresh
// ledger, starts their three recurring behaviors plus a clock logger, and
// runs the scheduler until the configured duration.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use verinet_core::{TrustWeights, VerinetError, VoterId, VoterKind};
use verinet_reputation::TrustLedger;

use crate::agent::{Action, Agent, Behavior};
use crate::config::SimConfig;
use crate::scheduler::{Process, Scheduler, SimTime, Wakeup};

/// A recurring task on the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimTask {
    /// One behavior of the agent at `index` in the driver's agent list.
    Agent { index: usize, behavior: Behavior },
    /// Periodic progress log.
    Clock,
}

/// One recorded scheduler resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub at: SimTime,
    pub seq: u64,
    pub task: SimTask,
}

/// Running totals of what the agents did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCounters {
    pub claims_published: u64,
    pub publishes_rejected: u64,
    pub votes_accepted: u64,
    pub votes_duplicate: u64,
    pub votes_rejected: u64,
    pub queries_answered: u64,
    pub queries_empty: u64,
}

impl SimCounters {
    fn record(&mut self, action: &Action) {
        match action {
            Action::Published(_) => self.claims_published += 1,
            Action::PublishRejected => self.publishes_rejected += 1,
            Action::Voted(round) => {
                self.votes_accepted += round.accepted;
                self.votes_duplicate += round.duplicate;
                self.votes_rejected += round.rejected;
            }
            Action::Queried(..) => self.queries_answered += 1,
            Action::NothingToQuery => self.queries_empty += 1,
        }
    }
}

/// Everything a finished run reports besides the ledger itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub run_id: Uuid,
    pub seed: u64,
    pub final_time: SimTime,
    pub resumptions: u64,
    pub counters: SimCounters,
    pub trust_weights: TrustWeights,
    /// Every resumption in order, when tracing was requested.
    pub trace: Option<Vec<TraceEntry>>,
}

/// Mutable state the scheduler hands each task.
struct SimWorld {
    ledger: TrustLedger,
    agents: Vec<Agent>,
    rng: StdRng,
    publish_interval: SimTime,
    vote_interval: SimTime,
    query_interval: SimTime,
    clock_interval: SimTime,
    counters: SimCounters,
    trace: Option<Vec<TraceEntry>>,
}

impl SimWorld {
    fn interval_of(&self, task: SimTask) -> SimTime {
        match task {
            SimTask::Agent { behavior: Behavior::Publisher, .. } => self.publish_interval,
            SimTask::Agent { behavior: Behavior::Voter, .. } => self.vote_interval,
            SimTask::Agent { behavior: Behavior::Querier, .. } => self.query_interval,
            SimTask::Clock => self.clock_interval,
        }
    }
}

impl Process<SimTask> for SimWorld {
    fn resume(&mut self, wakeup: Wakeup<SimTask>, scheduler: &mut Scheduler<SimTask>) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TraceEntry {
                at: wakeup.at,
                seq: wakeup.seq,
                task: wakeup.task,
            });
        }

        match wakeup.task {
            SimTask::Agent { index, behavior } => {
                let Some(agent) = self.agents.get_mut(index) else {
                    tracing::warn!("No agent at index {}; dropping task", index);
                    return;
                };
                let action = agent.act(behavior, &mut self.ledger, &mut self.rng);
                self.counters.record(&action);
            }
            SimTask::Clock => {
                tracing::info!(
                    "Time {}: {} claims, {} active voters",
                    wakeup.at,
                    self.ledger.claim_count(),
                    self.ledger.active_voter_count()
                );
            }
        }

        scheduler.schedule(wakeup.task, self.interval_of(wakeup.task));
    }
}

/// Owns the ledger, the agents and the scheduler for one run.
pub struct SimulationDriver {
    config: SimConfig,
    world: SimWorld,
    scheduler: Scheduler<SimTask>,
}

impl SimulationDriver {
    /// Validate `config`, then build, register and start every agent.
    ///
    /// Agents get ids 1..=N in construction order. Each one's publisher,
    /// voter and querier are scheduled at their first interval, followed by
    /// the clock logger.
    pub fn new(config: SimConfig) -> Result<Self, VerinetError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut ledger = TrustLedger::new();
        let mut agents = Vec::with_capacity(config.voters);

        for n in 1..=config.voters {
            let id = VoterId(u32::try_from(n).map_err(|_| {
                VerinetError::InvalidConfig(format!("too many voters: {}", config.voters))
            })?);
            let kind = assign_kind(&config, &mut rng);
            ledger.register(id);
            agents.push(Agent::new(id, kind));
        }

        let world = SimWorld {
            ledger,
            agents,
            rng,
            publish_interval: config.publish_interval(),
            vote_interval: config.vote_interval,
            query_interval: config.query_interval,
            clock_interval: config.clock_interval,
            counters: SimCounters::default(),
            trace: config.record_trace.then(Vec::new),
        };

        let mut scheduler = Scheduler::new();
        for index in 0..world.agents.len() {
            for behavior in Behavior::ALL {
                let task = SimTask::Agent { index, behavior };
                scheduler.schedule(task, world.interval_of(task));
            }
        }
        scheduler.schedule(SimTask::Clock, world.clock_interval);

        tracing::info!(
            "Simulation ready: {} voters (p={}%, q={}%), publish every {}, duration {}",
            config.voters,
            config.very_trustworthy_pct,
            config.malicious_pct,
            world.publish_interval,
            config.duration
        );

        Ok(Self {
            config,
            world,
            scheduler,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Advance the simulation to `until` (exclusive). Returns the number of
    /// tasks resumed.
    pub fn run_until(&mut self, until: SimTime) -> u64 {
        self.scheduler.run(until, &mut self.world)
    }

    /// Run to the configured duration and summarize the run.
    pub fn run(&mut self) -> SimulationOutcome {
        let run_id = Uuid::now_v7();
        tracing::info!("Simulation {} started (seed={})", run_id, self.config.seed);

        self.run_until(self.config.duration);

        let counters = self.world.counters;
        tracing::info!(
            "Simulation {} finished at t={}: {} claims, {} votes accepted, {} queries",
            run_id,
            self.scheduler.now(),
            counters.claims_published,
            counters.votes_accepted,
            counters.queries_answered
        );

        SimulationOutcome {
            run_id,
            seed: self.config.seed,
            final_time: self.scheduler.now(),
            resumptions: self.scheduler.resumed(),
            counters,
            trust_weights: self.world.ledger.trust_weights().clone(),
            trace: self.world.trace.clone(),
        }
    }

    pub fn ledger(&self) -> &TrustLedger {
        &self.world.ledger
    }

    /// Direct ledger access, e.g. to deregister a voter between runs.
    pub fn ledger_mut(&mut self) -> &mut TrustLedger {
        &mut self.world.ledger
    }

    pub fn agents(&self) -> &[Agent] {
        &self.world.agents
    }

    pub fn counters(&self) -> SimCounters {
        self.world.counters
    }

    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.world.trace.as_deref()
    }

    /// Kind of every agent, keyed by voter id.
    pub fn voter_kinds(&self) -> BTreeMap<VoterId, VoterKind> {
        self.world
            .agents
            .iter()
            .map(|agent| (agent.id(), agent.kind()))
            .collect()
    }
}

/// One uniform draw: below q is malicious, below q + p is very trustworthy,
/// the rest are trustworthy.
fn assign_kind<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> VoterKind {
    let u: f64 = rng.gen();
    let q = f64::from(config.malicious_pct) / 100.0;
    let p = f64::from(config.very_trustworthy_pct) / 100.0;
    if u < q {
        VoterKind::Malicious
    } else if u < q + p {
        VoterKind::VeryTrustworthy
    } else {
        VoterKind::Trustworthy
    }
}
