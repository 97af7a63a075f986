// crates/verinet-sim/src/lib.rs
//
// verinet-sim: Discrete-event simulation of the Verinet network.
//
// A single-threaded scheduler drives every agent's publish, vote and query
// behaviors against one shared trust ledger. Because each task runs to
// completion before the next is popped, the ledger needs no locking.

pub mod agent;
pub mod config;
pub mod driver;
pub mod output;
pub mod report;
pub mod scheduler;

pub use agent::{Action, Agent, Behavior, VoteRound};
pub use config::SimConfig;
pub use driver::{SimCounters, SimTask, SimulationDriver, SimulationOutcome, TraceEntry};
pub use report::SimulationReport;
pub use scheduler::{Process, Scheduler, SimTime, Wakeup};
