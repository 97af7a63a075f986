// crates/verinet-sim/src/scheduler.rs
//
// Single-threaded discrete-event scheduler.
//
// Tasks are queued with a due time on a simulated clock. `run` pops the
// earliest task, advances the clock to its due time, and hands it to the
// process, which may queue follow-up tasks. Tasks due at the same instant
// run in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Simulated time, in abstract units.
pub type SimTime = u64;

/// A task handed back to the process when it falls due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wakeup<T> {
    /// Simulated time at which the task resumed.
    pub at: SimTime,
    /// Scheduling sequence number; orders tasks that share a due time.
    pub seq: u64,
    pub task: T,
}

/// Something the scheduler can resume.
///
/// `resume` runs to completion before the next task is popped, so it has
/// exclusive access to whatever state the process owns.
pub trait Process<T> {
    fn resume(&mut self, wakeup: Wakeup<T>, scheduler: &mut Scheduler<T>);
}

#[derive(Debug)]
struct Pending<T> {
    due: SimTime,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: earliest due time first, then lowest
        // sequence number.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Event queue plus simulated clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: SimTime,
    queue: BinaryHeap<Pending<T>>,
    next_seq: u64,
    resumed: u64,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time 0.
    pub fn new() -> Self {
        Self {
            now: 0,
            queue: BinaryHeap::new(),
            next_seq: 0,
            resumed: 0,
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Queue `task` to resume at `now + delay`. Returns its sequence number.
    pub fn schedule(&mut self, task: T, delay: SimTime) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Pending {
            due: self.now.saturating_add(delay),
            seq,
            task,
        });
        seq
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the next task, if any.
    pub fn next_due(&self) -> Option<SimTime> {
        self.queue.peek().map(|p| p.due)
    }

    /// Total tasks resumed since creation.
    pub fn resumed(&self) -> u64 {
        self.resumed
    }

    /// Resume the next task regardless of its due time.
    ///
    /// Returns the time it ran at, or `None` if the queue is empty.
    pub fn step<P: Process<T>>(&mut self, process: &mut P) -> Option<SimTime> {
        let Pending { due, seq, task } = self.queue.pop()?;
        self.now = due;
        self.resumed += 1;
        process.resume(Wakeup { at: due, seq, task }, self);
        Some(due)
    }

    /// Resume every task due strictly before `until`, in time order, then
    /// leave the clock at `until`.
    ///
    /// Returns the number of tasks resumed by this call.
    pub fn run<P: Process<T>>(&mut self, until: SimTime, process: &mut P) -> u64 {
        let start = self.resumed;
        tracing::debug!("Scheduler run from t={} until t={}", self.now, until);

        while let Some(due) = self.next_due() {
            if due >= until {
                break;
            }
            self.step(process);
        }

        if until > self.now {
            self.now = until;
        }
        self.resumed - start
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
