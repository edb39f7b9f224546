//! Job model.
//!
//! A job is one unit of lab work (a sample, a test run) that needs exactly
//! one machine for a fixed number of ticks. Deadline and penalty weight are
//! fixed when the job arrives and depend only on its urgency class.

use serde::{Deserialize, Serialize};

/// Simulation time in whole ticks.
pub type Tick = u64;

/// Unique, monotonically assigned job identifier.
pub type JobId = u64;

/// Urgency class of a job.
///
/// STAT jobs have tight deadlines and a heavy tardiness penalty;
/// routine jobs have looser deadlines and unit-ish penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Urgent ("STAT") job.
    Stat,
    /// Routine job.
    Routine,
}

impl Urgency {
    /// Whether this is the urgent class.
    pub fn is_stat(self) -> bool {
        matches!(self, Urgency::Stat)
    }
}

/// A job waiting for, or receiving, service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Tick at which the job entered the waiting queue.
    pub arrival_time: Tick,
    /// Required service duration (ticks, >= 1).
    pub service_time: u32,
    /// Remaining service (ticks). Starts at `service_time`.
    pub remaining_time: u32,
    /// Absolute deadline tick (`arrival_time + class offset`).
    pub deadline: Tick,
    /// Urgency class.
    pub urgency: Urgency,
    /// Penalty per tick of tardiness.
    pub priority_weight: f64,
    /// Tick at which a machine picked the job up.
    pub start_time: Option<Tick>,
    /// Tick at which service finished.
    pub completion_time: Option<Tick>,
}

impl Job {
    /// Creates a routine job with unit weight and a deadline equal to its arrival.
    ///
    /// The environment always sets deadline, urgency and weight from its
    /// configuration; the builders below exist for callers assembling jobs by hand.
    pub fn new(id: JobId, arrival_time: Tick, service_time: u32) -> Self {
        let service_time = service_time.max(1);
        Self {
            id,
            arrival_time,
            service_time,
            remaining_time: service_time,
            deadline: arrival_time,
            urgency: Urgency::Routine,
            priority_weight: 1.0,
            start_time: None,
            completion_time: None,
        }
    }

    /// Sets the absolute deadline.
    pub fn with_deadline(mut self, deadline: Tick) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the urgency class.
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Sets the penalty weight.
    pub fn with_priority_weight(mut self, weight: f64) -> Self {
        self.priority_weight = weight;
        self
    }

    /// Whether the job is urgent.
    pub fn is_stat(&self) -> bool {
        self.urgency.is_stat()
    }

    /// Whether a machine has picked the job up.
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    /// Whether service is complete.
    pub fn is_finished(&self) -> bool {
        self.remaining_time == 0
    }

    /// Ticks by which completion at `at` exceeds the deadline (0 if on time).
    pub fn tardiness_at(&self, at: Tick) -> Tick {
        at.saturating_sub(self.deadline)
    }

    /// Tardiness penalty for completion at `at`: `tardiness * priority_weight`.
    pub fn penalty_at(&self, at: Tick) -> f64 {
        self.tardiness_at(at) as f64 * self.priority_weight
    }

    /// Tardiness of a completed job, `None` while unfinished.
    pub fn tardiness(&self) -> Option<Tick> {
        self.completion_time.map(|c| self.tardiness_at(c))
    }

    /// Consumes one tick of service. Returns `true` when the job finishes.
    pub(crate) fn advance(&mut self) -> bool {
        self.remaining_time = self.remaining_time.saturating_sub(1);
        self.is_finished()
    }
}
