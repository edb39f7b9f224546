//! Events emitted by a simulator step.

use serde::{Deserialize, Serialize};

use crate::models::{Job, JobId, MachineId, Tick, Urgency};

/// Record of one finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Finished job.
    pub job_id: JobId,
    /// Machine that served it.
    pub machine_id: MachineId,
    /// Urgency class.
    pub urgency: Urgency,
    /// Arrival tick.
    pub arrival_time: Tick,
    /// Tick the machine picked it up.
    pub start_time: Tick,
    /// Tick service finished.
    pub completion_time: Tick,
    /// Absolute deadline.
    pub deadline: Tick,
    /// `max(0, completion_time - deadline)`.
    pub tardiness: Tick,
    /// `tardiness * priority_weight`; subtracted from the step reward.
    pub penalty: f64,
}

impl Completion {
    /// Builds the record for a job released by `machine_id`.
    ///
    /// Returns `None` if the job lacks a start or completion stamp.
    pub(crate) fn from_job(job: &Job, machine_id: MachineId) -> Option<Self> {
        let start_time = job.start_time?;
        let completion_time = job.completion_time?;
        let tardiness = job.tardiness()?;
        Some(Self {
            job_id: job.id,
            machine_id,
            urgency: job.urgency,
            arrival_time: job.arrival_time,
            start_time,
            completion_time,
            deadline: job.deadline,
            tardiness,
            penalty: tardiness as f64 * job.priority_weight,
        })
    }

    /// Whether the job finished by its deadline.
    pub fn on_time(&self) -> bool {
        self.tardiness == 0
    }

    /// Ticks spent waiting in the queue.
    pub fn wait_time(&self) -> Tick {
        self.start_time.saturating_sub(self.arrival_time)
    }

    /// Ticks from arrival to completion.
    pub fn flow_time(&self) -> Tick {
        self.completion_time.saturating_sub(self.arrival_time)
    }
}

/// Something that happened during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The queue head was bound to a machine.
    Assignment {
        /// Assigned job.
        job_id: JobId,
        /// Target machine.
        machine_id: MachineId,
        /// Clock value at assignment (before the advance).
        tick: Tick,
    },
    /// A new job joined the tail of the queue.
    Arrival {
        /// New job.
        job_id: JobId,
        /// Its class.
        urgency: Urgency,
        /// Its service duration.
        service_time: u32,
        /// Arrival tick.
        tick: Tick,
    },
    /// A job finished service.
    Completion(Completion),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_from_job() {
        let mut job = Job::new(4, 2, 3)
            .with_deadline(4)
            .with_urgency(Urgency::Stat)
            .with_priority_weight(5.0);
        job.start_time = Some(3);
        job.completion_time = Some(6);

        let c = Completion::from_job(&job, 1).unwrap();
        assert_eq!(c.job_id, 4);
        assert_eq!(c.machine_id, 1);
        assert_eq!(c.tardiness, 2);
        assert!((c.penalty - 10.0).abs() < 1e-12);
        assert!(!c.on_time());
        assert_eq!(c.wait_time(), 1);
        assert_eq!(c.flow_time(), 4);
    }

    #[test]
    fn test_completion_requires_stamps() {
        let job = Job::new(0, 0, 1);
        assert!(Completion::from_job(&job, 0).is_none());
    }
}
