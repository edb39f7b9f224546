//! Machine model.
//!
//! A machine serves at most one job at a time and owns that job for the
//! whole of its service. Machines are created at environment reset and
//! live for the episode.

use serde::{Deserialize, Serialize};

use super::{Job, Tick};

/// Machine index, `0..num_machines`.
pub type MachineId = usize;

/// A single-capacity server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Machine {
    /// Machine index.
    pub id: MachineId,
    current_job: Option<Job>,
}

impl Machine {
    /// Creates an idle machine.
    pub fn new(id: MachineId) -> Self {
        Self {
            id,
            current_job: None,
        }
    }

    /// Whether no job is held.
    pub fn is_idle(&self) -> bool {
        self.current_job.is_none()
    }

    /// The job in service, if any.
    pub fn current_job(&self) -> Option<&Job> {
        self.current_job.as_ref()
    }

    /// Binds `job` to this machine and stamps its start time.
    ///
    /// Returns the job back if the machine is busy.
    pub fn assign(&mut self, mut job: Job, now: Tick) -> Result<(), Job> {
        if !self.is_idle() {
            return Err(job);
        }
        job.start_time = Some(now);
        self.current_job = Some(job);
        Ok(())
    }

    /// Advances service by one tick.
    ///
    /// When the held job finishes it is stamped with `now` as its completion
    /// time, released, and returned. The machine is idle afterwards.
    pub fn advance(&mut self, now: Tick) -> Option<Job> {
        let finished = self.current_job.as_mut()?.advance();
        if !finished {
            return None;
        }
        let mut job = self.current_job.take()?;
        job.completion_time = Some(now);
        Some(job)
    }
}
