//! Waiting queue of unassigned jobs.
//!
//! Arrival order (FIFO) by default. Priority-aware policies may reorder it
//! through [`WaitingQueue::promote`]; that reordering is visible to the
//! simulator, which always assigns the head.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Job;

/// Ordered sequence of jobs waiting for a machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitingQueue {
    jobs: VecDeque<Job>,
}

impl WaitingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waiting jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no job is waiting.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Appends a job at the tail.
    pub fn push_back(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// Puts a job back at the head.
    pub(crate) fn push_front(&mut self, job: Job) {
        self.jobs.push_front(job);
    }

    /// Removes and returns the head job.
    pub fn pop_front(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    /// The head job, if any.
    pub fn front(&self) -> Option<&Job> {
        self.jobs.front()
    }

    /// Iterates jobs head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Number of STAT jobs waiting.
    pub fn stat_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_stat()).count()
    }

    /// Fraction of waiting jobs that are STAT (0.0 when empty).
    pub fn stat_fraction(&self) -> f64 {
        if self.jobs.is_empty() {
            0.0
        } else {
            self.stat_count() as f64 / self.jobs.len() as f64
        }
    }

    /// Index of the first job matching `pred`, head to tail.
    pub fn position(&self, pred: impl Fn(&Job) -> bool) -> Option<usize> {
        self.jobs.iter().position(pred)
    }

    /// Moves the job at `index` to the head, keeping the relative order of the rest.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn promote(&mut self, index: usize) -> bool {
        match self.jobs.remove(index) {
            Some(job) => {
                self.jobs.push_front(job);
                true
            }
            None => false,
        }
    }

    /// Drops all waiting jobs.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }
}
