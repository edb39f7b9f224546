//! Heuristic baseline policies.
//!
//! Common operational heuristics, not optimal controllers. They set the
//! bar a learned policy has to clear.
//!
//! - **FIFO**: oldest job to the first idle machine.
//! - **STAT-first**: promote the earliest STAT job, then FIFO.
//! - **Random**: uniform over the whole action space (statistical control).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Policy, SchedulingView};
use crate::sim::Action;

/// First In First Out.
///
/// Assigns the queue head to the lowest-index idle machine; no-op when
/// the queue is empty or every machine is busy. Performs reasonably under
/// low load and degrades under congestion and priority pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl Policy for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn select_action(&mut self, view: &mut SchedulingView<'_>) -> Action {
        if view.queue.is_empty() {
            return view.noop_action();
        }
        view.first_idle_machine().unwrap_or_else(|| view.noop_action())
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}

/// STAT jobs first.
///
/// Moves the earliest-arrived STAT job to the head of the queue, then
/// picks the first idle machine. The promotion happens even when no
/// machine is idle, so the job stays at the head for the next tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatFirst;

impl Policy for StatFirst {
    fn name(&self) -> &'static str {
        "STAT-first"
    }

    fn select_action(&mut self, view: &mut SchedulingView<'_>) -> Action {
        if view.queue.is_empty() {
            return view.noop_action();
        }

        if let Some(index) = view.queue.position(|j| j.is_stat()) {
            view.queue.promote(index);
        }

        view.first_idle_machine().unwrap_or_else(|| view.noop_action())
    }

    fn description(&self) -> &'static str {
        "STAT jobs first, then FIFO"
    }
}

/// Uniformly random action.
///
/// Ignores state entirely, including busy machines and an empty queue;
/// the simulator turns the resulting invalid actions into no-ops.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a random policy with its own seeded stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn select_action(&mut self, view: &mut SchedulingView<'_>) -> Action {
        self.rng.random_range(0..view.num_actions())
    }

    fn description(&self) -> &'static str {
        "Uniform random action"
    }
}
