//! Policy-facing view of the simulator state.

use crate::models::{Machine, MachineId, Tick, WaitingQueue};
use crate::sim::{Action, Observation};

/// What a policy may see and touch when choosing an action.
///
/// Machines are read-only. The waiting queue is handed out mutably: a
/// policy may reorder it (e.g. promote an urgent job to the head) before
/// returning an assignment, and the simulator honours that order because
/// it always assigns the head.
#[derive(Debug)]
pub struct SchedulingView<'a> {
    /// Current clock value.
    pub clock: Tick,
    /// Waiting jobs, head first. Reordering is allowed.
    pub queue: &'a mut WaitingQueue,
    /// Machine array.
    pub machines: &'a [Machine],
}

impl<'a> SchedulingView<'a> {
    /// Creates a view over externally owned state.
    pub fn new(clock: Tick, queue: &'a mut WaitingQueue, machines: &'a [Machine]) -> Self {
        Self {
            clock,
            queue,
            machines,
        }
    }

    /// Size of the action space.
    pub fn num_actions(&self) -> usize {
        self.machines.len() + 1
    }

    /// The no-op action.
    pub fn noop_action(&self) -> Action {
        self.machines.len()
    }

    /// Lowest-index idle machine.
    pub fn first_idle_machine(&self) -> Option<MachineId> {
        self.machines.iter().find(|m| m.is_idle()).map(|m| m.id)
    }

    /// Number of idle machines.
    pub fn idle_count(&self) -> usize {
        self.machines.iter().filter(|m| m.is_idle()).count()
    }

    /// The same three features the simulator reports.
    pub fn observation(&self) -> Observation {
        [
            self.queue.len() as f64,
            self.queue.stat_fraction(),
            self.idle_count() as f64,
        ]
    }
}
