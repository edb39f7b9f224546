//! Job/machine simulation.
//!
//! [`LabEnv`] advances a discrete clock, generates Bernoulli arrivals,
//! applies one externally chosen assignment per tick, serves jobs, and
//! turns late completions into negative rewards. The controller sees a
//! three-feature [`Observation`] and answers with an [`Action`].
//!
//! # Action space
//!
//! | Action | Meaning |
//! |--------|---------|
//! | `0..num_machines` | Assign the queue head to machine `i` |
//! | `num_machines` | No-op |
//!
//! Assignments that cannot be carried out are no-ops, never errors.

mod env;
mod event;

pub use env::{LabEnv, StepResult};
pub use event::{Completion, SimEvent};

/// Number of observation features.
pub const OBS_DIM: usize = 3;

/// `[queue length, STAT fraction of queue, idle machine count]`.
pub type Observation = [f64; OBS_DIM];

/// Discrete action, `0..=num_machines`.
pub type Action = usize;
