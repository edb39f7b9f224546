//! Policy interface and heuristic baselines.
//!
//! Every controller, heuristic or learned, answers the same question:
//! given the observable simulator state, which action next? Heuristics may
//! reorder the waiting queue while answering; that mutation is part of the
//! contract, which is why the view hands the queue out mutably.
//!
//! # Usage
//!
//! ```
//! use u_labsched::config::EnvConfig;
//! use u_labsched::policy::{Fifo, Policy};
//! use u_labsched::sim::LabEnv;
//!
//! let mut env = LabEnv::new(EnvConfig::default(), 0);
//! env.reset(None);
//! let mut policy = Fifo;
//! let action = policy.select_action(&mut env.view_mut());
//! let _ = env.step(action);
//! ```

mod baselines;
mod view;

pub use baselines::{Fifo, RandomPolicy, StatFirst};
pub use view::SchedulingView;

use std::fmt::Debug;

use crate::sim::Action;

/// A controller that picks one discrete action per tick.
pub trait Policy: Debug {
    /// Short name (e.g., "FIFO").
    fn name(&self) -> &'static str;

    /// Chooses an action in `0..=num_machines` for the current state.
    ///
    /// May reorder `view.queue`; the simulator assigns whatever is at the head.
    fn select_action(&mut self, view: &mut SchedulingView<'_>) -> Action;

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
