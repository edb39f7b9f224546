//! Episode drivers, training and evaluation.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`run_episode`] | One episode under any [`Policy`](crate::policy::Policy) |
//! | [`collect_episode`] | One episode under the agent, with its transitions |
//! | [`train`] | Collect + update, repeated |
//! | [`evaluate_policy`] | Reward mean/std and averaged [`EpisodeKpi`] |

mod episode;
mod evaluation;
mod kpi;
mod train;

pub use episode::{collect_episode, run_episode, EpisodeOutcome};
pub use evaluation::{evaluate_policy, EvaluationSummary};
pub use kpi::EpisodeKpi;
pub use train::{train, TrainingRecord};
