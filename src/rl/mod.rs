//! Reinforcement-learning components.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`EpisodeBuffer`] | One episode of transitions |
//! | [`Approximator`] / [`PolicyValueNet`] | Observation -> (score, value) |
//! | [`PpoAgent`] | Action sampling and the per-episode PPO update (AdamW step) |

mod agent;
mod buffer;
mod network;

pub use agent::{
    broadcast_softmax, discounted_returns, ActionSample, PpoAgent, UpdateStats, VALUE_LOSS_COEF,
};
pub use buffer::{Batch, EpisodeBuffer};
pub use network::{ApproxOutput, Approximator, PolicyValueNet};
