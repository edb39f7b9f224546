//! Episode-scoped rollout storage.
//!
//! Holds exactly one episode. It is deliberately not a replay buffer and
//! not batched across episodes, so delayed rewards and the variance they
//! cause stay visible in every update.

use serde::{Deserialize, Serialize};

use crate::sim::{Action, Observation};

/// One episode's trajectory as five parallel, equally long sequences.
#[derive(Debug, Clone, Default)]
pub struct EpisodeBuffer {
    observations: Vec<Observation>,
    actions: Vec<Action>,
    rewards: Vec<f64>,
    log_probs: Vec<f64>,
    values: Vec<f64>,
}

/// Uniform batched form of a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// `steps x OBS_DIM` observation matrix, one row per step.
    pub observations: Vec<Observation>,
    /// Actions taken.
    pub actions: Vec<Action>,
    /// Rewards received.
    pub rewards: Vec<f64>,
    /// Log-probabilities of the actions under the sampling distribution.
    pub log_probs: Vec<f64>,
    /// Value estimates at collection time.
    pub values: Vec<f64>,
}

impl Batch {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch holds no steps.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl EpisodeBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `steps` transitions.
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            observations: Vec::with_capacity(steps),
            actions: Vec::with_capacity(steps),
            rewards: Vec::with_capacity(steps),
            log_probs: Vec::with_capacity(steps),
            values: Vec::with_capacity(steps),
        }
    }

    /// Appends one transition. Callers add in time order.
    pub fn add(
        &mut self,
        observation: Observation,
        action: Action,
        reward: f64,
        log_prob: f64,
        value: f64,
    ) {
        self.observations.push(observation);
        self.actions.push(action);
        self.rewards.push(reward);
        self.log_probs.push(log_prob);
        self.values.push(value);
        debug_assert!(self.is_aligned());
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no transition is stored.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Stored rewards, in time order.
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Sum of stored rewards.
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    /// Copies the five sequences into a [`Batch`].
    pub fn as_batch(&self) -> Batch {
        Batch {
            observations: self.observations.clone(),
            actions: self.actions.clone(),
            rewards: self.rewards.clone(),
            log_probs: self.log_probs.clone(),
            values: self.values.clone(),
        }
    }

    /// Discards every record.
    pub fn clear(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.rewards.clear();
        self.log_probs.clear();
        self.values.clear();
    }

    fn is_aligned(&self) -> bool {
        let n = self.actions.len();
        self.observations.len() == n
            && self.rewards.len() == n
            && self.log_probs.len() == n
            && self.values.len() == n
    }
}
