//! Episode-scoped PPO agent.
//!
//! One clipped-surrogate gradient step per collected episode, with
//! Monte-Carlo returns and no GAE, entropy bonus, minibatching or epoch
//! repetition. Rewards are delayed (tardiness only shows up at completion),
//! which makes returns sparse and high-variance; the agent keeps that
//! visible instead of smoothing it away.
//!
//! # Action distribution
//!
//! The approximator emits a single action score. That score is broadcast
//! into an identical logit for every action before the softmax, so the
//! sampling distribution is uniform whatever the score is, and the
//! derivative of any action's log-probability with respect to the score is
//! zero. In practice only the value head learns.
//!
//! # Reference
//! Schulman et al. (2017), "Proximal Policy Optimization Algorithms"

use std::fmt;

use candle_core::{Tensor, D};
use candle_nn::ops::log_softmax;
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Approximator, EpisodeBuffer, PolicyValueNet};
use crate::config::PpoConfig;
use crate::error::{LabError, LabResult};
use crate::policy::{Policy, SchedulingView};
use crate::sim::{Action, Observation, OBS_DIM};

/// Weight of the value loss in the total loss.
pub const VALUE_LOSS_COEF: f64 = 0.5;

/// A sampled action with the quantities the update needs later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionSample {
    /// Sampled action.
    pub action: Action,
    /// Its log-probability under the sampling distribution.
    pub log_prob: f64,
    /// Value estimate of the observation.
    pub value: f64,
}

/// Diagnostics of one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Episode length.
    pub steps: usize,
    /// Clipped surrogate loss.
    pub policy_loss: f64,
    /// Mean squared value error.
    pub value_loss: f64,
    /// `policy_loss + 0.5 * value_loss`.
    pub total_loss: f64,
    /// Mean importance ratio.
    pub mean_ratio: f64,
    /// Fraction of steps whose ratio fell outside `[1 - ε, 1 + ε]`.
    pub clip_fraction: f64,
    /// Mean advantage.
    pub mean_advantage: f64,
}

/// Softmax over `action_dim` copies of `score`. Always uniform.
pub fn broadcast_softmax(score: f64, action_dim: usize) -> Vec<f64> {
    softmax(&vec![score; action_dim])
}

/// Discounted Monte-Carlo returns, one backward pass:
/// `G <- r + gamma * G`, no bootstrapping.
pub fn discounted_returns(rewards: &[f64], gamma: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut g = 0.0;
    for (t, &r) in rewards.iter().enumerate().rev() {
        g = r + gamma * g;
        returns[t] = g;
    }
    returns
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn log_softmax_at(logits: &[f64], index: usize) -> f64 {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let log_sum = logits.iter().map(|&l| (l - max).exp()).sum::<f64>().ln() + max;
    logits[index] - log_sum
}

fn adam(lr: f64) -> ParamsAdamW {
    ParamsAdamW {
        lr,
        weight_decay: 0.0,
        ..ParamsAdamW::default()
    }
}

/// PPO agent over a pluggable approximator.
pub struct PpoAgent<A: Approximator = PolicyValueNet> {
    network: A,
    optimizer: AdamW,
    gamma: f64,
    clip_range: f64,
    action_dim: usize,
    updates: u64,
    rng: StdRng,
}

impl<A: Approximator> fmt::Debug for PpoAgent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PpoAgent")
            .field("network", &self.network)
            .field("gamma", &self.gamma)
            .field("clip_range", &self.clip_range)
            .field("action_dim", &self.action_dim)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

impl PpoAgent<PolicyValueNet> {
    /// Builds the default MLP agent; network init and action sampling share `seed`.
    pub fn new(
        obs_dim: usize,
        action_dim: usize,
        config: &PpoConfig,
        seed: u64,
    ) -> LabResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = PolicyValueNet::new(obs_dim, &config.hidden_dims, &mut rng)?;
        let optimizer = AdamW::new(network.vars(), adam(config.learning_rate))?;
        Ok(Self {
            network,
            optimizer,
            gamma: config.gamma,
            clip_range: config.clip_range,
            action_dim,
            updates: 0,
            rng,
        })
    }
}

impl<A: Approximator> PpoAgent<A> {
    /// Wraps an existing approximator.
    pub fn with_approximator(
        network: A,
        action_dim: usize,
        config: &PpoConfig,
        seed: u64,
    ) -> LabResult<Self> {
        let optimizer = AdamW::new(network.vars(), adam(config.learning_rate))?;
        Ok(Self {
            network,
            optimizer,
            gamma: config.gamma,
            clip_range: config.clip_range,
            action_dim,
            updates: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The approximator.
    pub fn network(&self) -> &A {
        &self.network
    }

    /// Number of discrete actions.
    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Number of updates performed.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Samples an action from the broadcast-softmax distribution.
    ///
    /// Fails if the approximator errors or produces a non-finite score.
    pub fn select_action(&mut self, observation: &Observation) -> LabResult<ActionSample> {
        let out = self.network.forward(observation)?;
        let logits = vec![out.score; self.action_dim];
        let probs = softmax(&logits);
        let dist = WeightedIndex::new(&probs).map_err(|e| LabError::Sampling(e.to_string()))?;
        let action = dist.sample(&mut self.rng);
        Ok(ActionSample {
            action,
            log_prob: log_softmax_at(&logits, action),
            value: out.value,
        })
    }

    /// Discounted returns with this agent's γ.
    pub fn compute_returns(&self, rewards: &[f64]) -> Vec<f64> {
        discounted_returns(rewards, self.gamma)
    }

    /// One clipped-surrogate gradient step from a completed episode.
    ///
    /// # Algorithm
    /// 1. Returns from stored rewards; advantage = return - stored value.
    /// 2. Re-evaluate the stored observations; new log-probs of the stored actions.
    /// 3. ratio = exp(new - old); surrogate = -mean(min(r A, clip(r) A)).
    /// 4. loss = surrogate + 0.5 * MSE(new values, returns); one Adam step.
    pub fn update_from_episode(&mut self, buffer: &EpisodeBuffer) -> LabResult<UpdateStats> {
        if buffer.is_empty() {
            return Err(LabError::EmptyEpisode);
        }

        let batch = buffer.as_batch();
        let steps = batch.len();
        let n = steps as f64;
        let returns = self.compute_returns(&batch.rewards);
        let advantages: Vec<f64> = returns
            .iter()
            .zip(&batch.values)
            .map(|(g, v)| g - v)
            .collect();
        let mean_advantage = advantages.iter().sum::<f64>() / n;

        let device = self.network.device().clone();
        let observations: Vec<f64> = batch.observations.iter().flatten().copied().collect();
        let observations = Tensor::from_vec(observations, (steps, OBS_DIM), &device)?;
        let actions: Vec<u32> = batch.actions.iter().map(|&a| a as u32).collect();
        let actions = Tensor::from_vec(actions, (steps, 1), &device)?;
        let old_log_probs = Tensor::from_vec(batch.log_probs, steps, &device)?;
        let advantages = Tensor::from_vec(advantages, steps, &device)?;
        let returns = Tensor::from_vec(returns, steps, &device)?;

        let (scores, values) = self.network.forward_batch(&observations)?;
        let logits = scores
            .unsqueeze(1)?
            .broadcast_as((steps, self.action_dim))?
            .contiguous()?;
        let new_log_probs = log_softmax(&logits, D::Minus1)?
            .gather(&actions, 1)?
            .squeeze(1)?;

        let ratio = new_log_probs.sub(&old_log_probs)?.exp()?;
        let (low, high) = (1.0 - self.clip_range, 1.0 + self.clip_range);
        let unclipped = ratio.mul(&advantages)?;
        let clipped = ratio.clamp(low, high)?.mul(&advantages)?;
        let policy_loss = unclipped.minimum(&clipped)?.mean_all()?.neg()?;
        let value_loss = candle_nn::loss::mse(&values, &returns)?;
        let total_loss = policy_loss.add(&value_loss.affine(VALUE_LOSS_COEF, 0.0)?)?;

        let ratios = ratio.to_vec1::<f64>()?;
        let stats = UpdateStats {
            steps,
            policy_loss: policy_loss.to_scalar::<f64>()?,
            value_loss: value_loss.to_scalar::<f64>()?,
            total_loss: total_loss.to_scalar::<f64>()?,
            mean_ratio: ratios.iter().sum::<f64>() / n,
            clip_fraction: ratios.iter().filter(|r| !(low..=high).contains(*r)).count() as f64
                / n,
            mean_advantage,
        };
        if !stats.total_loss.is_finite() {
            warn!(
                policy_loss = stats.policy_loss,
                value_loss = stats.value_loss,
                "non-finite PPO loss"
            );
        }

        self.optimizer.backward_step(&total_loss)?;
        self.updates += 1;

        debug!(
            steps,
            policy_loss = stats.policy_loss,
            value_loss = stats.value_loss,
            total_loss = stats.total_loss,
            mean_ratio = stats.mean_ratio,
            "ppo update"
        );
        Ok(stats)
    }
}

impl<A: Approximator> Policy for PpoAgent<A> {
    fn name(&self) -> &'static str {
        "PPO"
    }

    fn select_action(&mut self, view: &mut SchedulingView<'_>) -> Action {
        debug_assert_eq!(view.num_actions(), self.action_dim);
        let observation = view.observation();
        match Self::select_action(self, &observation) {
            Ok(sample) => sample.action,
            Err(err) => {
                warn!(%err, "action selection failed, falling back to no-op");
                view.noop_action()
            }
        }
    }

    fn description(&self) -> &'static str {
        "Episode-scoped PPO with broadcast action score"
    }
}
