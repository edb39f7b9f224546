//! Policy evaluation over repeated episodes.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{run_episode, EpisodeKpi};
use crate::policy::Policy;
use crate::sim::LabEnv;

/// Reward statistics and averaged KPIs of one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Policy name.
    pub policy: String,
    /// Number of episodes run.
    pub episodes: usize,
    /// Mean episode reward.
    pub mean_reward: f64,
    /// Population standard deviation of episode rewards.
    pub std_reward: f64,
    /// Per-episode rewards, in run order.
    pub rewards: Vec<f64>,
    /// KPIs averaged over the episodes.
    pub kpi: EpisodeKpi,
}

/// Runs `episodes` episodes of `policy` on `env` and summarises them.
///
/// Zero episodes yield zero mean and deviation.
pub fn evaluate_policy<P: Policy + ?Sized>(
    env: &mut LabEnv,
    policy: &mut P,
    episodes: usize,
) -> EvaluationSummary {
    let mut rewards = Vec::with_capacity(episodes);
    let mut kpis = Vec::with_capacity(episodes);
    for _ in 0..episodes {
        let outcome = run_episode(env, policy);
        rewards.push(outcome.total_reward);
        kpis.push(EpisodeKpi::calculate(&outcome));
    }

    let (mean_reward, std_reward) = mean_std(&rewards);
    let summary = EvaluationSummary {
        policy: policy.name().to_string(),
        episodes,
        mean_reward,
        std_reward,
        rewards,
        kpi: EpisodeKpi::average(&kpis),
    };
    info!(
        policy = %summary.policy,
        episodes,
        mean_reward,
        std_reward,
        on_time_rate = summary.kpi.on_time_rate,
        "evaluation"
    );
    summary
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
