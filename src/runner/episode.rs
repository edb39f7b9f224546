//! Episode drivers.
//!
//! # Algorithm
//!
//! 1. Reset the simulator (the RNG stream continues).
//! 2. Until terminated: ask the controller, step, accumulate reward.
//! 3. Collect completion records and the final queue length.

use serde::{Deserialize, Serialize};

use crate::error::LabResult;
use crate::policy::Policy;
use crate::rl::{Approximator, EpisodeBuffer, PpoAgent};
use crate::sim::{Completion, LabEnv, StepResult};

/// What happened in one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Sum of step rewards.
    pub total_reward: f64,
    /// Number of steps taken.
    pub steps: usize,
    /// Every completion, in step order.
    pub completions: Vec<Completion>,
    /// Queue length when the horizon was reached.
    pub jobs_waiting: usize,
}

impl EpisodeOutcome {
    fn record(&mut self, result: &StepResult) {
        self.total_reward += result.reward;
        self.steps += 1;
        self.completions.extend(result.completions().cloned());
    }
}

/// Runs one full episode under `policy`.
pub fn run_episode<P: Policy + ?Sized>(env: &mut LabEnv, policy: &mut P) -> EpisodeOutcome {
    env.reset(None);
    let mut outcome = EpisodeOutcome::default();
    while !env.is_terminal() {
        let action = policy.select_action(&mut env.view_mut());
        let result = env.step(action);
        outcome.record(&result);
        if result.terminated {
            break;
        }
    }
    outcome.jobs_waiting = env.queue().len();
    outcome
}

/// Runs one episode under the agent, storing every transition.
///
/// The buffer holds the observation seen *before* each action.
pub fn collect_episode<A: Approximator>(
    env: &mut LabEnv,
    agent: &mut PpoAgent<A>,
) -> LabResult<(EpisodeOutcome, EpisodeBuffer)> {
    let mut observation = env.reset(None);
    let mut buffer = EpisodeBuffer::with_capacity(env.config().episode_length as usize);
    let mut outcome = EpisodeOutcome::default();

    while !env.is_terminal() {
        let sample = agent.select_action(&observation)?;
        let result = env.step(sample.action);
        buffer.add(
            observation,
            sample.action,
            result.reward,
            sample.log_prob,
            sample.value,
        );
        outcome.record(&result);
        observation = result.observation;
        if result.terminated {
            break;
        }
    }
    outcome.jobs_waiting = env.queue().len();
    Ok((outcome, buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvConfig, PpoConfig, ServiceDistribution};
    use crate::policy::{Fifo, RandomPolicy, StatFirst};
    use crate::sim::OBS_DIM;

    fn config() -> EnvConfig {
        EnvConfig {
            num_machines: 2,
            episode_length: 30,
            arrival_rate: 0.7,
            ..EnvConfig::default()
        }
    }

    #[test]
    fn test_episode_runs_to_horizon() {
        let mut env = LabEnv::new(config(), 3);
        let outcome = run_episode(&mut env, &mut Fifo);
        assert_eq!(outcome.steps, 30);
        assert_eq!(env.clock(), 30);
        assert!(outcome.total_reward <= 0.0);
        let penalties: f64 = outcome.completions.iter().map(|c| c.penalty).sum();
        assert!((outcome.total_reward + penalties).abs() < 1e-9);
        assert_eq!(outcome.jobs_waiting, env.queue().len());
    }

    #[test]
    fn test_dyn_policy() {
        let mut env = LabEnv::new(config(), 3);
        let mut policies: Vec<Box<dyn Policy>> = vec![
            Box::new(Fifo),
            Box::new(StatFirst),
            Box::new(RandomPolicy::new(1)),
        ];
        for policy in policies.iter_mut() {
            let outcome = run_episode(&mut env, policy.as_mut());
            assert_eq!(outcome.steps, 30, "{}", policy.name());
        }
    }

    #[test]
    fn test_no_load_no_penalty() {
        let cfg = EnvConfig {
            arrival_rate: 0.0,
            ..config()
        };
        let mut env = LabEnv::new(cfg, 0);
        let outcome = run_episode(&mut env, &mut Fifo);
        assert_eq!(outcome.total_reward, 0.0);
        assert!(outcome.completions.is_empty());
        assert_eq!(outcome.jobs_waiting, 0);
    }

    #[test]
    fn test_collect_episode_fills_buffer() {
        let cfg = EnvConfig {
            service_distribution: ServiceDistribution::Deterministic,
            ..config()
        };
        let mut env = LabEnv::new(cfg, 5);
        let mut agent =
            PpoAgent::new(OBS_DIM, env.num_actions(), &PpoConfig::default(), 5).unwrap();

        let (outcome, buffer) = collect_episode(&mut env, &mut agent).unwrap();
        assert_eq!(buffer.len(), 30);
        assert_eq!(outcome.steps, 30);
        assert!((buffer.total_reward() - outcome.total_reward).abs() < 1e-9);

        let batch = buffer.as_batch();
        // First stored observation is the post-reset state.
        assert_eq!(batch.observations[0], [0.0, 0.0, 2.0]);
        assert!(batch.actions.iter().all(|&a| a < env.num_actions()));
    }
}
