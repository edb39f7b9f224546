//! Experiment configuration.
//!
//! Three sections mirror the reference experiment layout: the environment,
//! the PPO agent, and experiment-level knobs (seed, evaluation size,
//! logging cadence). Every field has a default so partial JSON files load.
//!
//! ```
//! use u_labsched::config::LabConfig;
//!
//! let cfg = LabConfig::from_json_str(r#"{ "environment": { "num_machines": 2 } }"#).unwrap();
//! assert_eq!(cfg.environment.num_machines, 2);
//! assert!((cfg.rl_agent.gamma - 0.99).abs() < 1e-12);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};
use crate::models::Urgency;
use crate::validation::validate_config;

/// How service durations are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceDistribution {
    /// `max(1, floor(Exp(mean)))`.
    #[default]
    Exponential,
    /// `max(1, floor(mean))` every time.
    Deterministic,
}

/// Simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Number of single-capacity machines.
    pub num_machines: usize,
    /// Episode horizon in ticks.
    pub episode_length: u64,
    /// Per-tick arrival probability (Bernoulli).
    pub arrival_rate: f64,
    /// Probability that an arriving job is STAT.
    pub stat_fraction: f64,
    /// Deadline offset for STAT jobs (ticks after arrival).
    pub stat_deadline: u64,
    /// Deadline offset for routine jobs (ticks after arrival).
    pub routine_deadline: u64,
    /// Tardiness penalty weight for STAT jobs.
    pub stat_priority_weight: f64,
    /// Tardiness penalty weight for routine jobs.
    pub routine_priority_weight: f64,
    /// Mean service duration (ticks).
    pub service_time_mean: f64,
    /// Service duration model.
    pub service_distribution: ServiceDistribution,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_machines: 3,
            episode_length: 200,
            arrival_rate: 0.6,
            stat_fraction: 0.2,
            stat_deadline: 10,
            routine_deadline: 40,
            stat_priority_weight: 5.0,
            routine_priority_weight: 1.0,
            service_time_mean: 4.0,
            service_distribution: ServiceDistribution::Exponential,
        }
    }
}

impl EnvConfig {
    /// Deadline offset for a class.
    pub fn deadline_offset(&self, urgency: Urgency) -> u64 {
        match urgency {
            Urgency::Stat => self.stat_deadline,
            Urgency::Routine => self.routine_deadline,
        }
    }

    /// Penalty weight for a class.
    pub fn priority_weight(&self, urgency: Urgency) -> f64 {
        match urgency {
            Urgency::Stat => self.stat_priority_weight,
            Urgency::Routine => self.routine_priority_weight,
        }
    }

    /// Size of the discrete action space (`num_machines + 1`, last is no-op).
    pub fn action_dim(&self) -> usize {
        self.num_machines + 1
    }
}

/// PPO agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpoConfig {
    /// Adam step size.
    pub learning_rate: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Ratio clip range epsilon.
    pub clip_range: f64,
    /// Widths of the two hidden layers.
    pub hidden_dims: [usize; 2],
    /// Number of training episodes (one update each).
    pub training_episodes: usize,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            learning_rate: 3e-4,
            gamma: 0.99,
            clip_range: 0.2,
            hidden_dims: [64, 64],
            training_episodes: 500,
        }
    }
}

/// Experiment-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Master seed for environment, agent and random baseline.
    pub seed: u64,
    /// Episodes per policy evaluation.
    pub num_episodes_eval: usize,
    /// Training progress is logged every this many episodes.
    pub log_interval: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_episodes_eval: 20,
            log_interval: 50,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Simulator section.
    pub environment: EnvConfig,
    /// Agent section.
    pub rl_agent: PpoConfig,
    /// Experiment section.
    pub experiment: ExperimentConfig,
}

impl LabConfig {
    /// Parses and validates configuration from a JSON string.
    pub fn from_json_str(input: &str) -> LabResult<Self> {
        let cfg: LabConfig = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> LabResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Runs all validation checks.
    pub fn validate(&self) -> LabResult<()> {
        validate_config(self).map_err(LabError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LabConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = LabConfig::from_json_str(
            r#"{
                "environment": { "num_machines": 1, "arrival_rate": 1.0,
                                 "service_distribution": "deterministic" },
                "experiment": { "seed": 42 }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.environment.num_machines, 1);
        assert_eq!(
            cfg.environment.service_distribution,
            ServiceDistribution::Deterministic
        );
        assert_eq!(cfg.environment.episode_length, EnvConfig::default().episode_length);
        assert_eq!(cfg.experiment.seed, 42);
        assert_eq!(cfg.rl_agent, PpoConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = LabConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = LabConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = LabConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LabError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = LabConfig::from_json_str(r#"{ "environment": { "arrival_rate": 1.5 } }"#)
            .unwrap_err();
        match err {
            LabError::InvalidConfig(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LabConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LabError::Io(_)));
    }

    #[test]
    fn test_class_lookups() {
        let env = EnvConfig::default();
        assert_eq!(env.deadline_offset(Urgency::Stat), env.stat_deadline);
        assert_eq!(env.deadline_offset(Urgency::Routine), env.routine_deadline);
        assert!((env.priority_weight(Urgency::Stat) - 5.0).abs() < 1e-12);
        assert_eq!(env.action_dim(), env.num_machines + 1);
    }
}
