//! Configuration validation.
//!
//! The simulator and agent assume their configuration is valid and never
//! check it themselves. Loading a configuration runs these checks once and
//! reports every problem found, not just the first:
//! - Probabilities outside `[0, 1]`
//! - Non-positive machine counts, horizons, weights, means and step sizes
//! - Discount factor outside `[0, 1]`, negative clip range
//! - Zero-width hidden layers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LabConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Dotted path of the offending field, e.g. `environment.arrival_rate`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Value lies outside its admissible interval.
    OutOfRange,
    /// Value must be strictly positive.
    NonPositive,
    /// A count or size is zero where at least one is required.
    Empty,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, field: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates a full experiment configuration.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(cfg: &LabConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let env = &cfg.environment;
    let ppo = &cfg.rl_agent;

    if env.num_machines == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::Empty,
            "environment.num_machines",
            "at least one machine is required",
        ));
    }
    if env.episode_length == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::Empty,
            "environment.episode_length",
            "episode horizon must be at least one tick",
        ));
    }

    check_probability(&mut errors, "environment.arrival_rate", env.arrival_rate);
    check_probability(&mut errors, "environment.stat_fraction", env.stat_fraction);
    check_positive(
        &mut errors,
        "environment.stat_priority_weight",
        env.stat_priority_weight,
    );
    check_positive(
        &mut errors,
        "environment.routine_priority_weight",
        env.routine_priority_weight,
    );
    check_positive(
        &mut errors,
        "environment.service_time_mean",
        env.service_time_mean,
    );

    check_positive(&mut errors, "rl_agent.learning_rate", ppo.learning_rate);
    check_probability(&mut errors, "rl_agent.gamma", ppo.gamma);
    if !(ppo.clip_range >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            "rl_agent.clip_range",
            format!("clip range must be >= 0, got {}", ppo.clip_range),
        ));
    }
    if ppo.hidden_dims.iter().any(|&h| h == 0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::Empty,
            "rl_agent.hidden_dims",
            "hidden layers must have at least one unit",
        ));
    }

    if cfg.experiment.log_interval == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::Empty,
            "experiment.log_interval",
            "log interval must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Written as negated range checks so NaN is rejected too.
fn check_probability(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !(value > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositive,
            field,
            format!("must be > 0, got {value}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&LabConfig::default()).is_ok());
    }

    #[test]
    fn test_probability_bounds() {
        let mut cfg = LabConfig::default();
        cfg.environment.arrival_rate = -0.1;
        cfg.environment.stat_fraction = 1.01;

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_edge_probabilities_allowed() {
        let mut cfg = LabConfig::default();
        cfg.environment.arrival_rate = 1.0;
        cfg.environment.stat_fraction = 0.0;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let mut cfg = LabConfig::default();
        cfg.environment.service_time_mean = f64::NAN;

        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NonPositive
                && e.field == "environment.service_time_mean"));
    }

    #[test]
    fn test_zero_machines() {
        let mut cfg = LabConfig::default();
        cfg.environment.num_machines = 0;

        let errors = validate_config(&cfg).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::Empty));
    }

    #[test]
    fn test_agent_section_checked() {
        let mut cfg = LabConfig::default();
        cfg.rl_agent.learning_rate = 0.0;
        cfg.rl_agent.gamma = 1.5;
        cfg.rl_agent.clip_range = -0.2;
        cfg.rl_agent.hidden_dims = [64, 0];

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut cfg = LabConfig::default();
        cfg.environment.num_machines = 0;
        cfg.environment.episode_length = 0;
        cfg.environment.routine_priority_weight = -1.0;
        cfg.experiment.log_interval = 0;

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].to_string().starts_with("environment.num_machines"));
    }
}
