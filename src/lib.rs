//! Priority-aware lab scheduling for the U-Engine ecosystem.
//!
//! Simulates machines serving urgent (STAT) and routine jobs with
//! deadlines, and trains/evaluates dispatching policies against it,
//! including an episode-scoped PPO agent learning from delayed,
//! tardiness-based rewards.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `Urgency`, `Machine`, `WaitingQueue`
//! - **`sim`**: Discrete-time simulator `LabEnv` with step events
//! - **`policy`**: `Policy` contract and heuristic baselines (FIFO, STAT-first, random)
//! - **`rl`**: Episode buffer, candle function approximator, PPO agent
//! - **`runner`**: Episode driver, training loop, evaluation, KPIs
//! - **`config`** / **`validation`**: JSON configuration and its checks
//! - **`error`**: Crate error type
//! - **`telemetry`**: Tracing subscriber setup
//!
//! # Quick start
//!
//! ```
//! use u_labsched::config::{EnvConfig, PpoConfig};
//! use u_labsched::policy::StatFirst;
//! use u_labsched::rl::PpoAgent;
//! use u_labsched::runner::{evaluate_policy, train};
//! use u_labsched::sim::{LabEnv, OBS_DIM};
//!
//! let config = EnvConfig { episode_length: 20, ..EnvConfig::default() };
//! let mut env = LabEnv::new(config, 7);
//!
//! let baseline = evaluate_policy(&mut env, &mut StatFirst, 3);
//! assert!(baseline.mean_reward <= 0.0);
//!
//! let mut agent = PpoAgent::new(OBS_DIM, env.num_actions(), &PpoConfig::default(), 7).unwrap();
//! let history = train(&mut env, &mut agent, 2, 1).unwrap();
//! assert_eq!(history.len(), 2);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Schulman et al. (2017), "Proximal Policy Optimization Algorithms"

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod rl;
pub mod runner;
pub mod sim;
pub mod telemetry;
pub mod validation;

pub use error::{LabError, LabResult};
