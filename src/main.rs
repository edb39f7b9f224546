//! Reference experiment: baselines, PPO training, PPO evaluation.
//!
//! Usage: `u-labsched [config.json]`. Without an argument the built-in
//! defaults are used. Set `RUST_LOG=debug` for per-update statistics.

use anyhow::Context;
use tracing::info;

use u_labsched::config::LabConfig;
use u_labsched::policy::{Fifo, Policy, RandomPolicy, StatFirst};
use u_labsched::rl::PpoAgent;
use u_labsched::runner::{evaluate_policy, train, EvaluationSummary};
use u_labsched::sim::{LabEnv, OBS_DIM};
use u_labsched::telemetry::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => LabConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => {
            let config = LabConfig::default();
            config.validate().context("default config is invalid")?;
            config
        }
    };
    let seed = config.experiment.seed;
    let eval_episodes = config.experiment.num_episodes_eval;
    info!(
        machines = config.environment.num_machines,
        horizon = config.environment.episode_length,
        arrival_rate = config.environment.arrival_rate,
        seed,
        "starting experiment"
    );

    let mut env = LabEnv::new(config.environment.clone(), seed);
    let mut results: Vec<EvaluationSummary> = Vec::new();

    let mut baselines: Vec<Box<dyn Policy>> = vec![
        Box::new(Fifo),
        Box::new(StatFirst),
        Box::new(RandomPolicy::new(seed)),
    ];
    for policy in baselines.iter_mut() {
        env.reset(Some(seed));
        results.push(evaluate_policy(&mut env, policy.as_mut(), eval_episodes));
    }

    let mut agent = PpoAgent::new(OBS_DIM, env.num_actions(), &config.rl_agent, seed)
        .context("failed to build agent")?;
    env.reset(Some(seed));
    let history = train(
        &mut env,
        &mut agent,
        config.rl_agent.training_episodes,
        config.experiment.log_interval,
    )
    .context("training failed")?;
    if let Some(last) = history.last() {
        info!(
            episodes = history.len(),
            final_reward = last.total_reward,
            final_value_loss = last.stats.value_loss,
            "training finished"
        );
    }

    env.reset(Some(seed));
    results.push(evaluate_policy(&mut env, &mut agent, eval_episodes));

    for r in &results {
        info!(
            policy = %r.policy,
            mean_reward = r.mean_reward,
            std_reward = r.std_reward,
            on_time = r.kpi.on_time_rate,
            stat_on_time = r.kpi.stat_on_time_rate,
            "summary"
        );
    }
    Ok(())
}
