use u_labsched::config::{EnvConfig, LabConfig, PpoConfig, ServiceDistribution};
use u_labsched::models::Urgency;
use u_labsched::policy::{Fifo, Policy, SchedulingView, StatFirst};
use u_labsched::rl::{broadcast_softmax, discounted_returns, EpisodeBuffer, PpoAgent};
use u_labsched::runner::{collect_episode, evaluate_policy, run_episode, train, EpisodeKpi};
use u_labsched::sim::{Action, LabEnv, OBS_DIM};

#[derive(Debug)]
struct AlwaysFirstMachine;

impl Policy for AlwaysFirstMachine {
    fn name(&self) -> &'static str {
        "always-0"
    }

    fn select_action(&mut self, _view: &mut SchedulingView<'_>) -> Action {
        0
    }
}

fn single_machine_config(weight: f64) -> EnvConfig {
    EnvConfig {
        num_machines: 1,
        episode_length: 5,
        arrival_rate: 1.0,
        stat_fraction: 0.0,
        routine_deadline: 1,
        routine_priority_weight: weight,
        service_time_mean: 2.0,
        service_distribution: ServiceDistribution::Deterministic,
        ..EnvConfig::default()
    }
}

#[test]
fn test_single_machine_scenario_rewards() {
    let w = 1.5;
    let mut env = LabEnv::new(single_machine_config(w), 0);
    env.reset(None);

    let mut rewards = Vec::new();
    let mut terminated = Vec::new();
    for _ in 0..5 {
        let result = env.step(0);
        rewards.push(result.reward);
        terminated.push(result.terminated);
    }

    let expected = [0.0, 0.0, -w, 0.0, -2.0 * w];
    for (got, want) in rewards.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "rewards {rewards:?}");
    }
    assert_eq!(terminated, vec![false, false, false, false, true]);
    assert_eq!(env.queue().len(), 3);
}

#[test]
fn test_single_machine_scenario_through_driver() {
    let mut env = LabEnv::new(single_machine_config(1.0), 0);
    let outcome = run_episode(&mut env, &mut AlwaysFirstMachine);

    assert_eq!(outcome.steps, 5);
    assert!((outcome.total_reward - (-3.0)).abs() < 1e-12);
    assert_eq!(outcome.completions.len(), 2);
    assert_eq!(outcome.completions[0].completion_time, 3);
    assert_eq!(outcome.completions[0].tardiness, 1);
    assert_eq!(outcome.completions[1].start_time, 3);
    assert_eq!(outcome.completions[1].tardiness, 2);

    let kpi = EpisodeKpi::calculate(&outcome);
    assert_eq!(kpi.total_tardiness, 3);
    assert_eq!(kpi.on_time_rate, 0.0);
    assert_eq!(kpi.jobs_waiting, 3);
    assert!((kpi.weighted_tardiness + outcome.total_reward).abs() < 1e-12);
}

#[test]
fn test_fifo_matches_always_first_machine_on_one_machine() {
    let mut a = LabEnv::new(single_machine_config(1.0), 0);
    let mut b = LabEnv::new(single_machine_config(1.0), 0);
    let fifo = run_episode(&mut a, &mut Fifo);
    let fixed = run_episode(&mut b, &mut AlwaysFirstMachine);
    assert_eq!(fifo.total_reward, fixed.total_reward);
}

#[test]
fn test_stat_first_helps_urgent_jobs_under_load() {
    let config = EnvConfig {
        num_machines: 1,
        episode_length: 300,
        arrival_rate: 0.3,
        stat_fraction: 0.3,
        ..EnvConfig::default()
    };
    let mut fifo_env = LabEnv::new(config.clone(), 21);
    let mut stat_env = LabEnv::new(config, 21);
    let fifo = evaluate_policy(&mut fifo_env, &mut Fifo, 10);
    let stat = evaluate_policy(&mut stat_env, &mut StatFirst, 10);
    assert!(stat.kpi.stat_on_time_rate >= fifo.kpi.stat_on_time_rate);
}

#[test]
fn test_agent_distribution_is_uniform_after_training() {
    let mut env = LabEnv::new(
        EnvConfig {
            num_machines: 3,
            episode_length: 40,
            ..EnvConfig::default()
        },
        1,
    );
    let mut agent = PpoAgent::new(OBS_DIM, env.num_actions(), &PpoConfig::default(), 1).unwrap();
    let history = train(&mut env, &mut agent, 4, 0).unwrap();
    assert_eq!(history.len(), 4);

    let uniform = (1.0 / env.num_actions() as f64).ln();
    for obs in [[0.0, 0.0, 3.0], [7.0, 0.5, 0.0], [20.0, 1.0, 1.0]] {
        let sample = agent.select_action(&obs).unwrap();
        assert!((sample.log_prob - uniform).abs() < 1e-12);
    }
    for p in broadcast_softmax(123.0, env.num_actions()) {
        assert!((p - 0.25).abs() < 1e-12);
    }
}

#[test]
fn test_returns_match_collected_rewards() {
    let mut env = LabEnv::new(
        EnvConfig {
            num_machines: 1,
            episode_length: 60,
            arrival_rate: 0.9,
            ..EnvConfig::default()
        },
        3,
    );
    let config = PpoConfig {
        gamma: 0.95,
        ..PpoConfig::default()
    };
    let mut agent = PpoAgent::new(OBS_DIM, env.num_actions(), &config, 3).unwrap();
    let (outcome, buffer): (_, EpisodeBuffer) = collect_episode(&mut env, &mut agent).unwrap();

    let returns = agent.compute_returns(buffer.rewards());
    assert_eq!(returns, discounted_returns(buffer.rewards(), 0.95));
    let last = returns.len() - 1;
    assert_eq!(returns[last], buffer.rewards()[last]);
    for t in 0..last {
        let expected = buffer.rewards()[t] + 0.95 * returns[t + 1];
        assert!((returns[t] - expected).abs() < 1e-9);
    }
    assert!((buffer.total_reward() - outcome.total_reward).abs() < 1e-9);

    let stats = agent.update_from_episode(&buffer).unwrap();
    assert_eq!(stats.steps, 60);
    assert!((stats.mean_ratio - 1.0).abs() < 1e-12);
}

#[test]
fn test_config_file_shape() {
    let json = r#"{
        "environment": { "num_machines": 2, "stat_fraction": 0.5 },
        "rl_agent": { "learning_rate": 0.001 },
        "experiment": { "seed": 42 }
    }"#;
    let config = LabConfig::from_json_str(json).unwrap();
    assert_eq!(config.environment.num_machines, 2);
    assert_eq!(config.environment.episode_length, 200);
    assert_eq!(config.rl_agent.hidden_dims, [64, 64]);
    assert_eq!(config.experiment.seed, 42);
    assert_eq!(config.environment.priority_weight(Urgency::Stat), 5.0);

    assert!(LabConfig::from_json_str(r#"{ "environment": { "arrival_rate": 2.0 } }"#).is_err());
}
