//! Discrete-time lab scheduling environment.
//!
//! # Step order
//!
//! 1. Assignment: if the action names an idle machine and the queue is
//!    non-empty, the head job starts on it at the current clock value.
//! 2. Clock advance by one tick.
//! 3. Arrival: one Bernoulli trial with `arrival_rate`; on success a job
//!    is appended at the tail.
//! 4. Service: every busy machine consumes one tick of its job; finished
//!    jobs are released and their tardiness penalty is subtracted from
//!    the step reward.
//! 5. Termination once the clock reaches `episode_length`.
//!
//! Invalid assignments (busy machine, empty queue, or the no-op action)
//! silently do nothing; steps 2-5 happen regardless.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Action, Completion, Observation, SimEvent, OBS_DIM};
use crate::config::{EnvConfig, ServiceDistribution};
use crate::models::{Job, JobId, Machine, Tick, Urgency, WaitingQueue};
use crate::policy::SchedulingView;

/// Outcome of one [`LabEnv::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Observation after the step.
    pub observation: Observation,
    /// Sum of `-(tardiness * weight)` over jobs completed this step.
    pub reward: f64,
    /// The clock reached the horizon.
    pub terminated: bool,
    /// Always `false`; episodes only end at the horizon.
    pub truncated: bool,
    /// What happened, in step order.
    pub events: Vec<SimEvent>,
}

impl StepResult {
    /// Completions recorded in this step.
    pub fn completions(&self) -> impl Iterator<Item = &Completion> {
        self.events.iter().filter_map(|e| match e {
            SimEvent::Completion(c) => Some(c),
            _ => None,
        })
    }
}

/// The scheduling simulator.
///
/// Owns the clock, the waiting queue and the machine array. One instance
/// is driven by one episode loop at a time.
///
/// # Example
///
/// ```
/// use u_labsched::config::EnvConfig;
/// use u_labsched::sim::LabEnv;
///
/// let mut env = LabEnv::new(EnvConfig { episode_length: 3, ..EnvConfig::default() }, 7);
/// let obs = env.reset(None);
/// assert_eq!(obs[0], 0.0); // empty queue
///
/// let noop = env.noop_action();
/// let mut done = false;
/// while !done {
///     done = env.step(noop).terminated;
/// }
/// assert_eq!(env.clock(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct LabEnv {
    config: EnvConfig,
    rng: StdRng,
    clock: Tick,
    next_job_id: JobId,
    queue: WaitingQueue,
    machines: Vec<Machine>,
}

impl LabEnv {
    /// Creates an environment in its reset state, seeding the arrival RNG.
    ///
    /// The configuration is used as given; see [`crate::validation`].
    pub fn new(config: EnvConfig, seed: u64) -> Self {
        let machines = (0..config.num_machines).map(Machine::new).collect();
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            clock: 0,
            next_job_id: 0,
            queue: WaitingQueue::new(),
            machines,
        }
    }

    /// Starts a new episode.
    ///
    /// `Some(seed)` reseeds the arrival process; `None` keeps drawing from
    /// the current stream, so consecutive episodes differ but a whole run
    /// is reproducible from the constructor seed.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.clock = 0;
        self.next_job_id = 0;
        self.queue.clear();
        self.machines = (0..self.config.num_machines).map(Machine::new).collect();
        debug!(
            machines = self.config.num_machines,
            horizon = self.config.episode_length,
            "environment reset"
        );
        self.observation()
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self, action: Action) -> StepResult {
        debug_assert!(
            action <= self.config.num_machines,
            "action {action} outside action space 0..={}",
            self.config.num_machines
        );

        let mut events = Vec::new();
        let mut reward = 0.0;

        if let Some(event) = self.try_assign(action) {
            events.push(event);
        }

        self.clock += 1;

        if let Some(event) = self.generate_arrival() {
            events.push(event);
        }

        let now = self.clock;
        for machine in &mut self.machines {
            if let Some(job) = machine.advance(now) {
                reward -= job.penalty_at(now);
                if let Some(completion) = Completion::from_job(&job, machine.id) {
                    trace!(
                        job = completion.job_id,
                        machine = completion.machine_id,
                        tardiness = completion.tardiness,
                        penalty = completion.penalty,
                        "job completed"
                    );
                    events.push(SimEvent::Completion(completion));
                }
            }
        }

        StepResult {
            observation: self.observation(),
            reward,
            terminated: self.clock >= self.config.episode_length,
            truncated: false,
            events,
        }
    }

    /// `[queue length, STAT fraction of queue, idle machine count]`.
    pub fn observation(&self) -> Observation {
        let obs: Observation = [
            self.queue.len() as f64,
            self.queue.stat_fraction(),
            self.idle_machine_count() as f64,
        ];
        debug_assert_eq!(obs.len(), OBS_DIM);
        obs
    }

    /// Current clock value.
    pub fn clock(&self) -> Tick {
        self.clock
    }

    /// Environment configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Waiting jobs, head first.
    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    /// Machine array.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Number of idle machines.
    pub fn idle_machine_count(&self) -> usize {
        self.machines.iter().filter(|m| m.is_idle()).count()
    }

    /// Size of the action space, `num_machines + 1`.
    pub fn num_actions(&self) -> usize {
        self.config.action_dim()
    }

    /// The no-op action, `num_machines`.
    pub fn noop_action(&self) -> Action {
        self.config.num_machines
    }

    /// Whether the clock has reached the horizon.
    pub fn is_terminal(&self) -> bool {
        self.clock >= self.config.episode_length
    }

    /// Hands a policy the observable state together with the right to reorder the queue.
    pub fn view_mut(&mut self) -> SchedulingView<'_> {
        SchedulingView {
            clock: self.clock,
            queue: &mut self.queue,
            machines: &self.machines,
        }
    }

    fn try_assign(&mut self, action: Action) -> Option<SimEvent> {
        let machine = self.machines.get_mut(action)?;
        if !machine.is_idle() {
            return None;
        }
        let job = self.queue.pop_front()?;
        let job_id = job.id;
        if let Err(job) = machine.assign(job, self.clock) {
            self.queue.push_front(job);
            return None;
        }
        trace!(job = job_id, machine = action, tick = self.clock, "job assigned");
        Some(SimEvent::Assignment {
            job_id,
            machine_id: action,
            tick: self.clock,
        })
    }

    fn generate_arrival(&mut self) -> Option<SimEvent> {
        if self.rng.random::<f64>() >= self.config.arrival_rate {
            return None;
        }

        let urgency = if self.rng.random::<f64>() < self.config.stat_fraction {
            Urgency::Stat
        } else {
            Urgency::Routine
        };
        let service_time = self.sample_service_time();

        let job = Job::new(self.next_job_id, self.clock, service_time)
            .with_deadline(self.clock + self.config.deadline_offset(urgency))
            .with_urgency(urgency)
            .with_priority_weight(self.config.priority_weight(urgency));
        self.next_job_id += 1;

        let event = SimEvent::Arrival {
            job_id: job.id,
            urgency,
            service_time,
            tick: self.clock,
        };
        trace!(job = job.id, ?urgency, service_time, deadline = job.deadline, "job arrived");
        self.queue.push_back(job);
        Some(event)
    }

    fn sample_service_time(&mut self) -> u32 {
        let mean = self.config.service_time_mean;
        let raw = match self.config.service_distribution {
            ServiceDistribution::Exponential => {
                let unit: f64 = Exp1.sample(&mut self.rng);
                unit * mean
            }
            ServiceDistribution::Deterministic => mean,
        };
        // `as` saturates; NaN maps to 0 and is clamped below.
        (raw.floor() as u32).max(1)
    }
}
