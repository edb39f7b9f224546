//! Episode quality metrics (KPIs).
//!
//! Computes turnaround indicators from the completions of one episode.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Completed | Jobs finished before the horizon |
//! | Total Tardiness | Sum of max(0, completion - deadline) |
//! | Maximum Tardiness | Largest single delay |
//! | Weighted Tardiness | Sum of tardiness * priority weight (= -episode reward) |
//! | On-Time Rate | Fraction meeting deadlines |
//! | STAT On-Time Rate | Same, urgent jobs only |
//! | Avg Wait | Mean time from arrival to start |
//! | Avg Flow Time | Mean time from arrival to completion |
//!
//! Jobs still queued or in service at the horizon are not counted, which is
//! why [`EpisodeKpi::jobs_waiting`] is reported alongside.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use super::EpisodeOutcome;
use crate::models::Tick;

/// Episode performance indicators. Time values are in ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeKpi {
    /// Jobs completed within the episode.
    pub completed_jobs: usize,
    /// Sum of tardiness over completed jobs.
    pub total_tardiness: Tick,
    /// Maximum tardiness of any single job.
    pub max_tardiness: Tick,
    /// Sum of tardiness * weight.
    pub weighted_tardiness: f64,
    /// Fraction of completed jobs that met their deadline (0.0..1.0).
    pub on_time_rate: f64,
    /// On-time fraction among completed STAT jobs (1.0 when there were none).
    pub stat_on_time_rate: f64,
    /// Mean ticks between arrival and start of service.
    pub avg_wait: f64,
    /// Mean ticks between arrival and completion.
    pub avg_flow_time: f64,
    /// Queue length at the horizon.
    pub jobs_waiting: usize,
}

impl EpisodeKpi {
    /// Computes KPIs from one episode's outcome.
    pub fn calculate(outcome: &EpisodeOutcome) -> Self {
        let mut total_tardiness: Tick = 0;
        let mut max_tardiness: Tick = 0;
        let mut weighted_tardiness = 0.0;
        let mut on_time = 0usize;
        let mut stat_total = 0usize;
        let mut stat_on_time = 0usize;
        let mut total_wait = 0.0;
        let mut total_flow = 0.0;

        for c in &outcome.completions {
            total_tardiness += c.tardiness;
            max_tardiness = max_tardiness.max(c.tardiness);
            weighted_tardiness += c.penalty;
            total_wait += c.wait_time() as f64;
            total_flow += c.flow_time() as f64;
            if c.on_time() {
                on_time += 1;
            }
            if c.urgency.is_stat() {
                stat_total += 1;
                if c.on_time() {
                    stat_on_time += 1;
                }
            }
        }

        let completed = outcome.completions.len();
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                1.0
            } else {
                num as f64 / den as f64
            }
        };
        let mean = |sum: f64| {
            if completed == 0 {
                0.0
            } else {
                sum / completed as f64
            }
        };

        Self {
            completed_jobs: completed,
            total_tardiness,
            max_tardiness,
            weighted_tardiness,
            on_time_rate: ratio(on_time, completed),
            stat_on_time_rate: ratio(stat_on_time, stat_total),
            avg_wait: mean(total_wait),
            avg_flow_time: mean(total_flow),
            jobs_waiting: outcome.jobs_waiting,
        }
    }

    /// Mean of several episodes' KPIs.
    ///
    /// Counts are averaged and rounded down; `max_tardiness` is the worst
    /// across episodes. Returns the default for an empty slice.
    pub fn average(kpis: &[EpisodeKpi]) -> Self {
        if kpis.is_empty() {
            return Self::default();
        }
        let n = kpis.len();
        let nf = n as f64;
        let sum_f = |f: fn(&EpisodeKpi) -> f64| kpis.iter().map(f).sum::<f64>() / nf;
        Self {
            completed_jobs: kpis.iter().map(|k| k.completed_jobs).sum::<usize>() / n,
            total_tardiness: kpis.iter().map(|k| k.total_tardiness).sum::<Tick>() / n as Tick,
            max_tardiness: kpis.iter().map(|k| k.max_tardiness).max().unwrap_or(0),
            weighted_tardiness: sum_f(|k| k.weighted_tardiness),
            on_time_rate: sum_f(|k| k.on_time_rate),
            stat_on_time_rate: sum_f(|k| k.stat_on_time_rate),
            avg_wait: sum_f(|k| k.avg_wait),
            avg_flow_time: sum_f(|k| k.avg_flow_time),
            jobs_waiting: kpis.iter().map(|k| k.jobs_waiting).sum::<usize>() / n,
        }
    }
}
