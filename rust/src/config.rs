//! Configuration types for the CPM engine and the optimization advisor.

use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_MINUTES_PER_DAY;

/// Tolerance (in days) used by every timing comparison.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Configuration shared by all pipeline stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Comparison tolerance in days; floats within this of zero are critical.
    pub epsilon: f64,
    /// Storage ratio used to normalize lag minutes into days.
    pub minutes_per_day: f64,
    /// Reject graphs with more tasks than this before any pass runs.
    pub max_tasks: Option<usize>,
    /// Upper bound on the number of critical chains enumerated.
    pub max_critical_chains: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=detail, 3=debug.
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            minutes_per_day: DEFAULT_MINUTES_PER_DAY,
            max_tasks: None,
            max_critical_chains: 64,
            verbosity: 0,
        }
    }
}

/// Configuration for schedule-compression advice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Largest fraction of a task's duration that compression may remove.
    pub max_compression_ratio: f64,
    /// Compression never takes a task below this many days.
    pub min_task_duration_days: f64,
    /// Heuristic cost of removing one day of lag.
    pub lag_cost_per_day: f64,
    /// Heuristic cost of removing one day of task duration (crashing).
    pub compression_cost_per_day: f64,
    /// Maximum greedy edit/re-schedule rounds per strategy.
    pub max_iterations: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_compression_ratio: 0.25,
            min_task_duration_days: 1.0,
            lag_cost_per_day: 1.0,
            compression_cost_per_day: 2.5,
            max_iterations: 64,
        }
    }
}
