//! Strategy records returned by the advisor.

use serde::Serialize;

/// Which kind of edit a strategy makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPolicy {
    LagReduction,
    DurationCompression,
}

impl StrategyPolicy {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::LagReduction => "lag_reduction",
            Self::DurationCompression => "duration_compression",
        }
    }
}

impl std::fmt::Display for StrategyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Coarse risk of carrying out a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Tier for shortening a task by `ratio` of its original duration.
    pub(crate) fn for_compression(ratio: f64) -> Self {
        if ratio <= 0.10 {
            Self::Low
        } else if ratio <= 0.20 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Tier for removing `ratio` of a dependency's original lag.
    pub(crate) fn for_lag_cut(ratio: f64) -> Self {
        if ratio <= 0.50 {
            Self::Low
        } else if ratio <= 0.75 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One change to one task.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposedEdit {
    /// Shorten the lag on `dependencies[dependency_index]` of `outline_id`.
    Lag {
        outline_id: String,
        predecessor_id: String,
        dependency_index: usize,
        current_lag_days: f64,
        proposed_lag_days: f64,
    },
    /// Shorten the task itself.
    Duration {
        outline_id: String,
        current_days: f64,
        proposed_days: f64,
    },
}

impl ProposedEdit {
    /// The task the edit applies to.
    pub fn outline_id(&self) -> &str {
        match self {
            Self::Lag { outline_id, .. } | Self::Duration { outline_id, .. } => outline_id,
        }
    }

    /// Days removed from the lag or duration.
    pub fn days_removed(&self) -> f64 {
        match self {
            Self::Lag {
                current_lag_days,
                proposed_lag_days,
                ..
            } => current_lag_days - proposed_lag_days,
            Self::Duration {
                current_days,
                proposed_days,
                ..
            } => current_days - proposed_days,
        }
    }

    /// Fraction of the original value removed.
    pub fn reduction_ratio(&self) -> f64 {
        let original = match self {
            Self::Lag {
                current_lag_days, ..
            } => *current_lag_days,
            Self::Duration { current_days, .. } => *current_days,
        };
        if original > 0.0 {
            self.days_removed() / original
        } else {
            0.0
        }
    }
}

/// A set of edits that together shorten the project.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Strategy {
    pub policy: StrategyPolicy,
    /// Edits in outline order.
    pub edits: Vec<ProposedEdit>,
    /// Current duration minus `projected_duration`.
    pub days_saved: f64,
    /// Project duration measured after applying every edit.
    pub projected_duration: f64,
    pub meets_target: bool,
    /// Days removed weighted by the policy's per-day cost.
    pub cost_estimate: f64,
    pub risk: RiskTier,
    pub description: String,
}

/// Advisor output for one target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdvisorReport {
    /// The schedule already finishes within the target; `strategies` is empty.
    pub already_met: bool,
    pub current_duration: f64,
    pub target_duration: f64,
    /// Best first.
    pub strategies: Vec<Strategy>,
}
