//! Error and warning types for the CPM pipeline.
//!
//! Fatal conditions are `CpmError` variants and abort the run before any
//! partial result is produced. Warnings are plain data returned next to the
//! schedule for the caller to display or ignore.

use serde::Serialize;
use thiserror::Error;

/// Structural problems in the input snapshot, raised before any pass runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Outline id must not be empty")]
    EmptyOutlineId,
    #[error("Duplicate outline id: {0}")]
    DuplicateOutlineId(String),
    #[error("Task {task} depends on unknown task {predecessor}")]
    DanglingPredecessor { task: String, predecessor: String },
    #[error("Illegal dependency type: {0:?}")]
    IllegalDependencyType(String),
    #[error("Task {task} has negative duration {duration}")]
    NegativeDuration { task: String, duration: f64 },
    #[error("Task {task} has a non-finite duration")]
    NonFiniteDuration { task: String },
    #[error("Dependency {predecessor} -> {task} has a non-finite lag")]
    NonFiniteLag { task: String, predecessor: String },
    #[error("Minutes per day must be positive and finite, got {0}")]
    InvalidMinutesPerDay(f64),
    #[error("Project has {count} tasks, exceeding the limit of {limit}")]
    TooManyTasks { count: usize, limit: usize },
    #[error("Project end {0} is not a finite day offset")]
    NonFiniteProjectEnd(f64),
    #[error("Target duration {0} must be a finite, non-negative day count")]
    InvalidTargetDuration(f64),
    #[error("Unknown task: {0}")]
    UnknownTask(String),
    #[error("Task {task} has no dependency #{index}")]
    UnknownDependency { task: String, index: usize },
}

/// A dependency cycle, naming every task that participates in it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Circular dependency detected: {}", .outline_ids.join(" -> "))]
pub struct CycleError {
    /// Tasks on the cycle, in edge order.
    pub outline_ids: Vec<String>,
}

/// Negative total float beyond epsilon after the backward pass.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Schedule is infeasible for project end {project_end}: {} task(s) have negative float, worst {}",
    .violations.len(),
    describe_worst(.violations)
)]
pub struct InfeasibleScheduleError {
    /// The project end the backward pass was anchored on.
    pub project_end: f64,
    /// (outline id, total float) for every offending task, most negative first.
    pub violations: Vec<(String, f64)>,
}

fn describe_worst(violations: &[(String, f64)]) -> String {
    match violations.first() {
        Some((id, float)) => format!("{id} ({float:.3} days)"),
        None => "none".to_string(),
    }
}

/// Any fatal pipeline error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CpmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error(transparent)]
    Infeasible(#[from] InfeasibleScheduleError),
}

/// A dependency edge touching a summary task; the edge is ignored for CPM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryConstraintWarning {
    /// The summary task the edge touches.
    pub summary_id: String,
    pub predecessor_id: String,
    pub successor_id: String,
}

impl std::fmt::Display for SummaryConstraintWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dependency {} -> {} touches summary task {} and was ignored",
            self.predecessor_id, self.successor_id, self.summary_id
        )
    }
}

/// Non-fatal findings reported alongside a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    SummaryConstraint(SummaryConstraintWarning),
    /// A milestone carried a duration; it was scheduled as zero-length.
    MilestoneDurationIgnored {
        outline_id: String,
        duration_days: f64,
    },
    /// The caller's `is_summary` flag disagrees with the outline hierarchy.
    SummaryFlagMismatch {
        outline_id: String,
        declared: bool,
        derived: bool,
    },
}

impl std::fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SummaryConstraint(warning) => warning.fmt(f),
            Self::MilestoneDurationIgnored {
                outline_id,
                duration_days,
            } => write!(
                f,
                "Milestone {outline_id} has duration {duration_days}; scheduled as 0"
            ),
            Self::SummaryFlagMismatch {
                outline_id,
                declared,
                derived,
            } => write!(
                f,
                "Task {outline_id} declared is_summary={declared} but the outline says {derived}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_names_members() {
        let err = CycleError {
            outline_ids: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> C");
    }

    #[test]
    fn test_infeasible_message_reports_worst() {
        let err = InfeasibleScheduleError {
            project_end: 10.0,
            violations: vec![("2".to_string(), -4.0), ("3".to_string(), -1.0)],
        };
        let message = err.to_string();
        assert!(message.contains("2 task(s)"));
        assert!(message.contains("2 (-4.000 days)"));
    }

    #[test]
    fn test_cpm_error_is_transparent() {
        let err: CpmError = ValidationError::DuplicateOutlineId("1.1".to_string()).into();
        assert_eq!(err.to_string(), "Duplicate outline id: 1.1");
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = ScheduleWarning::MilestoneDurationIgnored {
            outline_id: "4".to_string(),
            duration_days: 2.0,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "milestone_duration_ignored");
        assert_eq!(json["outline_id"], "4");
    }
}
