//! Backward pass: latest start and finish for every CPM task.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::errors::ValidationError;
use crate::forward_pass::ForwardPassResult;
use crate::graph::ProjectGraph;
use crate::interner::NodeId;
use crate::models::DependencyType;
use crate::{log_debug, log_summary};

/// Late dates of one task, in day offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LateTimes {
    pub late_start: f64,
    pub late_finish: f64,
}

/// Late dates for every non-summary task, indexed by `NodeId`.
#[derive(Clone, Debug, Default)]
pub struct BackwardPassResult {
    times: Vec<Option<LateTimes>>,
    project_end: f64,
}

impl BackwardPassResult {
    pub fn get(&self, node: NodeId) -> Option<LateTimes> {
        self.times.get(node as usize).copied().flatten()
    }

    /// The finish date the pass was anchored on.
    pub fn project_end(&self) -> f64 {
        self.project_end
    }
}

/// Latest finish a predecessor may take without delaying one successor.
///
/// Each arm inverts the matching forward-pass constraint.
fn candidate_finish(
    kind: DependencyType,
    successor: LateTimes,
    predecessor_duration: f64,
    lag_days: f64,
) -> f64 {
    match kind {
        DependencyType::FinishToStart => successor.late_start - lag_days,
        DependencyType::FinishToFinish => successor.late_finish - lag_days,
        DependencyType::StartToStart => successor.late_start - lag_days + predecessor_duration,
        DependencyType::StartToFinish => successor.late_finish - lag_days + predecessor_duration,
    }
}

/// Compute late start/finish in reverse topological order.
///
/// `project_end` defaults to the latest early finish. Every task's late
/// finish is bounded by the project end and by each successor's inverse
/// constraint; late start is late finish minus duration.
///
/// # Returns
/// * `Err(ValidationError::NonFiniteProjectEnd)` for a NaN or infinite target
pub fn backward_pass(
    graph: &ProjectGraph,
    order: &[NodeId],
    forward: &ForwardPassResult,
    project_end: Option<f64>,
    config: &EngineConfig,
) -> Result<BackwardPassResult, ValidationError> {
    let project_end = match project_end {
        Some(end) if !end.is_finite() => return Err(ValidationError::NonFiniteProjectEnd(end)),
        Some(end) => end,
        None => forward.project_finish(),
    };

    let mut times: Vec<Option<LateTimes>> = vec![None; graph.len()];

    for &node in order.iter().rev() {
        let duration = graph.duration(node);
        let mut late_finish = project_end;

        for edge in graph.outgoing(node) {
            let Some(succ) = times[edge.successor as usize] else {
                continue;
            };
            let candidate = candidate_finish(edge.kind, succ, duration, edge.lag_days);
            log_debug!(
                config.verbosity,
                "  {} <-{}{:+}- {}: candidate finish {:.3}",
                graph.outline_id(node),
                edge.kind,
                edge.lag_days,
                graph.outline_id(edge.successor),
                candidate
            );
            if candidate < late_finish {
                late_finish = candidate;
            }
        }

        times[node as usize] = Some(LateTimes {
            late_start: late_finish - duration,
            late_finish,
        });
    }

    log_summary!(
        config.verbosity,
        "Backward pass: {} tasks, project end {:.3}",
        order.len(),
        project_end
    );
    Ok(BackwardPassResult { times, project_end })
}
