//! Forward pass: earliest start and finish for every CPM task.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::graph::ProjectGraph;
use crate::interner::NodeId;
use crate::models::DependencyType;
use crate::{log_debug, log_summary};

/// Early dates of one task, in day offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EarlyTimes {
    pub early_start: f64,
    pub early_finish: f64,
}

/// Early dates for every non-summary task, indexed by `NodeId`.
#[derive(Clone, Debug, Default)]
pub struct ForwardPassResult {
    times: Vec<Option<EarlyTimes>>,
}

impl ForwardPassResult {
    /// `None` for summary tasks, which take no part in CPM.
    pub fn get(&self, node: NodeId) -> Option<EarlyTimes> {
        self.times.get(node as usize).copied().flatten()
    }

    /// Latest early finish; 0 for an empty project.
    pub fn project_finish(&self) -> f64 {
        self.times
            .iter()
            .flatten()
            .map(|t| t.early_finish)
            .fold(0.0, f64::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, EarlyTimes)> + '_ {
        self.times
            .iter()
            .enumerate()
            .filter_map(|(node, t)| t.map(|t| (node as NodeId, t)))
    }
}

/// Earliest start a successor may take given one predecessor edge.
pub(crate) fn candidate_start(
    kind: DependencyType,
    predecessor: EarlyTimes,
    successor_duration: f64,
    lag_days: f64,
) -> f64 {
    match kind {
        DependencyType::FinishToStart => predecessor.early_finish + lag_days,
        DependencyType::StartToStart => predecessor.early_start + lag_days,
        DependencyType::FinishToFinish => predecessor.early_finish + lag_days - successor_duration,
        DependencyType::StartToFinish => predecessor.early_start + lag_days - successor_duration,
    }
}

/// Compute early start/finish in topological order.
///
/// A task without predecessors starts at 0; otherwise it starts at the
/// largest candidate over its incoming edges. The maximum is exact; epsilon
/// only applies later, when float is classified.
pub fn forward_pass(
    graph: &ProjectGraph,
    order: &[NodeId],
    config: &EngineConfig,
) -> ForwardPassResult {
    let mut times: Vec<Option<EarlyTimes>> = vec![None; graph.len()];

    for &node in order {
        let duration = graph.duration(node);
        let mut early_start: Option<f64> = None;

        for edge in graph.incoming(node) {
            let Some(pred) = times[edge.predecessor as usize] else {
                continue;
            };
            let candidate = candidate_start(edge.kind, pred, duration, edge.lag_days);
            log_debug!(
                config.verbosity,
                "  {} -{}{:+}-> {}: candidate start {:.3}",
                graph.outline_id(edge.predecessor),
                edge.kind,
                edge.lag_days,
                graph.outline_id(node),
                candidate
            );
            if early_start.map_or(true, |current| candidate > current) {
                early_start = Some(candidate);
            }
        }

        let early_start = early_start.unwrap_or(0.0);
        times[node as usize] = Some(EarlyTimes {
            early_start,
            early_finish: early_start + duration,
        });
    }

    let result = ForwardPassResult { times };
    log_summary!(
        config.verbosity,
        "Forward pass: {} tasks, project finish {:.3}",
        order.len(),
        result.project_finish()
    );
    result
}
