//! Total/free float and critical path classification.

use serde::Serialize;

use crate::backward_pass::BackwardPassResult;
use crate::config::EngineConfig;
use crate::errors::InfeasibleScheduleError;
use crate::forward_pass::{EarlyTimes, ForwardPassResult};
use crate::graph::{Edge, ProjectGraph};
use crate::interner::NodeId;
use crate::models::DependencyType;
use crate::{log_detail, log_summary};

/// Slack figures for one task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FloatInfo {
    /// LS - ES: delay the task can absorb without moving the project end.
    pub total_float: f64,
    /// Delay the task can absorb without moving any successor.
    pub free_float: f64,
    pub is_critical: bool,
}

/// Output of the classifier.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    floats: Vec<Option<FloatInfo>>,
    /// Critical tasks in topological order.
    pub critical_path: Vec<NodeId>,
    /// Maximal chains over driving critical edges, in outline order.
    pub critical_chains: Vec<Vec<NodeId>>,
}

impl Classification {
    pub fn get(&self, node: NodeId) -> Option<FloatInfo> {
        self.floats.get(node as usize).copied().flatten()
    }

    pub fn is_critical(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|f| f.is_critical)
    }
}

/// How far the successor sits past the point one dependency requires.
pub(crate) fn dependency_slack(
    kind: DependencyType,
    lag_days: f64,
    predecessor: EarlyTimes,
    successor: EarlyTimes,
) -> f64 {
    let from = if kind.from_start() {
        predecessor.early_start
    } else {
        predecessor.early_finish
    };
    let to = if kind.constrains_finish() {
        successor.early_finish
    } else {
        successor.early_start
    };
    to - (from + lag_days)
}

pub(crate) fn edge_slack(edge: &Edge, predecessor: EarlyTimes, successor: EarlyTimes) -> f64 {
    dependency_slack(edge.kind, edge.lag_days, predecessor, successor)
}

/// Compute float for every CPM task and identify the critical path.
///
/// A task is critical when `|total_float| <= epsilon`.
///
/// # Returns
/// * `Err(InfeasibleScheduleError)` if any task's total float is below
///   `-epsilon`, e.g. when a caller-forced project end is earlier than the
///   earliest feasible completion. Negative float is never clamped.
pub fn classify(
    graph: &ProjectGraph,
    order: &[NodeId],
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
    config: &EngineConfig,
) -> Result<Classification, InfeasibleScheduleError> {
    let eps = config.epsilon;
    let project_end = backward.project_end();
    let mut floats: Vec<Option<FloatInfo>> = vec![None; graph.len()];
    let mut violations: Vec<(String, f64)> = Vec::new();

    for &node in order {
        let (Some(early), Some(late)) = (forward.get(node), backward.get(node)) else {
            continue;
        };
        let total_float = late.late_start - early.early_start;
        if total_float < -eps {
            violations.push((graph.outline_id(node).to_string(), total_float));
        }

        let free_float = graph
            .outgoing(node)
            .filter_map(|edge| {
                forward
                    .get(edge.successor)
                    .map(|succ| edge_slack(edge, early, succ))
            })
            .fold(project_end - early.early_finish, f64::min)
            .min(total_float)
            .max(0.0);

        let is_critical = total_float.abs() <= eps;
        log_detail!(
            config.verbosity,
            "  {}: ES={:.3} EF={:.3} LS={:.3} LF={:.3} TF={:.3}{}",
            graph.outline_id(node),
            early.early_start,
            early.early_finish,
            late.late_start,
            late.late_finish,
            total_float,
            if is_critical { " *" } else { "" }
        );
        floats[node as usize] = Some(FloatInfo {
            total_float,
            free_float,
            is_critical,
        });
    }

    if !violations.is_empty() {
        violations.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        return Err(InfeasibleScheduleError {
            project_end,
            violations,
        });
    }

    let critical_path: Vec<NodeId> = order
        .iter()
        .copied()
        .filter(|&node| floats[node as usize].is_some_and(|f| f.is_critical))
        .collect();

    let mut classification = Classification {
        floats,
        critical_path,
        critical_chains: Vec::new(),
    };
    classification.critical_chains =
        critical_chains(graph, forward, &classification, config.max_critical_chains, eps);

    log_summary!(
        config.verbosity,
        "Classified: {} critical of {} tasks, {} critical chain(s)",
        classification.critical_path.len(),
        order.len(),
        classification.critical_chains.len()
    );
    Ok(classification)
}

/// An edge drives its successor when both ends are critical and it leaves
/// no slack.
fn is_driving(
    edge: &Edge,
    forward: &ForwardPassResult,
    classification: &Classification,
    eps: f64,
) -> bool {
    if !classification.is_critical(edge.predecessor) || !classification.is_critical(edge.successor)
    {
        return false;
    }
    match (forward.get(edge.predecessor), forward.get(edge.successor)) {
        (Some(p), Some(s)) => edge_slack(edge, p, s).abs() <= eps,
        _ => false,
    }
}

/// Enumerate every maximal path through driving critical edges.
///
/// Chains start at critical tasks with no driving predecessor and end at
/// critical tasks with no driving successor; an isolated critical task is a
/// chain of one. Enumeration stops after `limit` chains.
fn critical_chains(
    graph: &ProjectGraph,
    forward: &ForwardPassResult,
    classification: &Classification,
    limit: usize,
    eps: f64,
) -> Vec<Vec<NodeId>> {
    let n = graph.len();
    let mut driving_out: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    let mut has_driving_in = vec![false; n];
    for edge in graph.edges() {
        if is_driving(edge, forward, classification, eps) {
            let next = &mut driving_out[edge.predecessor as usize];
            if !next.contains(&edge.successor) {
                next.push(edge.successor);
            }
            has_driving_in[edge.successor as usize] = true;
        }
    }

    let mut starts: Vec<NodeId> = classification
        .critical_path
        .iter()
        .copied()
        .filter(|&node| !has_driving_in[node as usize])
        .collect();
    starts.sort_unstable();

    let mut chains = Vec::new();
    for start in starts {
        // Depth-first over (path, next successor position).
        let mut path = vec![start];
        let mut cursors = vec![0usize];
        while let Some(&node) = path.last() {
            if chains.len() >= limit {
                return chains;
            }
            let depth = path.len() - 1;
            let next = &driving_out[node as usize];
            if next.is_empty() {
                chains.push(path.clone());
            }
            if cursors[depth] < next.len() {
                let successor = next[cursors[depth]];
                cursors[depth] += 1;
                path.push(successor);
                cursors.push(0);
            } else {
                path.pop();
                cursors.pop();
            }
        }
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backward_pass::backward_pass;
    use crate::forward_pass::forward_pass;
    use crate::graph::build_graph;
    use crate::models::{Dependency, Task};
    use crate::topo::topological_order;
    use chrono::NaiveDate;

    fn make_task(id: &str, duration: f64, preds: &[&str]) -> Task {
        preds.iter().fold(Task::new(id, duration), |task, pred| {
            task.with_dependency(Dependency::finish_to_start(*pred))
        })
    }

    fn run(
        tasks: &[Task],
        project_end: Option<f64>,
    ) -> (ProjectGraph, Result<Classification, InfeasibleScheduleError>) {
        let config = EngineConfig::default();
        let graph =
            build_graph(tasks, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), &config).unwrap();
        let order = topological_order(&graph).unwrap();
        let forward = forward_pass(&graph, &order, &config);
        let backward = backward_pass(&graph, &order, &forward, project_end, &config).unwrap();
        let classification = classify(&graph, &order, &forward, &backward, &config);
        (graph, classification)
    }

    #[test]
    fn test_single_task_is_critical() {
        let (g, c) = run(&[make_task("A", 4.0, &[])], None);
        let c = c.unwrap();
        let info = c.get(g.node("A").unwrap()).unwrap();
        assert_eq!(info.total_float, 0.0);
        assert!(info.is_critical);
        assert_eq!(c.critical_chains, vec![vec![0]]);
    }

    #[test]
    fn test_parallel_branch_float() {
        let (g, c) = run(
            &[
                make_task("A", 10.0, &[]),
                make_task("B", 5.0, &["A"]),
                make_task("C", 3.0, &["B"]),
                make_task("D", 2.0, &["A"]),
            ],
            None,
        );
        let c = c.unwrap();
        let d = c.get(g.node("D").unwrap()).unwrap();
        assert!((d.total_float - 6.0).abs() < 1e-9);
        assert!((d.free_float - 6.0).abs() < 1e-9);
        assert!(!d.is_critical);
        assert_eq!(g.outline_ids(&c.critical_path), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_free_float_smaller_than_total() {
        // X feeds Y; both sit beside a long critical task.
        let (g, c) = run(
            &[
                make_task("L", 10.0, &[]),
                make_task("X", 2.0, &[]),
                make_task("Y", 3.0, &["X"]),
            ],
            None,
        );
        let c = c.unwrap();
        let x = c.get(g.node("X").unwrap()).unwrap();
        assert!((x.total_float - 5.0).abs() < 1e-9);
        assert_eq!(x.free_float, 0.0);
        let y = c.get(g.node("Y").unwrap()).unwrap();
        assert!((y.free_float - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_critical_chains_reported() {
        // Two equal-length branches between s and e.
        let (g, c) = run(
            &[
                make_task("s", 1.0, &[]),
                make_task("p", 4.0, &["s"]),
                make_task("q", 4.0, &["s"]),
                make_task("e", 1.0, &["p", "q"]),
                make_task("z", 6.0, &[]),
            ],
            None,
        );
        let c = c.unwrap();
        let chains: Vec<Vec<String>> = c.critical_chains.iter().map(|ch| g.outline_ids(ch)).collect();
        assert_eq!(
            chains,
            vec![vec!["s", "p", "e"], vec!["s", "q", "e"], vec!["z"]]
        );
    }

    #[test]
    fn test_forced_early_end_is_infeasible() {
        let (_, c) = run(&[make_task("A", 5.0, &[]), make_task("B", 5.0, &["A"])], Some(7.0));
        let err = c.unwrap_err();
        assert_eq!(err.project_end, 7.0);
        assert_eq!(err.violations.len(), 2);
        assert!((err.violations[0].1 + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_near_zero_float_is_critical() {
        let (g, c) = run(
            &[
                make_task("A", 1.0 / 3.0, &[]),
                make_task("B", 1.0 / 3.0, &["A"]),
                make_task("C", 1.0 / 3.0, &["B"]),
                make_task("D", 1.0, &[]),
            ],
            None,
        );
        let c = c.unwrap();
        assert!(c.is_critical(g.node("D").unwrap()));
        assert!(c.is_critical(g.node("A").unwrap()));
    }
}
