//! Project graph construction and validation.
//!
//! Validates a task snapshot, interns outline ids, derives the summary
//! hierarchy and assembles the dependency digraph (edges run predecessor ->
//! successor). Edges touching a summary task are dropped with a warning.
//! Cycles among the remaining edges are rejected with every participating
//! task named.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::config::EngineConfig;
use crate::errors::{
    CpmError, CycleError, ScheduleWarning, SummaryConstraintWarning, ValidationError,
};
use crate::interner::{NodeId, OutlineInterner};
use crate::models::{DependencyType, Task};
use crate::outline::OutlineHierarchy;
use crate::{log_detail, log_summary};

/// A dependency edge between two non-summary tasks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub predecessor: NodeId,
    pub successor: NodeId,
    pub kind: DependencyType,
    pub lag_days: f64,
    /// Position of the dependency in the successor's `dependencies` list.
    pub dependency_index: usize,
}

/// Validated, immutable project snapshot.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    anchor_date: NaiveDate,
    /// Tasks indexed by `NodeId` (ascending outline id).
    tasks: Vec<Task>,
    index: OutlineInterner,
    hierarchy: OutlineHierarchy,
    summary: Vec<bool>,
    /// Durations used by CPM (milestones forced to zero).
    durations: Vec<f64>,
    edges: Vec<Edge>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    warnings: Vec<ScheduleWarning>,
}

/// Node accessors take a `NodeId` issued by this graph (from [`node`],
/// [`cpm_nodes`] or an [`Edge`]). They index dense arrays and panic on an id
/// from another graph.
///
/// [`node`]: ProjectGraph::node
/// [`cpm_nodes`]: ProjectGraph::cpm_nodes
impl ProjectGraph {
    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in ascending outline-id order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    pub fn task(&self, node: NodeId) -> &Task {
        &self.tasks[node as usize]
    }

    pub fn node(&self, outline_id: &str) -> Option<NodeId> {
        self.index.get(outline_id)
    }

    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    pub fn outline_id(&self, node: NodeId) -> &str {
        &self.tasks[node as usize].outline_id
    }

    pub fn hierarchy(&self) -> &OutlineHierarchy {
        &self.hierarchy
    }

    /// Derived summary status (not the caller's advisory flag).
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    pub fn is_summary(&self, node: NodeId) -> bool {
        self.summary[node as usize]
    }

    /// CPM duration, zero for milestones.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    pub fn duration(&self, node: NodeId) -> f64 {
        self.durations[node as usize]
    }

    /// Non-summary tasks, the nodes CPM schedules, ascending.
    pub fn cpm_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.tasks.len() as NodeId).filter(move |&node| !self.is_summary(node))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges ending at `node`, ordered by predecessor.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming[node as usize].iter().map(move |&e| &self.edges[e])
    }

    /// Edges leaving `node`, ordered by successor.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing[node as usize].iter().map(move |&e| &self.edges[e])
    }

    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    pub fn outline_ids(&self, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&node| self.outline_id(node).to_string())
            .collect()
    }

    /// Find one dependency cycle by depth-first search, if any exists.
    ///
    /// Roots and successors are visited in outline order, so the same graph
    /// always reports the same cycle.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            New,
            OnPath,
            Done,
        }

        let mut visit = vec![Visit::New; self.len()];
        let mut path: Vec<NodeId> = Vec::new();
        let mut cursors: Vec<usize> = Vec::new();

        for root in self.cpm_nodes() {
            if visit[root as usize] != Visit::New {
                continue;
            }
            visit[root as usize] = Visit::OnPath;
            path.push(root);
            cursors.push(0);

            while let Some(&node) = path.last() {
                let depth = path.len() - 1;
                let out = &self.outgoing[node as usize];
                if cursors[depth] < out.len() {
                    let next = self.edges[out[cursors[depth]]].successor;
                    cursors[depth] += 1;
                    match visit[next as usize] {
                        Visit::New => {
                            visit[next as usize] = Visit::OnPath;
                            path.push(next);
                            cursors.push(0);
                        }
                        Visit::OnPath => {
                            let start = path.iter().position(|&p| p == next).unwrap_or(0);
                            return Some(path[start..].to_vec());
                        }
                        Visit::Done => {}
                    }
                } else {
                    visit[node as usize] = Visit::Done;
                    path.pop();
                    cursors.pop();
                }
            }
        }
        None
    }
}

fn validate_tasks(tasks: &[Task], config: &EngineConfig) -> Result<(), ValidationError> {
    if let Some(limit) = config.max_tasks {
        if tasks.len() > limit {
            return Err(ValidationError::TooManyTasks {
                count: tasks.len(),
                limit,
            });
        }
    }

    let mut seen: FxHashSet<&str> =
        FxHashSet::with_capacity_and_hasher(tasks.len(), Default::default());
    for task in tasks {
        if task.outline_id.is_empty() {
            return Err(ValidationError::EmptyOutlineId);
        }
        if !seen.insert(task.outline_id.as_str()) {
            return Err(ValidationError::DuplicateOutlineId(task.outline_id.clone()));
        }
        if !task.duration_days.is_finite() {
            return Err(ValidationError::NonFiniteDuration {
                task: task.outline_id.clone(),
            });
        }
        if task.duration_days < 0.0 {
            return Err(ValidationError::NegativeDuration {
                task: task.outline_id.clone(),
                duration: task.duration_days,
            });
        }
    }

    for task in tasks {
        for dep in &task.dependencies {
            if !seen.contains(dep.predecessor_id.as_str()) {
                return Err(ValidationError::DanglingPredecessor {
                    task: task.outline_id.clone(),
                    predecessor: dep.predecessor_id.clone(),
                });
            }
            if !dep.lag_days.is_finite() {
                return Err(ValidationError::NonFiniteLag {
                    task: task.outline_id.clone(),
                    predecessor: dep.predecessor_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validate a task snapshot and assemble the project graph.
///
/// # Returns
/// * `Ok(ProjectGraph)`; non-fatal findings are available via `warnings()`
/// * `Err(CpmError::Validation)` for malformed input, before anything else runs
/// * `Err(CpmError::Cycle)` if the dependency edges contain a cycle
pub fn build_graph(
    tasks: &[Task],
    anchor_date: NaiveDate,
    config: &EngineConfig,
) -> Result<ProjectGraph, CpmError> {
    validate_tasks(tasks, config)?;

    let index = OutlineInterner::from_ids(tasks.iter().map(|t| t.outline_id.as_str()));
    let mut ordered: Vec<Option<Task>> = vec![None; index.len()];
    for task in tasks {
        if let Some(node) = index.get(&task.outline_id) {
            ordered[node as usize] = Some(task.clone());
        }
    }
    let tasks: Vec<Task> = ordered.into_iter().flatten().collect();

    let hierarchy = OutlineHierarchy::build(&index);
    let mut warnings = Vec::new();

    let mut summary = Vec::with_capacity(tasks.len());
    let mut durations = Vec::with_capacity(tasks.len());
    for (node, task) in tasks.iter().enumerate() {
        let derived = hierarchy.is_summary(node as NodeId);
        if derived != task.is_summary {
            warnings.push(ScheduleWarning::SummaryFlagMismatch {
                outline_id: task.outline_id.clone(),
                declared: task.is_summary,
                derived,
            });
        }
        summary.push(derived);

        if task.is_milestone && task.duration_days != 0.0 {
            warnings.push(ScheduleWarning::MilestoneDurationIgnored {
                outline_id: task.outline_id.clone(),
                duration_days: task.duration_days,
            });
            durations.push(0.0);
        } else {
            durations.push(task.duration_days);
        }
    }

    let mut edges = Vec::new();
    for (successor, task) in tasks.iter().enumerate() {
        let successor = successor as NodeId;
        for (dependency_index, dep) in task.dependencies.iter().enumerate() {
            // Validated above: every predecessor resolves.
            let Some(predecessor) = index.get(&dep.predecessor_id) else {
                continue;
            };
            let touched_summary = [predecessor, successor]
                .into_iter()
                .find(|&node| summary[node as usize]);
            if let Some(summary_node) = touched_summary {
                let warning = SummaryConstraintWarning {
                    summary_id: tasks[summary_node as usize].outline_id.clone(),
                    predecessor_id: dep.predecessor_id.clone(),
                    successor_id: task.outline_id.clone(),
                };
                log_detail!(config.verbosity, "Ignoring edge: {}", warning);
                warnings.push(ScheduleWarning::SummaryConstraint(warning));
                continue;
            }
            edges.push(Edge {
                predecessor,
                successor,
                kind: dep.kind,
                lag_days: dep.lag_days,
                dependency_index,
            });
        }
    }

    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (e, edge) in edges.iter().enumerate() {
        incoming[edge.successor as usize].push(e);
        outgoing[edge.predecessor as usize].push(e);
    }
    for list in &mut incoming {
        list.sort_by_key(|&e| (edges[e].predecessor, e));
    }
    for list in &mut outgoing {
        list.sort_by_key(|&e| (edges[e].successor, e));
    }

    let graph = ProjectGraph {
        anchor_date,
        tasks,
        index,
        hierarchy,
        summary,
        durations,
        edges,
        incoming,
        outgoing,
        warnings,
    };

    if let Some(cycle) = graph.find_cycle() {
        return Err(CycleError {
            outline_ids: graph.outline_ids(&cycle),
        }
        .into());
    }

    log_summary!(
        config.verbosity,
        "Graph built: {} tasks, {} dependency edges, {} warnings",
        graph.len(),
        graph.edges.len(),
        graph.warnings.len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dependency;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn make_task(id: &str, duration: f64, preds: &[&str]) -> Task {
        preds.iter().fold(Task::new(id, duration), |task, pred| {
            task.with_dependency(Dependency::finish_to_start(*pred))
        })
    }

    fn build(tasks: &[Task]) -> Result<ProjectGraph, CpmError> {
        build_graph(tasks, anchor(), &EngineConfig::default())
    }

    #[test]
    fn test_build_simple_chain() {
        let tasks = vec![
            make_task("C", 3.0, &["B"]),
            make_task("A", 10.0, &[]),
            make_task("B", 5.0, &["A"]),
        ];
        let graph = build(&tasks).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.outline_id(0), "A");
        assert_eq!(graph.edges().len(), 2);
        let b = graph.node("B").unwrap();
        let preds: Vec<NodeId> = graph.incoming(b).map(|e| e.predecessor).collect();
        assert_eq!(preds, vec![graph.node("A").unwrap()]);
        assert!(graph.warnings().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_foreign_node_id_panics() {
        let graph = build(&[make_task("A", 1.0, &[])]).unwrap();
        graph.outline_id(graph.len() as NodeId);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let tasks = vec![make_task("A", 1.0, &[]), make_task("A", 2.0, &[])];
        assert_eq!(
            build(&tasks).unwrap_err(),
            CpmError::Validation(ValidationError::DuplicateOutlineId("A".to_string()))
        );
    }

    #[test]
    fn test_dangling_predecessor_rejected() {
        let tasks = vec![make_task("A", 1.0, &["missing"])];
        assert_eq!(
            build(&tasks).unwrap_err(),
            CpmError::Validation(ValidationError::DanglingPredecessor {
                task: "A".to_string(),
                predecessor: "missing".to_string(),
            })
        );
    }

    #[test]
    fn test_negative_and_non_finite_values_rejected() {
        let result = build(&[Task::new("A", -1.0)]);
        assert!(matches!(
            result,
            Err(CpmError::Validation(ValidationError::NegativeDuration { .. }))
        ));

        let result = build(&[Task::new("A", f64::INFINITY)]);
        assert!(matches!(
            result,
            Err(CpmError::Validation(ValidationError::NonFiniteDuration { .. }))
        ));

        let tasks = vec![
            Task::new("A", 1.0),
            Task::new("B", 1.0).with_dependency(Dependency::new(
                "A",
                DependencyType::FinishToStart,
                f64::NAN,
            )),
        ];
        assert!(matches!(
            build(&tasks),
            Err(CpmError::Validation(ValidationError::NonFiniteLag { .. }))
        ));

        assert_eq!(
            build(&[Task::new("", 1.0)]).unwrap_err(),
            CpmError::Validation(ValidationError::EmptyOutlineId)
        );
    }

    #[test]
    fn test_task_limit() {
        let config = EngineConfig {
            max_tasks: Some(1),
            ..EngineConfig::default()
        };
        let tasks = vec![Task::new("A", 1.0), Task::new("B", 1.0)];
        assert!(matches!(
            build_graph(&tasks, anchor(), &config),
            Err(CpmError::Validation(ValidationError::TooManyTasks { count: 2, limit: 1 }))
        ));
    }

    #[test]
    fn test_cycle_names_all_members() {
        let tasks = vec![
            make_task("A", 1.0, &["C"]),
            make_task("B", 1.0, &["A"]),
            make_task("C", 1.0, &["B"]),
            make_task("D", 1.0, &["C"]),
        ];
        let Err(CpmError::Cycle(err)) = build(&tasks) else {
            panic!("expected cycle error");
        };
        let mut members = err.outline_ids.clone();
        members.sort();
        assert_eq!(members, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let tasks = vec![make_task("A", 1.0, &["A"])];
        let Err(CpmError::Cycle(err)) = build(&tasks) else {
            panic!("expected cycle error");
        };
        assert_eq!(err.outline_ids, vec!["A"]);
    }

    #[test]
    fn test_summary_edges_dropped_with_warning() {
        let tasks = vec![
            Task::new("1", 0.0),
            make_task("1.1", 2.0, &[]),
            make_task("1.2", 3.0, &["1.1"]),
            make_task("2", 4.0, &["1"]),
        ];
        let graph = build(&tasks).unwrap();

        assert!(graph.is_summary(graph.node("1").unwrap()));
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.warnings().iter().any(|w| matches!(
            w,
            ScheduleWarning::SummaryConstraint(SummaryConstraintWarning { summary_id, successor_id, .. })
                if summary_id == "1" && successor_id == "2"
        )));
    }

    #[test]
    fn test_containment_is_not_a_cycle() {
        // Child depends on its own parent: the edge is dropped, not a cycle.
        let tasks = vec![Task::new("1", 0.0), make_task("1.1", 2.0, &["1"])];
        let graph = build(&tasks).unwrap();
        assert!(graph.edges().is_empty());
        assert_eq!(graph.warnings().len(), 2); // flag mismatch + dropped edge
    }

    #[test]
    fn test_milestone_duration_normalized() {
        let mut milestone = Task::milestone("M");
        milestone.duration_days = 2.0;
        let graph = build(&[milestone]).unwrap();

        assert_eq!(graph.duration(0), 0.0);
        assert!(matches!(
            graph.warnings()[0],
            ScheduleWarning::MilestoneDurationIgnored { .. }
        ));
    }

    #[test]
    fn test_summary_flag_mismatch_reported() {
        let mut declared = Task::new("A", 1.0);
        declared.is_summary = true;
        let graph = build(&[declared]).unwrap();

        assert!(!graph.is_summary(0));
        assert_eq!(
            graph.warnings()[0],
            ScheduleWarning::SummaryFlagMismatch {
                outline_id: "A".to_string(),
                declared: true,
                derived: false,
            }
        );
    }
}
