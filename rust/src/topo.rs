//! Topological ordering of the CPM nodes (Kahn's algorithm).
//!
//! Among tasks that become ready at the same time the smallest outline id goes
//! first, so ES/EF numbers are reproducible run to run. Summary tasks are not
//! part of the order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::errors::CycleError;
use crate::graph::ProjectGraph;
use crate::interner::NodeId;

/// Order non-summary tasks so every predecessor precedes its successors.
pub fn topological_order(graph: &ProjectGraph) -> Result<Vec<NodeId>, CycleError> {
    let mut in_degree = vec![0usize; graph.len()];
    for edge in graph.edges() {
        in_degree[edge.successor as usize] += 1;
    }

    let mut ready: BinaryHeap<Reverse<NodeId>> = graph
        .cpm_nodes()
        .filter(|&node| in_degree[node as usize] == 0)
        .map(Reverse)
        .collect();

    let expected = graph.cpm_nodes().count();
    let mut order = Vec::with_capacity(expected);

    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for edge in graph.outgoing(node) {
            let degree = &mut in_degree[edge.successor as usize];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(edge.successor));
            }
        }
    }

    if order.len() != expected {
        // Name the actual cycle when one can be isolated; otherwise every
        // task that never became ready.
        let members = graph.find_cycle().unwrap_or_else(|| {
            graph
                .cpm_nodes()
                .filter(|&node| in_degree[node as usize] > 0)
                .collect()
        });
        return Err(CycleError {
            outline_ids: graph.outline_ids(&members),
        });
    }

    Ok(order)
}

/// Topological order as outline ids.
pub fn order(graph: &ProjectGraph) -> Result<Vec<String>, CycleError> {
    topological_order(graph).map(|nodes| graph.outline_ids(&nodes))
}

/// Group an order into dependency-depth levels.
///
/// Level 0 holds tasks without predecessors; every other task sits one level
/// below its deepest predecessor. Tasks within a level do not constrain each
/// other and could be processed concurrently.
pub fn dependency_levels(graph: &ProjectGraph, order: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut level_of = vec![0usize; graph.len()];
    let mut levels: Vec<Vec<NodeId>> = Vec::new();

    for &node in order {
        let level = graph
            .incoming(node)
            .map(|edge| level_of[edge.predecessor as usize] + 1)
            .max()
            .unwrap_or(0);
        level_of[node as usize] = level;
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(node);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::graph::build_graph;
    use crate::models::{Dependency, Task};
    use chrono::NaiveDate;

    fn make_task(id: &str, duration: f64, preds: &[&str]) -> Task {
        preds.iter().fold(Task::new(id, duration), |task, pred| {
            task.with_dependency(Dependency::finish_to_start(*pred))
        })
    }

    fn graph(tasks: &[Task]) -> ProjectGraph {
        build_graph(
            tasks,
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_chain_order() {
        let g = graph(&[
            make_task("c", 1.0, &["b"]),
            make_task("b", 1.0, &["a"]),
            make_task("a", 1.0, &[]),
        ]);
        assert_eq!(order(&g).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_broken_by_outline_id() {
        let g = graph(&[
            make_task("z", 1.0, &[]),
            make_task("m", 1.0, &["z"]),
            make_task("b", 1.0, &[]),
            make_task("a", 1.0, &["z"]),
        ]);
        // b and z are ready first; a and m only after z.
        assert_eq!(order(&g).unwrap(), vec!["b", "z", "a", "m"]);
    }

    #[test]
    fn test_summaries_excluded() {
        let g = graph(&[
            Task::new("1", 0.0),
            make_task("1.1", 1.0, &[]),
            make_task("1.2", 1.0, &["1.1"]),
        ]);
        assert_eq!(order(&g).unwrap(), vec!["1.1", "1.2"]);
    }

    #[test]
    fn test_dependency_levels() {
        let g = graph(&[
            make_task("a", 1.0, &[]),
            make_task("b", 1.0, &["a"]),
            make_task("c", 1.0, &["a"]),
            make_task("d", 1.0, &["b", "c"]),
            make_task("e", 1.0, &[]),
        ]);
        let nodes = topological_order(&g).unwrap();
        let levels: Vec<Vec<String>> = dependency_levels(&g, &nodes)
            .iter()
            .map(|level| g.outline_ids(level))
            .collect();
        assert_eq!(levels, vec![vec!["a", "e"], vec!["b", "c"], vec!["d"]]);
    }
}
