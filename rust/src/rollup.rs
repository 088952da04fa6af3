//! Summary task roll-up.
//!
//! Summary tasks carry no CPM timing of their own. Their dates are derived
//! from the tasks below them, processing the deepest summaries first so a
//! nested summary is complete before its parent reads it.

use serde::Serialize;

use crate::backward_pass::{BackwardPassResult, LateTimes};
use crate::float::{Classification, FloatInfo};
use crate::forward_pass::ForwardPassResult;
use crate::graph::ProjectGraph;
use crate::interner::NodeId;

/// Derived timing of one summary task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SummaryTiming {
    /// Earliest early start over all descendants.
    pub effective_start: f64,
    /// Latest early finish over all descendants.
    pub effective_finish: f64,
    pub effective_duration: f64,
    /// Duration-weighted percent complete of the leaf descendants.
    pub percent_complete: f64,
}

/// Roll-up results for every summary task, indexed by `NodeId`.
#[derive(Clone, Debug, Default)]
pub struct SummaryRollup {
    timings: Vec<Option<SummaryTiming>>,
}

impl SummaryRollup {
    pub fn get(&self, node: NodeId) -> Option<SummaryTiming> {
        self.timings.get(node as usize).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, SummaryTiming)> + '_ {
        self.timings
            .iter()
            .enumerate()
            .filter_map(|(node, t)| t.map(|t| (node as NodeId, t)))
    }
}

/// Fold a (min, max) span up the hierarchy, deepest summaries first.
///
/// Leaves contribute `leaf(node)`; summaries contribute their folded span.
fn fold_spans(
    graph: &ProjectGraph,
    leaf: impl Fn(NodeId) -> Option<(f64, f64)>,
) -> Vec<Option<(f64, f64)>> {
    let hierarchy = graph.hierarchy();
    let mut spans: Vec<Option<(f64, f64)>> = vec![None; graph.len()];

    for summary in hierarchy.summaries_deepest_first() {
        let mut span: Option<(f64, f64)> = None;
        for &child in hierarchy.children(summary) {
            let child_span = if graph.is_summary(child) {
                spans[child as usize]
            } else {
                leaf(child)
            };
            if let Some((lo, hi)) = child_span {
                span = Some(match span {
                    Some((min, max)) => (min.min(lo), max.max(hi)),
                    None => (lo, hi),
                });
            }
        }
        spans[summary as usize] = span;
    }
    spans
}

/// Derive effective start/finish/duration for every summary task.
pub fn rollup(graph: &ProjectGraph, forward: &ForwardPassResult) -> SummaryRollup {
    let spans = fold_spans(graph, |node| {
        forward
            .get(node)
            .map(|early| (early.early_start, early.early_finish))
    });

    let timings = spans
        .into_iter()
        .enumerate()
        .map(|(node, span)| {
            span.map(|(start, finish)| SummaryTiming {
                effective_start: start,
                effective_finish: finish,
                effective_duration: finish - start,
                percent_complete: weighted_percent_complete(graph, node as NodeId),
            })
        })
        .collect();
    SummaryRollup { timings }
}

fn weighted_percent_complete(graph: &ProjectGraph, summary: NodeId) -> f64 {
    let leaves = graph.hierarchy().leaf_descendants(summary);
    if leaves.is_empty() {
        return 0.0;
    }
    let total_duration: f64 = leaves.iter().map(|&leaf| graph.duration(leaf)).sum();
    if total_duration > 0.0 {
        leaves
            .iter()
            .map(|&leaf| graph.task(leaf).percent_complete * graph.duration(leaf))
            .sum::<f64>()
            / total_duration
    } else {
        leaves
            .iter()
            .map(|&leaf| graph.task(leaf).percent_complete)
            .sum::<f64>()
            / leaves.len() as f64
    }
}

/// Summary late dates: earliest late start and latest late finish below it.
pub fn rollup_late(graph: &ProjectGraph, backward: &BackwardPassResult) -> Vec<Option<LateTimes>> {
    fold_spans(graph, |node| {
        backward
            .get(node)
            .map(|late| (late.late_start, late.late_finish))
    })
    .into_iter()
    .map(|span| {
        span.map(|(late_start, late_finish)| LateTimes {
            late_start,
            late_finish,
        })
    })
    .collect()
}

/// Summary float: the smallest float below it; critical if any descendant is.
pub fn rollup_float(graph: &ProjectGraph, classification: &Classification) -> Vec<Option<FloatInfo>> {
    let hierarchy = graph.hierarchy();
    (0..graph.len() as NodeId)
        .map(|node| {
            if !graph.is_summary(node) {
                return None;
            }
            hierarchy
                .leaf_descendants(node)
                .into_iter()
                .filter_map(|leaf| classification.get(leaf))
                .reduce(|a, b| FloatInfo {
                    total_float: a.total_float.min(b.total_float),
                    free_float: a.free_float.min(b.free_float),
                    is_critical: a.is_critical || b.is_critical,
                })
        })
        .collect()
}
