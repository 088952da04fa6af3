//! End-to-end pipeline: build, order, forward, backward, classify, roll up.
//!
//! Every call starts from scratch on the snapshot it is given and returns a
//! fresh result; nothing is cached between calls.

use chrono::NaiveDate;

use crate::backward_pass::backward_pass;
use crate::calendar::{finish_date, project_date};
use crate::config::EngineConfig;
use crate::errors::CpmError;
use crate::float::classify;
use crate::forward_pass::forward_pass;
use crate::graph::{build_graph, ProjectGraph};
use crate::interner::NodeId;
use crate::models::{ScheduleResult, Task, TaskSchedule};
use crate::rollup::{rollup, rollup_float, rollup_late};
use crate::topo::topological_order;
use crate::log_summary;

/// Schedule a task snapshot, anchoring the backward pass on the latest early finish.
pub fn schedule(
    tasks: &[Task],
    anchor_date: NaiveDate,
    config: &EngineConfig,
) -> Result<ScheduleResult, CpmError> {
    schedule_with_end(tasks, anchor_date, None, config)
}

/// Schedule a task snapshot against an optional caller-supplied project end.
pub fn schedule_with_end(
    tasks: &[Task],
    anchor_date: NaiveDate,
    project_end: Option<f64>,
    config: &EngineConfig,
) -> Result<ScheduleResult, CpmError> {
    let graph = build_graph(tasks, anchor_date, config)?;
    schedule_graph(&graph, project_end, config)
}

/// Run every pass over an already validated graph.
pub fn schedule_graph(
    graph: &ProjectGraph,
    project_end: Option<f64>,
    config: &EngineConfig,
) -> Result<ScheduleResult, CpmError> {
    let order = topological_order(graph)?;
    let forward = forward_pass(graph, &order, config);
    let backward = backward_pass(graph, &order, &forward, project_end, config)?;
    let classification = classify(graph, &order, &forward, &backward, config)?;
    let summaries = rollup(graph, &forward);
    let summary_late = rollup_late(graph, &backward);
    let summary_float = rollup_float(graph, &classification);

    let anchor = graph.anchor_date();
    let eps = config.epsilon;
    let mut rows = Vec::with_capacity(graph.len());

    for node in 0..graph.len() as NodeId {
        let task = graph.task(node);
        let row = if graph.is_summary(node) {
            let Some(timing) = summaries.get(node) else {
                continue;
            };
            let late = summary_late[node as usize].unwrap_or_default();
            let float = summary_float[node as usize].unwrap_or_default();
            TaskSchedule {
                outline_id: task.outline_id.clone(),
                duration_days: timing.effective_duration,
                early_start: timing.effective_start,
                early_finish: timing.effective_finish,
                late_start: late.late_start,
                late_finish: late.late_finish,
                total_float: float.total_float,
                free_float: float.free_float,
                is_critical: float.is_critical,
                is_summary: true,
                is_milestone: task.is_milestone,
                percent_complete: timing.percent_complete,
                start_date: project_date(anchor, timing.effective_start),
                finish_date: finish_date(
                    anchor,
                    timing.effective_start,
                    timing.effective_finish,
                    eps,
                ),
            }
        } else {
            let (Some(early), Some(late), Some(float)) = (
                forward.get(node),
                backward.get(node),
                classification.get(node),
            ) else {
                continue;
            };
            TaskSchedule {
                outline_id: task.outline_id.clone(),
                duration_days: graph.duration(node),
                early_start: early.early_start,
                early_finish: early.early_finish,
                late_start: late.late_start,
                late_finish: late.late_finish,
                total_float: float.total_float,
                free_float: float.free_float,
                is_critical: float.is_critical,
                is_summary: false,
                is_milestone: task.is_milestone,
                percent_complete: task.percent_complete,
                start_date: project_date(anchor, early.early_start),
                finish_date: finish_date(anchor, early.early_start, early.early_finish, eps),
            }
        };
        rows.push(row);
    }

    let project_duration = forward.project_finish();
    log_summary!(
        config.verbosity,
        "Schedule complete: duration {:.3} days, {} critical task(s), {} warning(s)",
        project_duration,
        classification.critical_path.len(),
        graph.warnings().len()
    );

    Ok(ScheduleResult::new(
        anchor,
        rows,
        graph.outline_ids(&classification.critical_path),
        classification
            .critical_chains
            .iter()
            .map(|chain| graph.outline_ids(chain))
            .collect(),
        project_duration,
        backward.project_end(),
        graph.warnings().to_vec(),
    ))
}
