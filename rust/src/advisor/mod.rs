//! Schedule compression advisor.
//!
//! Proposes edits that bring the project duration down to a target. Two
//! policies are simulated independently: removing lag from driving critical
//! dependencies, and compressing critical task durations. Each simulation
//! edits a private copy of the task list one step at a time and re-runs the
//! whole pipeline after every step, so the reported savings are measured.
//!
//! The advisor never mutates the graph it is given. Callers apply a chosen
//! strategy with [`apply_strategy`] and schedule the result themselves.

mod apply;
mod types;

use std::cmp::Ordering;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

pub use apply::apply_strategy;
pub use types::{AdvisorReport, ProposedEdit, RiskTier, Strategy, StrategyPolicy};

use crate::config::{AdvisorConfig, EngineConfig};
use crate::engine::{schedule_graph, schedule_with_end};
use crate::errors::{CpmError, ValidationError};
use crate::float::dependency_slack;
use crate::forward_pass::EarlyTimes;
use crate::graph::ProjectGraph;
use crate::models::{ScheduleResult, Task, TaskSchedule};
use crate::{log_debug, log_detail, log_summary};

/// Propose strategies that shorten `graph` to at most `target_duration` days.
///
/// Only tasks critical in the current schedule are ever edited. Strategies
/// that save nothing are omitted; strategies that help but fall short of the
/// target are kept with `meets_target = false`.
///
/// # Returns
/// * `Err(ValidationError::InvalidTargetDuration)` for a negative or
///   non-finite target
/// * Any error from scheduling the graph itself
pub fn advise(
    graph: &ProjectGraph,
    target_duration: f64,
    config: &EngineConfig,
    advisor: &AdvisorConfig,
) -> Result<AdvisorReport, CpmError> {
    if !target_duration.is_finite() || target_duration < 0.0 {
        return Err(ValidationError::InvalidTargetDuration(target_duration).into());
    }

    let baseline = schedule_graph(graph, None, config)?;
    let current_duration = baseline.project_duration;
    if current_duration <= target_duration + config.epsilon {
        log_summary!(
            config.verbosity,
            "Advisor: duration {:.3} already within target {:.3}",
            current_duration,
            target_duration
        );
        return Ok(AdvisorReport {
            already_met: true,
            current_duration,
            target_duration,
            strategies: Vec::new(),
        });
    }

    let simulation = Simulation {
        original: graph.tasks(),
        anchor: graph.anchor_date(),
        baseline: &baseline,
        critical: baseline.critical_path.iter().map(String::as_str).collect(),
        target: target_duration,
        config,
        advisor,
    };

    let mut strategies = Vec::new();
    for policy in [StrategyPolicy::LagReduction, StrategyPolicy::DurationCompression] {
        if let Some(strategy) = simulation.run(policy)? {
            log_detail!(
                config.verbosity,
                "  {}: saves {:.3} days, cost {:.2}, risk {}",
                policy,
                strategy.days_saved,
                strategy.cost_estimate,
                strategy.risk
            );
            strategies.push(strategy);
        }
    }
    strategies.sort_by(rank);

    log_summary!(
        config.verbosity,
        "Advisor: {} strategy(ies) for target {:.3} (current {:.3})",
        strategies.len(),
        target_duration,
        current_duration
    );
    Ok(AdvisorReport {
        already_met: false,
        current_duration,
        target_duration,
        strategies,
    })
}

/// Target met first, then cheaper, then more days saved.
fn rank(a: &Strategy, b: &Strategy) -> Ordering {
    b.meets_target
        .cmp(&a.meets_target)
        .then_with(|| a.cost_estimate.total_cmp(&b.cost_estimate))
        .then_with(|| b.days_saved.total_cmp(&a.days_saved))
}

fn early(row: &TaskSchedule) -> EarlyTimes {
    EarlyTimes {
        early_start: row.early_start,
        early_finish: row.early_finish,
    }
}

struct Simulation<'a> {
    original: &'a [Task],
    anchor: NaiveDate,
    baseline: &'a ScheduleResult,
    /// Tasks critical before any edit; nothing else is a candidate.
    critical: FxHashSet<&'a str>,
    target: f64,
    config: &'a EngineConfig,
    advisor: &'a AdvisorConfig,
}

impl Simulation<'_> {
    /// Greedily apply one policy until the target is met, no candidate is
    /// left, or the iteration limit is reached.
    fn run(&self, policy: StrategyPolicy) -> Result<Option<Strategy>, CpmError> {
        let eps = self.config.epsilon;
        let mut tasks = self.original.to_vec();
        let mut current = self.baseline.clone();

        for step in 0..self.advisor.max_iterations {
            let gap = current.project_duration - self.target;
            if gap <= eps {
                break;
            }
            let edited = match policy {
                StrategyPolicy::LagReduction => self.cut_lag(&mut tasks, &current, gap),
                StrategyPolicy::DurationCompression => self.compress(&mut tasks, &current, gap),
            };
            if !edited {
                break;
            }
            current = schedule_with_end(&tasks, self.anchor, None, self.config)?;
            log_debug!(
                self.config.verbosity,
                "  {} step {}: duration {:.3}",
                policy,
                step + 1,
                current.project_duration
            );
        }

        let edits = diff_edits(self.original, &tasks);
        if edits.is_empty() {
            return Ok(None);
        }

        // Measure the strategy exactly as a caller would apply it.
        let applied = apply::apply_edits(self.original, &edits)?;
        let projected_duration =
            schedule_with_end(&applied, self.anchor, None, self.config)?.project_duration;
        let days_saved = self.baseline.project_duration - projected_duration;
        if days_saved <= eps {
            return Ok(None);
        }

        let days_removed: f64 = edits.iter().map(ProposedEdit::days_removed).sum();
        let (cost_per_day, risk) = match policy {
            StrategyPolicy::LagReduction => (
                self.advisor.lag_cost_per_day,
                max_risk(&edits, RiskTier::for_lag_cut),
            ),
            StrategyPolicy::DurationCompression => (
                self.advisor.compression_cost_per_day,
                max_risk(&edits, RiskTier::for_compression),
            ),
        };
        let description = match policy {
            StrategyPolicy::LagReduction => format!(
                "Remove {:.1} day(s) of lag from {} critical dependency link(s)",
                days_removed,
                edits.len()
            ),
            StrategyPolicy::DurationCompression => format!(
                "Compress {} critical task(s) by {:.1} day(s) in total",
                edits.len(),
                days_removed
            ),
        };

        Ok(Some(Strategy {
            policy,
            edits,
            days_saved,
            projected_duration,
            meets_target: projected_duration <= self.target + eps,
            cost_estimate: days_removed * cost_per_day,
            risk,
            description,
        }))
    }

    /// A task both originally and currently critical, never a summary.
    fn editable<'r>(&self, current: &'r ScheduleResult, outline_id: &str) -> Option<&'r TaskSchedule> {
        if !self.critical.contains(outline_id) {
            return None;
        }
        current
            .get(outline_id)
            .filter(|row| row.is_critical && !row.is_summary)
    }

    /// Shorten the largest positive lag on a driving critical dependency.
    fn cut_lag(&self, tasks: &mut [Task], current: &ScheduleResult, gap: f64) -> bool {
        let eps = self.config.epsilon;
        let mut best: Option<(usize, usize, f64)> = None;

        for (position, task) in tasks.iter().enumerate() {
            let Some(successor) = self.editable(current, &task.outline_id) else {
                continue;
            };
            for (index, dep) in task.dependencies.iter().enumerate() {
                if dep.lag_days <= eps {
                    continue;
                }
                let Some(predecessor) = self.editable(current, &dep.predecessor_id) else {
                    continue;
                };
                let slack =
                    dependency_slack(dep.kind, dep.lag_days, early(predecessor), early(successor));
                if slack.abs() > eps {
                    continue;
                }
                if best.map_or(true, |(_, _, lag)| dep.lag_days > lag + eps) {
                    best = Some((position, index, dep.lag_days));
                }
            }
        }

        let Some((position, index, lag)) = best else {
            return false;
        };
        tasks[position].dependencies[index].lag_days = lag - lag.min(gap);
        true
    }

    /// Shorten the critical task with the most room above its floor.
    fn compress(&self, tasks: &mut [Task], current: &ScheduleResult, gap: f64) -> bool {
        let eps = self.config.epsilon;
        let mut best: Option<(usize, f64)> = None;

        for (position, (task, original)) in tasks.iter().zip(self.original).enumerate() {
            if task.is_milestone || task.percent_complete >= 100.0 {
                continue;
            }
            if self.editable(current, &task.outline_id).is_none() {
                continue;
            }
            let room = task.duration_days - self.floor(original.duration_days);
            if room <= eps {
                continue;
            }
            if best.map_or(true, |(_, best_room)| room > best_room + eps) {
                best = Some((position, room));
            }
        }

        let Some((position, room)) = best else {
            return false;
        };
        tasks[position].duration_days -= room.min(gap);
        true
    }

    /// Shortest duration a task may be compressed to.
    fn floor(&self, duration: f64) -> f64 {
        let by_ratio = duration * (1.0 - self.advisor.max_compression_ratio);
        by_ratio.max(self.advisor.min_task_duration_days.min(duration))
    }
}

/// Every lag and duration that differs between the two task lists.
fn diff_edits(original: &[Task], edited: &[Task]) -> Vec<ProposedEdit> {
    let mut edits = Vec::new();
    for (before, after) in original.iter().zip(edited) {
        for (index, (old, new)) in before
            .dependencies
            .iter()
            .zip(&after.dependencies)
            .enumerate()
        {
            if old.lag_days != new.lag_days {
                edits.push(ProposedEdit::Lag {
                    outline_id: before.outline_id.clone(),
                    predecessor_id: old.predecessor_id.clone(),
                    dependency_index: index,
                    current_lag_days: old.lag_days,
                    proposed_lag_days: new.lag_days,
                });
            }
        }
        if before.duration_days != after.duration_days {
            edits.push(ProposedEdit::Duration {
                outline_id: before.outline_id.clone(),
                current_days: before.duration_days,
                proposed_days: after.duration_days,
            });
        }
    }
    edits
}

fn max_risk(edits: &[ProposedEdit], tier: fn(f64) -> RiskTier) -> RiskTier {
    edits
        .iter()
        .map(|edit| tier(edit.reduction_ratio()))
        .max()
        .unwrap_or(RiskTier::Low)
}
