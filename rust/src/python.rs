//! Python bindings.
//!
//! Thin wrapper classes convert to and from the engine's own types; every
//! engine error surfaces as `ValueError`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::advisor::{advise, AdvisorReport, ProposedEdit, Strategy};
use crate::calendar::DEFAULT_MINUTES_PER_DAY;
use crate::config::{AdvisorConfig, EngineConfig};
use crate::engine::schedule_with_end;
use crate::graph::build_graph;
use crate::models::{Dependency, DependencyType, ScheduleResult, Task, TaskSchedule};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A dependency on a predecessor task.
#[pyclass(name = "Dependency")]
#[derive(Clone, Debug)]
pub struct PyDependency {
    #[pyo3(get, set)]
    pub predecessor_id: String,
    /// "FS", "FF", "SS" or "SF".
    #[pyo3(get, set)]
    pub dependency_type: String,
    #[pyo3(get, set)]
    pub lag_days: f64,
    /// Stored lag in minutes; when set it replaces `lag_days`.
    #[pyo3(get, set)]
    pub lag_minutes: Option<f64>,
}

#[pymethods]
impl PyDependency {
    #[new]
    #[pyo3(signature = (predecessor_id, dependency_type="FS".to_string(), lag_days=0.0, lag_minutes=None))]
    fn new(
        predecessor_id: String,
        dependency_type: String,
        lag_days: f64,
        lag_minutes: Option<f64>,
    ) -> Self {
        Self {
            predecessor_id,
            dependency_type,
            lag_days,
            lag_minutes,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency({} {} {:+})",
            self.predecessor_id, self.dependency_type, self.lag_days
        )
    }
}

impl PyDependency {
    fn to_dependency(&self, config: &EngineConfig) -> PyResult<Dependency> {
        match self.lag_minutes {
            Some(minutes) => Dependency::from_minutes(
                self.predecessor_id.clone(),
                &self.dependency_type,
                minutes,
                config,
            )
            .map_err(value_error),
            None => {
                let kind: DependencyType = self.dependency_type.parse().map_err(value_error)?;
                Ok(Dependency::new(self.predecessor_id.clone(), kind, self.lag_days))
            }
        }
    }
}

/// A task in the project outline.
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub outline_id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration_days: f64,
    #[pyo3(get, set)]
    pub is_milestone: bool,
    #[pyo3(get, set)]
    pub is_summary: bool,
    #[pyo3(get, set)]
    pub percent_complete: f64,
    #[pyo3(get, set)]
    pub dependencies: Vec<PyDependency>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (
        outline_id,
        duration_days,
        dependencies=Vec::new(),
        name=String::new(),
        is_milestone=false,
        is_summary=false,
        percent_complete=0.0
    ))]
    fn new(
        outline_id: String,
        duration_days: f64,
        dependencies: Vec<PyDependency>,
        name: String,
        is_milestone: bool,
        is_summary: bool,
        percent_complete: f64,
    ) -> Self {
        Self {
            outline_id,
            name,
            duration_days,
            is_milestone,
            is_summary,
            percent_complete,
            dependencies,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task({}, duration={}, deps={})",
            self.outline_id,
            self.duration_days,
            self.dependencies.len()
        )
    }
}

impl PyTask {
    fn to_task(&self, config: &EngineConfig) -> PyResult<Task> {
        Ok(Task {
            outline_id: self.outline_id.clone(),
            name: self.name.clone(),
            duration_days: self.duration_days,
            is_milestone: self.is_milestone,
            is_summary: self.is_summary,
            percent_complete: self.percent_complete,
            dependencies: self
                .dependencies
                .iter()
                .map(|dep| dep.to_dependency(config))
                .collect::<PyResult<_>>()?,
        })
    }
}

fn to_tasks(tasks: &[PyTask], config: &EngineConfig) -> PyResult<Vec<Task>> {
    tasks.iter().map(|task| task.to_task(config)).collect()
}

fn engine_config(minutes_per_day: f64, verbosity: u8) -> EngineConfig {
    EngineConfig {
        minutes_per_day,
        verbosity,
        ..EngineConfig::default()
    }
}

/// Computed timing of one task.
#[pyclass(name = "TaskSchedule", get_all)]
#[derive(Clone, Debug)]
pub struct PyTaskSchedule {
    pub outline_id: String,
    pub duration_days: f64,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    pub free_float: f64,
    pub is_critical: bool,
    pub is_summary: bool,
    pub is_milestone: bool,
    pub percent_complete: f64,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
}

impl From<&TaskSchedule> for PyTaskSchedule {
    fn from(row: &TaskSchedule) -> Self {
        Self {
            outline_id: row.outline_id.clone(),
            duration_days: row.duration_days,
            early_start: row.early_start,
            early_finish: row.early_finish,
            late_start: row.late_start,
            late_finish: row.late_finish,
            total_float: row.total_float,
            free_float: row.free_float,
            is_critical: row.is_critical,
            is_summary: row.is_summary,
            is_milestone: row.is_milestone,
            percent_complete: row.percent_complete,
            start_date: row.start_date,
            finish_date: row.finish_date,
        }
    }
}

#[pymethods]
impl PyTaskSchedule {
    fn __repr__(&self) -> String {
        format!(
            "TaskSchedule({}, ES={}, EF={}, TF={}{})",
            self.outline_id,
            self.early_start,
            self.early_finish,
            self.total_float,
            if self.is_critical { ", critical" } else { "" }
        )
    }
}

/// Output of `schedule_project`.
#[pyclass(name = "ScheduleResult", get_all)]
#[derive(Clone, Debug)]
pub struct PyScheduleResult {
    pub anchor_date: NaiveDate,
    pub tasks: Vec<PyTaskSchedule>,
    pub critical_path: Vec<String>,
    pub critical_chains: Vec<Vec<String>>,
    pub project_duration: f64,
    pub project_end: f64,
    pub warnings: Vec<String>,
}

impl From<ScheduleResult> for PyScheduleResult {
    fn from(result: ScheduleResult) -> Self {
        Self {
            anchor_date: result.anchor_date,
            tasks: result.tasks.iter().map(PyTaskSchedule::from).collect(),
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
            critical_path: result.critical_path,
            critical_chains: result.critical_chains,
            project_duration: result.project_duration,
            project_end: result.project_end,
        }
    }
}

/// One proposed change; lag edits carry the predecessor and dependency index.
#[pyclass(name = "ProposedEdit", get_all)]
#[derive(Clone, Debug)]
pub struct PyProposedEdit {
    /// "lag" or "duration".
    pub kind: String,
    pub outline_id: String,
    pub predecessor_id: Option<String>,
    pub dependency_index: Option<usize>,
    pub current_days: f64,
    pub proposed_days: f64,
}

impl From<&ProposedEdit> for PyProposedEdit {
    fn from(edit: &ProposedEdit) -> Self {
        match edit {
            ProposedEdit::Lag {
                outline_id,
                predecessor_id,
                dependency_index,
                current_lag_days,
                proposed_lag_days,
            } => Self {
                kind: "lag".to_string(),
                outline_id: outline_id.clone(),
                predecessor_id: Some(predecessor_id.clone()),
                dependency_index: Some(*dependency_index),
                current_days: *current_lag_days,
                proposed_days: *proposed_lag_days,
            },
            ProposedEdit::Duration {
                outline_id,
                current_days,
                proposed_days,
            } => Self {
                kind: "duration".to_string(),
                outline_id: outline_id.clone(),
                predecessor_id: None,
                dependency_index: None,
                current_days: *current_days,
                proposed_days: *proposed_days,
            },
        }
    }
}

#[pyclass(name = "Strategy", get_all)]
#[derive(Clone, Debug)]
pub struct PyStrategy {
    pub policy: String,
    pub edits: Vec<PyProposedEdit>,
    pub days_saved: f64,
    pub projected_duration: f64,
    pub meets_target: bool,
    pub cost_estimate: f64,
    pub risk: String,
    pub description: String,
}

impl From<&Strategy> for PyStrategy {
    fn from(strategy: &Strategy) -> Self {
        Self {
            policy: strategy.policy.tag().to_string(),
            edits: strategy.edits.iter().map(PyProposedEdit::from).collect(),
            days_saved: strategy.days_saved,
            projected_duration: strategy.projected_duration,
            meets_target: strategy.meets_target,
            cost_estimate: strategy.cost_estimate,
            risk: strategy.risk.tag().to_string(),
            description: strategy.description.clone(),
        }
    }
}

#[pyclass(name = "AdvisorReport", get_all)]
#[derive(Clone, Debug)]
pub struct PyAdvisorReport {
    pub already_met: bool,
    pub current_duration: f64,
    pub target_duration: f64,
    pub strategies: Vec<PyStrategy>,
}

impl From<AdvisorReport> for PyAdvisorReport {
    fn from(report: AdvisorReport) -> Self {
        Self {
            already_met: report.already_met,
            current_duration: report.current_duration,
            target_duration: report.target_duration,
            strategies: report.strategies.iter().map(PyStrategy::from).collect(),
        }
    }
}

/// Run the CPM pipeline over a task list.
///
/// # Arguments
/// * `tasks` - Every task in the project, summaries included
/// * `anchor_date` - Calendar date of day offset 0
/// * `project_end` - Optional forced project end in days
/// * `minutes_per_day` - Ratio used to convert `lag_minutes` into days
/// * `verbosity` - 0 silent .. 3 debug, written to stderr
///
/// # Raises
/// * ValueError on invalid input, a dependency cycle, or an infeasible end
#[pyfunction]
#[pyo3(signature = (tasks, anchor_date, project_end=None, minutes_per_day=DEFAULT_MINUTES_PER_DAY, verbosity=0))]
fn schedule_project(
    tasks: Vec<PyTask>,
    anchor_date: NaiveDate,
    project_end: Option<f64>,
    minutes_per_day: f64,
    verbosity: u8,
) -> PyResult<PyScheduleResult> {
    let config = engine_config(minutes_per_day, verbosity);
    let tasks = to_tasks(&tasks, &config)?;
    schedule_with_end(&tasks, anchor_date, project_end, &config)
        .map(PyScheduleResult::from)
        .map_err(value_error)
}

/// Propose edits that bring the project down to `target_duration` days.
#[pyfunction]
#[pyo3(signature = (tasks, anchor_date, target_duration, minutes_per_day=DEFAULT_MINUTES_PER_DAY, verbosity=0))]
fn advise_project(
    tasks: Vec<PyTask>,
    anchor_date: NaiveDate,
    target_duration: f64,
    minutes_per_day: f64,
    verbosity: u8,
) -> PyResult<PyAdvisorReport> {
    let config = engine_config(minutes_per_day, verbosity);
    let tasks = to_tasks(&tasks, &config)?;
    let graph = build_graph(&tasks, anchor_date, &config).map_err(value_error)?;
    advise(&graph, target_duration, &config, &AdvisorConfig::default())
        .map(PyAdvisorReport::from)
        .map_err(value_error)
}

/// The cpm_engine Python module.
#[pymodule]
fn cpm_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Inputs
    m.add_class::<PyDependency>()?;
    m.add_class::<PyTask>()?;

    // Results
    m.add_class::<PyTaskSchedule>()?;
    m.add_class::<PyScheduleResult>()?;
    m.add_class::<PyProposedEdit>()?;
    m.add_class::<PyStrategy>()?;
    m.add_class::<PyAdvisorReport>()?;

    m.add_function(wrap_pyfunction!(schedule_project, m)?)?;
    m.add_function(wrap_pyfunction!(advise_project, m)?)?;

    Ok(())
}
