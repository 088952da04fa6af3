//! Core data types for the CPM engine: input tasks and computed schedules.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::calendar::minutes_to_days;
use crate::config::EngineConfig;
use crate::errors::{ScheduleWarning, ValidationError};

/// How a predecessor constrains its successor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    /// Two-letter code used by project tools.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::FinishToFinish => "FF",
            Self::StartToStart => "SS",
            Self::StartToFinish => "SF",
        }
    }

    /// Whether the successor's finish (rather than its start) is constrained.
    pub fn constrains_finish(&self) -> bool {
        matches!(self, Self::FinishToFinish | Self::StartToFinish)
    }

    /// Whether the predecessor's start (rather than its finish) is the anchor.
    pub fn from_start(&self) -> bool {
        matches!(self, Self::StartToStart | Self::StartToFinish)
    }
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DependencyType {
    type Err = ValidationError;

    /// Accepts `FS`/`FF`/`SS`/`SF` and long forms like `finish_to_start` or
    /// `Start-To-Finish`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "fs" | "finishtostart" => Ok(Self::FinishToStart),
            "ff" | "finishtofinish" => Ok(Self::FinishToFinish),
            "ss" | "starttostart" => Ok(Self::StartToStart),
            "sf" | "starttofinish" => Ok(Self::StartToFinish),
            _ => Err(ValidationError::IllegalDependencyType(s.to_string())),
        }
    }
}

/// A dependency on a predecessor task with a signed lag in days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub predecessor_id: String,
    #[serde(rename = "type", default)]
    pub kind: DependencyType,
    /// Positive delays the successor, negative (a lead) allows overlap.
    #[serde(default)]
    pub lag_days: f64,
}

impl Dependency {
    pub fn new(predecessor_id: impl Into<String>, kind: DependencyType, lag_days: f64) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            kind,
            lag_days,
        }
    }

    /// Plain finish-to-start link with no lag.
    pub fn finish_to_start(predecessor_id: impl Into<String>) -> Self {
        Self::new(predecessor_id, DependencyType::FinishToStart, 0.0)
    }

    /// Build a dependency from storage units: a textual type and a lag in
    /// minutes, normalized with `config.minutes_per_day`.
    pub fn from_minutes(
        predecessor_id: impl Into<String>,
        kind: &str,
        lag_minutes: f64,
        config: &EngineConfig,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            predecessor_id,
            kind.parse()?,
            minutes_to_days(lag_minutes, config.minutes_per_day)?,
        ))
    }
}

/// A task in the work breakdown structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Dot-segmented hierarchical id, unique within a project.
    pub outline_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_days: f64,
    #[serde(default)]
    pub is_milestone: bool,
    /// Advisory only; summary status is derived from the outline ids.
    #[serde(default)]
    pub is_summary: bool,
    /// Informational, 0-100.
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Task {
    pub fn new(outline_id: impl Into<String>, duration_days: f64) -> Self {
        Self {
            outline_id: outline_id.into(),
            name: String::new(),
            duration_days,
            is_milestone: false,
            is_summary: false,
            percent_complete: 0.0,
            dependencies: Vec::new(),
        }
    }

    pub fn milestone(outline_id: impl Into<String>) -> Self {
        Self {
            is_milestone: true,
            ..Self::new(outline_id, 0.0)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_percent_complete(mut self, percent_complete: f64) -> Self {
        self.percent_complete = percent_complete;
        self
    }
}

/// Computed timing for one task, in day offsets from the project start.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskSchedule {
    pub outline_id: String,
    /// Scheduled duration (rolled-up span for summaries, 0 for milestones).
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

/// Output of a full pipeline run.
#[derive(Clone, Debug, Serialize)]
pub struct ScheduleResult {
    pub anchor_date: NaiveDate,
    /// Every task, summaries included, in ascending outline-id order.
    pub tasks: Vec<TaskSchedule>,
    /// Critical non-summary tasks in topological order.
    pub critical_path: Vec<String>,
    /// Every maximal chain of driving critical dependencies.
    pub critical_chains: Vec<Vec<String>>,
    /// Latest early finish over all tasks.
    pub project_duration: f64,
    /// The anchor used by the backward pass.
    pub project_end: f64,
    pub warnings: Vec<ScheduleWarning>,
    #[serde(skip)]
    pub(crate) index: FxHashMap<String, usize>,
}

impl ScheduleResult {
    pub(crate) fn new(
        anchor_date: NaiveDate,
        tasks: Vec<TaskSchedule>,
        critical_path: Vec<String>,
        critical_chains: Vec<Vec<String>>,
        project_duration: f64,
        project_end: f64,
        warnings: Vec<ScheduleWarning>,
    ) -> Self {
        let index = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.outline_id.clone(), i))
            .collect();
        Self {
            anchor_date,
            tasks,
            critical_path,
            critical_chains,
            project_duration,
            project_end,
            warnings,
            index,
        }
    }

    /// Look up a task's schedule by outline id.
    pub fn get(&self, outline_id: &str) -> Option<&TaskSchedule> {
        self.index.get(outline_id).map(|&i| &self.tasks[i])
    }

    pub fn is_critical(&self, outline_id: &str) -> bool {
        self.get(outline_id).is_some_and(|t| t.is_critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_type_parsing() {
        assert_eq!("FS".parse::<DependencyType>(), Ok(DependencyType::FinishToStart));
        assert_eq!("ff".parse::<DependencyType>(), Ok(DependencyType::FinishToFinish));
        assert_eq!("start_to_start".parse::<DependencyType>(), Ok(DependencyType::StartToStart));
        assert_eq!("Start-To-Finish".parse::<DependencyType>(), Ok(DependencyType::StartToFinish));
        assert_eq!(
            "XX".parse::<DependencyType>(),
            Err(ValidationError::IllegalDependencyType("XX".to_string()))
        );
    }

    #[test]
    fn test_dependency_from_minutes() {
        let config = EngineConfig::default();
        let dep = Dependency::from_minutes("1.1", "SS", -1440.0, &config).unwrap();
        assert_eq!(dep.kind, DependencyType::StartToStart);
        assert!((dep.lag_days + 3.0).abs() < 1e-12);

        // Ten-hour days.
        let long_days = EngineConfig {
            minutes_per_day: 600.0,
            ..EngineConfig::default()
        };
        let dep = Dependency::from_minutes("1.1", "FS", 1500.0, &long_days).unwrap();
        assert!((dep.lag_days - 2.5).abs() < 1e-12);

        assert!(matches!(
            Dependency::from_minutes("1.1", "??", 0.0, &config),
            Err(ValidationError::IllegalDependencyType(_))
        ));
        let broken = EngineConfig {
            minutes_per_day: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Dependency::from_minutes("1.1", "FS", 60.0, &broken),
            Err(ValidationError::InvalidMinutesPerDay(_))
        ));
    }

    #[test]
    fn test_task_deserializes_with_defaults() {
        let task: Task = serde_json::from_str(
            r#"{
                "outline_id": "1.2",
                "duration_days": 4,
                "dependencies": [{"predecessor_id": "1.1", "type": "SS", "lag_days": 1.5}]
            }"#,
        )
        .unwrap();
        assert_eq!(task.outline_id, "1.2");
        assert!(!task.is_milestone);
        assert_eq!(task.dependencies[0].kind, DependencyType::StartToStart);

        let dep: Dependency = serde_json::from_str(r#"{"predecessor_id": "1"}"#).unwrap();
        assert_eq!(dep, Dependency::finish_to_start("1"));
    }

    #[test]
    fn test_type_predicates() {
        assert!(DependencyType::StartToFinish.constrains_finish());
        assert!(DependencyType::StartToFinish.from_start());
        assert!(!DependencyType::FinishToStart.constrains_finish());
        assert!(!DependencyType::FinishToFinish.from_start());
    }
}
