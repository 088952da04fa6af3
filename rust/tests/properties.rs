use chrono::NaiveDate;
use proptest::prelude::*;
use cpm_engine::{schedule, CpmError, Dependency, DependencyType, EngineConfig, Task};

const KINDS: [DependencyType; 4] = [
    DependencyType::FinishToStart,
    DependencyType::FinishToFinish,
    DependencyType::StartToStart,
    DependencyType::StartToFinish,
];

// Acyclic by construction: task i only depends on tasks 0..i.
fn build_dag(durations: Vec<f64>, raw_deps: Vec<Vec<(usize, usize, f64)>>) -> Vec<Task> {
    durations
        .into_iter()
        .zip(raw_deps)
        .enumerate()
        .map(|(i, (duration, potential))| {
            let mut task = Task::new(format!("T{i:03}"), duration);
            if i > 0 {
                for (pred, kind, lag) in potential {
                    let pred_id = format!("T{:03}", pred % i);
                    if task.dependencies.iter().any(|d| d.predecessor_id == pred_id) {
                        continue;
                    }
                    task = task.with_dependency(Dependency::new(pred_id, KINDS[kind], lag));
                }
            }
            task
        })
        .collect()
}

fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let durations = proptest::collection::vec((0u32..20).prop_map(f64::from), num_tasks);
        let deps = proptest::collection::vec(
            proptest::collection::vec(
                (any::<usize>(), 0usize..4, (-3i32..6).prop_map(f64::from)),
                0..3,
            ),
            num_tasks,
        );
        (durations, deps).prop_map(|(durations, deps)| build_dag(durations, deps))
    })
}

// Whole days nudged by less than the comparison tolerance, so parallel
// paths differ by fractions of epsilon.
fn near_tie_value(whole: std::ops::Range<i32>) -> impl Strategy<Value = f64> {
    (whole, -9i32..=9).prop_map(|(days, nudge)| f64::from(days) + f64::from(nudge) * 1e-4)
}

fn fractional_dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let durations = proptest::collection::vec(
            prop_oneof![near_tie_value(1..15), 0.0f64..15.0],
            num_tasks,
        );
        let deps = proptest::collection::vec(
            proptest::collection::vec(
                (
                    any::<usize>(),
                    0usize..4,
                    prop_oneof![near_tie_value(-2..4), -2.0f64..4.0],
                ),
                0..3,
            ),
            num_tasks,
        );
        (durations, deps).prop_map(|(durations, deps)| build_dag(durations, deps))
    })
}

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

proptest! {
    #[test]
    fn test_timing_invariants(tasks in dag_strategy(12)) {
        let config = EngineConfig::default();
        let result = schedule(&tasks, anchor(), &config).unwrap();
        for row in &result.tasks {
            prop_assert!(row.early_start <= row.early_finish + config.epsilon);
            prop_assert!(row.late_start <= row.late_finish + config.epsilon);
            prop_assert!((row.total_float - (row.late_start - row.early_start)).abs() <= 1e-9);
            prop_assert!(row.total_float >= -config.epsilon);
            prop_assert!(row.free_float <= row.total_float + config.epsilon);
            prop_assert!(row.early_finish <= result.project_duration + config.epsilon);
        }
        prop_assert!(!result.critical_path.is_empty());
    }

    #[test]
    fn test_idempotent(tasks in dag_strategy(12)) {
        let config = EngineConfig::default();
        let first = schedule(&tasks, anchor(), &config).unwrap();
        let second = schedule(&tasks, anchor(), &config).unwrap();
        prop_assert_eq!(first.tasks, second.tasks);
        prop_assert_eq!(first.critical_path, second.critical_path);
    }

    #[test]
    fn test_input_order_irrelevant(tasks in dag_strategy(10)) {
        let config = EngineConfig::default();
        let mut reversed = tasks.clone();
        reversed.reverse();
        let forward = schedule(&tasks, anchor(), &config).unwrap();
        let backward = schedule(&reversed, anchor(), &config).unwrap();
        prop_assert_eq!(forward.tasks, backward.tasks);
    }
}

proptest! {
    #[test]
    fn test_fractional_graphs_always_schedule(tasks in fractional_dag_strategy(14)) {
        let config = EngineConfig::default();
        let result = schedule(&tasks, anchor(), &config);
        prop_assert!(
            !matches!(result, Err(CpmError::Infeasible(_))),
            "default project end reported infeasible: {:?}",
            result
        );
        let result = result.unwrap();
        for row in &result.tasks {
            prop_assert!(row.total_float >= -1e-9);
            prop_assert!(row.late_start <= row.late_finish + 1e-9);
            prop_assert!(row.early_finish <= result.project_duration + 1e-9);
        }
        prop_assert!(!result.critical_path.is_empty());
    }

    #[test]
    fn test_integer_graphs_always_schedule(tasks in dag_strategy(12)) {
        prop_assert!(schedule(&tasks, anchor(), &EngineConfig::default()).is_ok());
    }
}
