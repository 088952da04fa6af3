//! Applying a strategy to a task list.

use rustc_hash::FxHashMap;

use super::types::{ProposedEdit, Strategy};
use crate::errors::ValidationError;
use crate::models::Task;

/// Return a copy of `tasks` with every edit of `strategy` applied.
///
/// The input is untouched; re-run the pipeline on the result to confirm the
/// new duration.
///
/// # Returns
/// * `Err(ValidationError::UnknownTask)` if an edit names a missing task
/// * `Err(ValidationError::UnknownDependency)` if a lag edit's dependency
///   index is out of range or points at a different predecessor
pub fn apply_strategy(tasks: &[Task], strategy: &Strategy) -> Result<Vec<Task>, ValidationError> {
    apply_edits(tasks, &strategy.edits)
}

pub(crate) fn apply_edits(
    tasks: &[Task],
    edits: &[ProposedEdit],
) -> Result<Vec<Task>, ValidationError> {
    let positions: FxHashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.outline_id.as_str(), i))
        .collect();
    let mut edited = tasks.to_vec();

    for edit in edits {
        let position = *positions
            .get(edit.outline_id())
            .ok_or_else(|| ValidationError::UnknownTask(edit.outline_id().to_string()))?;
        let task = &mut edited[position];
        match edit {
            ProposedEdit::Lag {
                predecessor_id,
                dependency_index,
                proposed_lag_days,
                ..
            } => {
                let dependency = task
                    .dependencies
                    .get_mut(*dependency_index)
                    .filter(|dep| dep.predecessor_id == *predecessor_id)
                    .ok_or_else(|| ValidationError::UnknownDependency {
                        task: task.outline_id.clone(),
                        index: *dependency_index,
                    })?;
                dependency.lag_days = *proposed_lag_days;
            }
            ProposedEdit::Duration { proposed_days, .. } => {
                task.duration_days = *proposed_days;
            }
        }
    }
    Ok(edited)
}
