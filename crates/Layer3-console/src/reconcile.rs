//! Poll reconciliation: patch in place, or refetch the page

use castdesk_api::{ApiResult, Task};
use tracing::warn;

/// What a poll tick does with its fetched details
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Replace matching local tasks with these details
    Patch(Vec<Task>),
    /// A task reached a terminal state; run a full query instead
    Refetch,
}

/// Decide from one tick's detail fetches
///
/// Any terminal status wins and discards every patch. Failed fetches are
/// logged and dropped, so that task keeps its prior state.
pub fn reconcile(results: Vec<(String, ApiResult<Task>)>) -> Reconciliation {
    let mut patches = Vec::with_capacity(results.len());

    for (task_id, result) in results {
        match result {
            Ok(task) if task.is_terminal() => return Reconciliation::Refetch,
            Ok(task) => patches.push(task),
            Err(e) => warn!(task_id = %task_id, error = %e, "Failed to refresh task"),
        }
    }

    Reconciliation::Patch(patches)
}

/// Overwrite local tasks by id; returns how many were replaced
pub fn apply_patches(tasks: &mut [Task], patches: Vec<Task>) -> usize {
    let mut applied = 0;
    for patch in patches {
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == patch.id) {
            *slot = patch;
            applied += 1;
        }
    }
    applied
}
