//! Order Keys
//!
//! Tasks are sorted by a fractional `f64` key. Moving a task only rewrites
//! that task's key: the new key is synthesized from its new neighbors.
//! Repeated midpoints halve the gap each time; the reindex trigger repairs
//! exhausted gaps after the fact.

use crate::models::Task;

/// Key spacing used for appends and for a freshly reindexed list
pub const ORDER_STEP: f64 = 1000.0;

/// Key for a task placed between `before` and `after`
pub fn synthesize_order(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (Some(before), Some(after)) => (before + after) / 2.0,
        (Some(before), None) => before + ORDER_STEP,
        (None, Some(after)) => after / 2.0,
        (None, None) => ORDER_STEP,
    }
}

/// Key for a task appended after every task in `tasks`
pub fn append_order(tasks: &[Task]) -> f64 {
    let last = tasks.iter().map(|t| t.order).max_by(f64::total_cmp);
    synthesize_order(last, None)
}

/// New key for `moving_id` after moving it to the slot held by `over_id`.
///
/// `active` must be the active-only list in display order. The move is
/// hypothetical: the moving task is removed from its index and inserted at
/// the target's index, then the key is synthesized from its new neighbors.
/// Returns `None` if either id is missing or both are the same task.
pub fn order_for_move(active: &[Task], moving_id: &str, over_id: &str) -> Option<f64> {
    let old_index = active.iter().position(|t| t.task_id == moving_id)?;
    let new_index = active.iter().position(|t| t.task_id == over_id)?;
    if old_index == new_index {
        return None;
    }

    let mut moved: Vec<&Task> = active.iter().collect();
    let task = moved.remove(old_index);
    moved.insert(new_index, task);

    let before = new_index.checked_sub(1).map(|i| moved[i].order);
    let after = moved.get(new_index + 1).map(|t| t.order);
    Some(synthesize_order(before, after))
}
