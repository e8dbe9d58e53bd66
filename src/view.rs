//! Task Collection View
//!
//! Pure derivation of what the goal page renders: active tasks, completed
//! tasks and progress counts.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::Task;

/// Display ordering: `order` ascending, ties broken by `task_id`
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.order
        .total_cmp(&b.order)
        .then_with(|| a.task_id.cmp(&b.task_id))
}

/// Sort tasks into display order
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Progress counts for a goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    /// round(completed / total * 100), 0 for an empty goal
    pub percent_complete: u8,
}

impl TaskCounts {
    pub fn new(total: usize, completed: usize) -> Self {
        let percent_complete = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self { total, completed, percent_complete }
    }
}

/// Derived view of one goal's tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCollectionView {
    pub active_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
    pub counts: TaskCounts,
}

impl TaskCollectionView {
    /// Derive the view from the effective source list (overlay or canonical)
    pub fn derive(source: &[Task]) -> Self {
        let mut sorted = source.to_vec();
        sort_tasks(&mut sorted);

        let (completed_tasks, active_tasks): (Vec<Task>, Vec<Task>) =
            sorted.into_iter().partition(|t| t.completed);
        let counts = TaskCounts::new(source.len(), completed_tasks.len());

        Self {
            active_tasks,
            completed_tasks,
            counts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.total == 0
    }

    /// Find a task in either partition
    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.active_tasks
            .iter()
            .chain(self.completed_tasks.iter())
            .find(|t| t.task_id == task_id)
    }

    pub fn is_active(&self, task_id: &str) -> bool {
        self.active_tasks.iter().any(|t| t.task_id == task_id)
    }

    /// Active ids in display order
    pub fn active_ids(&self) -> Vec<&str> {
        self.active_tasks.iter().map(|t| t.task_id.as_str()).collect()
    }

    /// Completed ids in display order
    pub fn completed_ids(&self) -> Vec<&str> {
        self.completed_tasks.iter().map(|t| t.task_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn make_task(id: &str, order: f64, completed: bool) -> Task {
        Task::new(id, format!("Task {}", id), order).completed(completed)
    }

    fn assert_partition_complete(source: &[Task]) {
        let view = TaskCollectionView::derive(source);
        assert_eq!(
            view.active_tasks.len() + view.completed_tasks.len(),
            source.len()
        );

        let mut seen = HashSet::new();
        for task in view.active_tasks.iter().chain(view.completed_tasks.iter()) {
            assert!(seen.insert(task.task_id.clone()), "duplicate {}", task.task_id);
            assert!(source.contains(task));
        }
        assert!(view.active_tasks.iter().all(|t| !t.completed));
        assert!(view.completed_tasks.iter().all(|t| t.completed));
    }

    #[test]
    fn test_partition_empty() {
        assert_partition_complete(&[]);
        let view = TaskCollectionView::derive(&[]);
        assert!(view.is_empty());
        assert_eq!(view.counts.percent_complete, 0);
    }

    #[test]
    fn test_partition_all_complete() {
        let source = vec![make_task("a", 2.0, true), make_task("b", 1.0, true)];
        assert_partition_complete(&source);
        let view = TaskCollectionView::derive(&source);
        assert_eq!(view.completed_ids(), vec!["b", "a"]);
        assert_eq!(view.counts.percent_complete, 100);
    }

    #[test]
    fn test_partition_all_incomplete() {
        let source = vec![make_task("a", 30.0, false), make_task("b", 10.0, false), make_task("c", 20.0, false)];
        assert_partition_complete(&source);
        let view = TaskCollectionView::derive(&source);
        assert_eq!(view.active_ids(), vec!["b", "c", "a"]);
        assert!(view.completed_tasks.is_empty());
    }

    #[test]
    fn test_partition_mixed() {
        let source = vec![
            make_task("a", 4000.0, false),
            make_task("b", 1000.0, true),
            make_task("c", 2000.0, false),
            make_task("d", 3000.0, true),
        ];
        assert_partition_complete(&source);
        let view = TaskCollectionView::derive(&source);
        assert_eq!(view.active_ids(), vec!["c", "a"]);
        assert_eq!(view.completed_ids(), vec!["b", "d"]);
        assert_eq!(view.counts, TaskCounts { total: 4, completed: 2, percent_complete: 50 });
    }

    #[test]
    fn test_equal_orders_break_ties_by_id() {
        let source = vec![make_task("z", 1000.0, false), make_task("m", 1000.0, false), make_task("a", 1000.0, false)];
        let view = TaskCollectionView::derive(&source);
        assert_eq!(view.active_ids(), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(TaskCounts::new(3, 1).percent_complete, 33);
        assert_eq!(TaskCounts::new(3, 2).percent_complete, 67);
        assert_eq!(TaskCounts::new(8, 1).percent_complete, 13);
    }

    #[test]
    fn test_find() {
        let source = vec![make_task("a", 1.0, false), make_task("b", 2.0, true)];
        let view = TaskCollectionView::derive(&source);
        assert!(view.find("b").is_some());
        assert!(view.is_active("a"));
        assert!(!view.is_active("b"));
        assert!(view.find("c").is_none());
    }
}
