//! Optimistic Overlay
//!
//! A locally mutated copy of a goal's task list that supersedes the cached
//! canonical list until the server catches up. One overlay per goal; a new
//! intent replaces it wholesale. A fresh canonical list clears it, a failed
//! mutation discards it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::TaskCache;
use crate::error::{DomainError, MutationKind, SyncFailure};
use crate::models::Task;
use crate::notify::ChangeNotifier;
use crate::view::TaskCollectionView;

/// Handle to the overlay installed by one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTicket {
    goal_id: String,
    ticket: u64,
}

impl OverlayTicket {
    pub fn goal_id(&self) -> &str {
        &self.goal_id
    }
}

#[derive(Debug)]
struct GoalOverlay {
    ticket: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
struct OverlayState {
    overlays: HashMap<String, GoalOverlay>,
    failures: HashMap<String, SyncFailure>,
    next_ticket: u64,
}

/// Overlay/reconciliation layer over the canonical task cache
#[derive(Debug)]
pub struct OverlayLayer {
    cache: Arc<TaskCache>,
    state: Mutex<OverlayState>,
    notifier: ChangeNotifier,
}

impl OverlayLayer {
    pub fn new(cache: Arc<TaskCache>) -> Self {
        let notifier = cache.notifier().clone();
        Self {
            cache,
            state: Mutex::new(OverlayState::default()),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cache(&self) -> &Arc<TaskCache> {
        &self.cache
    }

    /// Effective list: the overlay if one is installed, else the canonical list
    pub fn source(&self, goal_id: &str) -> Vec<Task> {
        let state = self.lock();
        match state.overlays.get(goal_id) {
            Some(overlay) => overlay.tasks.clone(),
            None => self.cache.get(goal_id).unwrap_or_default(),
        }
    }

    pub fn view(&self, goal_id: &str) -> TaskCollectionView {
        TaskCollectionView::derive(&self.source(goal_id))
    }

    pub fn has_overlay(&self, goal_id: &str) -> bool {
        self.lock().overlays.contains_key(goal_id)
    }

    /// Pending overlay list, if any
    pub fn overlay(&self, goal_id: &str) -> Option<Vec<Task>> {
        self.lock().overlays.get(goal_id).map(|o| o.tasks.clone())
    }

    /// Apply a mutation locally and install it as the goal's overlay.
    ///
    /// The copy starts from the current effective list, so a pending overlay
    /// is carried forward and then replaced.
    pub fn apply<F>(&self, goal_id: &str, mutate: F) -> OverlayTicket
    where
        F: FnOnce(&mut Vec<Task>),
    {
        let ticket = {
            let mut state = self.lock();
            let mut tasks = match state.overlays.get(goal_id) {
                Some(overlay) => overlay.tasks.clone(),
                None => self.cache.get(goal_id).unwrap_or_default(),
            };
            mutate(&mut tasks);

            state.next_ticket += 1;
            let ticket = state.next_ticket;
            state.overlays.insert(goal_id.to_string(), GoalOverlay { ticket, tasks });
            state.failures.remove(goal_id);
            ticket
        };
        tracing::debug!(goal_id, ticket, "overlay applied");
        self.notifier.bump();

        OverlayTicket {
            goal_id: goal_id.to_string(),
            ticket,
        }
    }

    /// Discard the overlay installed by `ticket`.
    ///
    /// Returns false if it was already cleared or replaced by a newer intent.
    pub fn rollback(&self, ticket: &OverlayTicket) -> bool {
        let discarded = {
            let mut state = self.lock();
            let current = state.overlays.get(&ticket.goal_id).map(|o| o.ticket);
            if current == Some(ticket.ticket) {
                state.overlays.remove(&ticket.goal_id);
                true
            } else {
                false
            }
        };
        if discarded {
            tracing::debug!(goal_id = %ticket.goal_id, ticket = ticket.ticket, "overlay rolled back");
            self.notifier.bump();
        }
        discarded
    }

    /// Roll back a failed mutation and record the failure for the banner
    pub fn reject(&self, ticket: &OverlayTicket, action: MutationKind, error: DomainError) {
        self.rollback(ticket);
        self.record_failure(&ticket.goal_id, SyncFailure::Mutation { action, error });
    }

    /// A fresh canonical list landed: store it and clear the overlay
    pub fn reconcile(&self, goal_id: &str, tasks: Vec<Task>) {
        {
            let mut state = self.lock();
            state.overlays.remove(goal_id);
            if state.failures.get(goal_id).is_some_and(SyncFailure::is_fetch) {
                state.failures.remove(goal_id);
            }
        }
        self.cache.set(goal_id, tasks);
        tracing::debug!(goal_id, "canonical list reconciled");
    }

    /// Apply a server-confirmed field update to the canonical record, and to
    /// the pending overlay's copy so the edit stays visible under it.
    pub fn confirm_update<F>(&self, goal_id: &str, task_id: &str, update: F) -> bool
    where
        F: Fn(&mut Task),
    {
        let in_overlay = {
            let mut state = self.lock();
            state
                .overlays
                .get_mut(goal_id)
                .and_then(|overlay| overlay.tasks.iter_mut().find(|t| t.task_id == task_id))
                .map(|task| update(task))
                .is_some()
        };
        let in_cache = self.cache.update_task(goal_id, task_id, &update);
        if in_overlay && !in_cache {
            self.notifier.bump();
        }
        in_overlay || in_cache
    }

    pub fn record_failure(&self, goal_id: &str, failure: SyncFailure) {
        self.lock().failures.insert(goal_id.to_string(), failure);
        self.notifier.bump();
    }

    /// Current failure for the goal's error banner
    pub fn failure(&self, goal_id: &str) -> Option<SyncFailure> {
        self.lock().failures.get(goal_id).cloned()
    }

    pub fn clear_failure(&self, goal_id: &str) {
        if self.lock().failures.remove(goal_id).is_some() {
            self.notifier.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_with(tasks: Vec<Task>) -> OverlayLayer {
        let cache = Arc::new(TaskCache::default());
        cache.set("g1", tasks);
        OverlayLayer::new(cache)
    }

    fn set_order(tasks: &mut Vec<Task>, id: &str, order: f64) {
        if let Some(task) = tasks.iter_mut().find(|t| t.task_id == id) {
            task.order = order;
        }
    }

    #[test]
    fn test_apply_supersedes_canonical() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0), Task::new("b", "B", 2000.0)]);
        layer.apply("g1", |tasks| set_order(tasks, "b", 500.0));

        assert!(layer.has_overlay("g1"));
        assert_eq!(layer.view("g1").active_ids(), vec!["b", "a"]);
        // Canonical list is untouched
        assert_eq!(layer.cache().get("g1").unwrap()[1].order, 2000.0);
    }

    #[test]
    fn test_rollback_restores_canonical_view() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0), Task::new("b", "B", 2000.0)]);
        let before = layer.view("g1");

        let ticket = layer.apply("g1", |tasks| set_order(tasks, "b", 500.0));
        assert!(layer.rollback(&ticket));
        assert_eq!(layer.view("g1"), before);
        assert!(!layer.rollback(&ticket));
    }

    #[test]
    fn test_newer_intent_replaces_overlay() {
        let layer = layer_with(vec![
            Task::new("a", "A", 1000.0),
            Task::new("b", "B", 2000.0),
            Task::new("c", "C", 3000.0),
        ]);
        let first = layer.apply("g1", |tasks| set_order(tasks, "c", 500.0));
        let second = layer.apply("g1", |tasks| set_order(tasks, "a", 4000.0));
        // The second overlay builds on the first
        assert_eq!(layer.view("g1").active_ids(), vec!["c", "b", "a"]);

        // The older intent failing must not discard the newer overlay
        layer.reject(&first, MutationKind::Reorder, DomainError::Internal("boom".into()));
        assert!(layer.has_overlay("g1"));
        assert_eq!(layer.view("g1").active_ids(), vec!["c", "b", "a"]);
        assert!(layer.failure("g1").is_some());

        assert!(layer.rollback(&second));
        assert_eq!(layer.view("g1").active_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_clears_overlay() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0)]);
        let ticket = layer.apply("g1", |tasks| tasks[0].completed = true);

        layer.reconcile("g1", vec![Task::new("a", "A", 1000.0).completed(true)]);
        assert!(!layer.has_overlay("g1"));
        assert_eq!(layer.view("g1").counts.completed, 1);
        // A late failure of the reconciled intent has nothing to discard
        assert!(!layer.rollback(&ticket));
    }

    #[test]
    fn test_confirm_update_reaches_overlay_and_cache() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0), Task::new("b", "B", 2000.0)]);
        layer.apply("g1", |tasks| set_order(tasks, "b", 500.0));

        assert!(layer.confirm_update("g1", "a", |t| t.time_spent = 60));
        assert_eq!(layer.view("g1").find("a").unwrap().time_spent, 60);
        assert_eq!(layer.cache().get("g1").unwrap()[0].time_spent, 60);
        // The pending reorder is still in place
        assert_eq!(layer.view("g1").active_ids(), vec!["b", "a"]);

        assert!(!layer.confirm_update("g1", "zzz", |t| t.time_spent = 1));
    }

    #[test]
    fn test_empty_overlay_still_supersedes() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0)]);
        layer.apply("g1", |tasks| tasks.clear());
        assert!(layer.view("g1").is_empty());
    }

    #[test]
    fn test_failure_state() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0)]);
        layer.record_failure("g1", SyncFailure::Fetch(DomainError::Internal("offline".into())));
        assert!(layer.failure("g1").unwrap().is_fetch());

        // A successful fetch clears a fetch failure
        layer.reconcile("g1", vec![]);
        assert!(layer.failure("g1").is_none());

        let ticket = layer.apply("g1", |_| {});
        layer.reject(&ticket, MutationKind::Delete, DomainError::NotFound("a".into()));
        assert_eq!(
            layer.failure("g1"),
            Some(SyncFailure::Mutation {
                action: MutationKind::Delete,
                error: DomainError::NotFound("a".into())
            })
        );
        layer.clear_failure("g1");
        assert!(layer.failure("g1").is_none());
    }

    #[test]
    fn test_goals_are_isolated() {
        let layer = layer_with(vec![Task::new("a", "A", 1000.0)]);
        layer.cache().set("g2", vec![Task::new("x", "X", 1000.0)]);
        layer.apply("g1", |tasks| tasks.clear());

        assert!(!layer.has_overlay("g2"));
        assert_eq!(layer.view("g2").counts.total, 1);
    }
}
