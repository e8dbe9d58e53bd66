//! Task Board
//!
//! Per-goal controller tying the pieces together: drag events are resolved
//! into reorder/complete intents, every intent is applied to the overlay
//! before its remote call is issued, and acknowledgments are reconciled by
//! re-fetching the canonical list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use task_dragdrop::{DragEvent, DragMachine};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::TaskApi;
use crate::cache::TaskCache;
use crate::config::EngineConfig;
use crate::error::{DomainError, DomainResult, MutationKind, SyncFailure};
use crate::models::{NewTask, Task, TaskPatch};
use crate::notify::ChangeNotifier;
use crate::order::{append_order, order_for_move};
use crate::overlay::{OverlayLayer, OverlayTicket};
use crate::reindex::ReindexTrigger;
use crate::view::TaskCollectionView;

/// Mutation resolved from a finished drag
#[derive(Debug, Clone, PartialEq)]
pub enum TaskIntent {
    Reorder { task_id: String, new_order: f64 },
    Complete { task_id: String },
}

/// Result of a committed reorder
#[derive(Debug)]
pub struct ReorderOutcome {
    pub new_order: f64,
    /// Background renumbering, if the committed key ran out of precision
    pub reindex: Option<JoinHandle<()>>,
}

/// Result of handling a drag event
#[derive(Debug)]
pub enum DropOutcome {
    Reordered(ReorderOutcome),
    Completed { task_id: String },
    /// Cancel, self-drop or an invalid target: nothing was emitted
    Ignored,
}

/// Ordering engine for the task lists of every goal
#[derive(Clone)]
pub struct TaskBoard {
    api: Arc<dyn TaskApi>,
    overlay: Arc<OverlayLayer>,
    reindex: ReindexTrigger,
    config: EngineConfig,
}

impl TaskBoard {
    pub fn new(api: Arc<dyn TaskApi>, config: EngineConfig) -> Self {
        let cache = Arc::new(TaskCache::new(ChangeNotifier::new()));
        Self::with_cache(api, cache, config)
    }

    /// Build on an existing cache (shared with other views of the same goals)
    pub fn with_cache(api: Arc<dyn TaskApi>, cache: Arc<TaskCache>, config: EngineConfig) -> Self {
        Self {
            api,
            overlay: Arc::new(OverlayLayer::new(cache)),
            reindex: ReindexTrigger::new(config.reindex_min_gap),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    /// Wakes whenever a view may have changed
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.overlay.cache().notifier().subscribe()
    }

    /// Drag machine configured with this board's activation threshold
    pub fn drag_machine(&self) -> DragMachine<String> {
        DragMachine::with_threshold(self.config.drag_threshold_px)
    }

    /// Current derived view of a goal
    pub fn view(&self, goal_id: &str) -> TaskCollectionView {
        self.overlay.view(goal_id)
    }

    /// Error banner state of a goal
    pub fn failure(&self, goal_id: &str) -> Option<SyncFailure> {
        self.overlay.failure(goal_id)
    }

    pub fn clear_failure(&self, goal_id: &str) {
        self.overlay.clear_failure(goal_id);
    }

    // ========================
    // Fetch
    // ========================

    /// Fetch the canonical list; a successful fetch clears the overlay
    pub async fn load(&self, goal_id: &str) -> DomainResult<TaskCollectionView> {
        match self.api.fetch_tasks(goal_id).await {
            Ok(tasks) => {
                tracing::debug!(goal_id, count = tasks.len(), "tasks fetched");
                self.overlay.reconcile(goal_id, tasks);
                Ok(self.view(goal_id))
            }
            Err(e) => {
                tracing::warn!(goal_id, error = %e, "failed to fetch tasks");
                self.overlay.record_failure(goal_id, SyncFailure::Fetch(e.clone()));
                Err(e)
            }
        }
    }

    /// Invalidate and re-fetch after an acknowledged mutation.
    ///
    /// A failed re-fetch is recorded but does not fail the mutation.
    async fn refresh(&self, goal_id: &str) {
        self.overlay.cache().invalidate(goal_id);
        if let Err(e) = self.load(goal_id).await {
            tracing::warn!(goal_id, error = %e, "re-fetch after mutation failed, keeping overlay");
        }
    }

    // ========================
    // Drag Handling
    // ========================

    /// Resolve a finished drag into an intent against the current view.
    ///
    /// Reorders only consider active tasks: both ends must be in the active list.
    pub fn resolve_intent(&self, goal_id: &str, event: &DragEvent<String>) -> Option<TaskIntent> {
        let view = self.view(goal_id);
        match event {
            DragEvent::Reorder { active, over } => {
                if !view.is_active(active) || !view.is_active(over) {
                    tracing::debug!(goal_id, %active, %over, "drop outside active list ignored");
                    return None;
                }
                let new_order = order_for_move(&view.active_tasks, active, over)?;
                Some(TaskIntent::Reorder {
                    task_id: active.clone(),
                    new_order,
                })
            }
            DragEvent::Complete { active } => view.find(active).map(|_| TaskIntent::Complete {
                task_id: active.clone(),
            }),
            DragEvent::Cancel { .. } => None,
        }
    }

    /// Handle the event emitted by a drag session
    pub async fn handle_drop(&self, goal_id: &str, event: &DragEvent<String>) -> DomainResult<DropOutcome> {
        match self.resolve_intent(goal_id, event) {
            Some(TaskIntent::Reorder { task_id, new_order }) => {
                let outcome = self.reorder(goal_id, &task_id, new_order).await?;
                Ok(DropOutcome::Reordered(outcome))
            }
            Some(TaskIntent::Complete { task_id }) => {
                self.set_completed(goal_id, &task_id, true).await?;
                Ok(DropOutcome::Completed { task_id })
            }
            None => Ok(DropOutcome::Ignored),
        }
    }

    // ========================
    // Optimistic Mutations
    // ========================

    fn ensure_task(&self, goal_id: &str, task_id: &str) -> DomainResult<Task> {
        self.overlay
            .source(goal_id)
            .into_iter()
            .find(|t| t.task_id == task_id)
            .ok_or_else(|| DomainError::NotFound(format!("task {} in goal {}", task_id, goal_id)))
    }

    /// Roll back and surface a rejected mutation
    fn rejected(&self, ticket: &OverlayTicket, action: MutationKind, error: DomainError) -> DomainError {
        tracing::warn!(
            goal_id = ticket.goal_id(),
            action = action.as_str(),
            error = %error,
            "mutation rejected, rolling back"
        );
        self.overlay.reject(ticket, action, error.clone());
        error
    }

    /// Move a task to a new order key
    pub async fn reorder(&self, goal_id: &str, task_id: &str, new_order: f64) -> DomainResult<ReorderOutcome> {
        self.ensure_task(goal_id, task_id)?;

        let ticket = self.overlay.apply(goal_id, |tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.task_id == task_id) {
                task.order = new_order;
            }
        });

        if let Err(e) = self.api.set_task_order(goal_id, task_id, new_order).await {
            return Err(self.rejected(&ticket, MutationKind::Reorder, e));
        }
        tracing::info!(goal_id, task_id, new_order, "task reordered");

        let reindex = self
            .reindex
            .should_reindex(new_order)
            .then(|| self.spawn_reindex(goal_id));
        self.refresh(goal_id).await;

        Ok(ReorderOutcome { new_order, reindex })
    }

    /// Set a task's completion flag; the order key is untouched
    pub async fn set_completed(&self, goal_id: &str, task_id: &str, completed: bool) -> DomainResult<()> {
        self.ensure_task(goal_id, task_id)?;

        let ticket = self.overlay.apply(goal_id, |tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.task_id == task_id) {
                task.completed = completed;
            }
        });

        if let Err(e) = self.api.set_task_completed(goal_id, task_id, completed).await {
            return Err(self.rejected(&ticket, MutationKind::Complete, e));
        }
        tracing::info!(goal_id, task_id, completed, "task completion updated");

        self.refresh(goal_id).await;
        Ok(())
    }

    /// Flip a task's completion flag
    pub async fn toggle_completed(&self, goal_id: &str, task_id: &str) -> DomainResult<bool> {
        let completed = !self.ensure_task(goal_id, task_id)?.completed;
        self.set_completed(goal_id, task_id, completed).await?;
        Ok(completed)
    }

    pub async fn delete_task(&self, goal_id: &str, task_id: &str) -> DomainResult<()> {
        self.ensure_task(goal_id, task_id)?;

        let ticket = self
            .overlay
            .apply(goal_id, |tasks| tasks.retain(|t| t.task_id != task_id));

        if let Err(e) = self.api.delete_task(goal_id, task_id).await {
            return Err(self.rejected(&ticket, MutationKind::Delete, e));
        }
        tracing::info!(goal_id, task_id, "task deleted");

        self.refresh(goal_id).await;
        Ok(())
    }

    // ========================
    // Non-optimistic Mutations
    // ========================

    /// Append a task after every existing task
    pub async fn add_task(&self, goal_id: &str, text: &str, deadline: Option<DateTime<Utc>>) -> DomainResult<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidInput("task text must not be empty".to_string()));
        }

        let new_task = NewTask {
            text: text.to_string(),
            deadline,
            order: append_order(&self.overlay.source(goal_id)),
        };

        match self.api.create_task(goal_id, &new_task).await {
            Ok(task) => {
                tracing::info!(goal_id, task_id = %task.task_id, order = task.order, "task created");
                self.refresh(goal_id).await;
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(goal_id, error = %e, "failed to create task");
                self.overlay.record_failure(
                    goal_id,
                    SyncFailure::Mutation {
                        action: MutationKind::Create,
                        error: e.clone(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Edit text, deadline or time spent; the confirmed fields replace the cached record
    pub async fn edit_task(&self, goal_id: &str, patch: TaskPatch) -> DomainResult<()> {
        if patch.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }
        if patch.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DomainError::InvalidInput("task text must not be empty".to_string()));
        }
        self.ensure_task(goal_id, &patch.task_id)?;

        if let Err(e) = self.api.update_task(goal_id, &patch).await {
            tracing::warn!(goal_id, task_id = %patch.task_id, error = %e, "failed to edit task");
            self.overlay.record_failure(
                goal_id,
                SyncFailure::Mutation {
                    action: MutationKind::Edit,
                    error: e.clone(),
                },
            );
            return Err(e);
        }

        self.overlay
            .confirm_update(goal_id, &patch.task_id, |task| patch.apply_to(task));
        tracing::debug!(goal_id, task_id = %patch.task_id, "task edited");
        Ok(())
    }

    /// Add elapsed timer seconds to a task. Returns the new total.
    pub async fn log_time(&self, goal_id: &str, task_id: &str, seconds: u64) -> DomainResult<u64> {
        let total = self.ensure_task(goal_id, task_id)?.time_spent.saturating_add(seconds);
        self.edit_task(goal_id, TaskPatch::new(task_id).time_spent(total)).await?;
        Ok(total)
    }

    // ========================
    // Reindex
    // ========================

    /// Renumber the goal's keys in the background; failures are only logged
    fn spawn_reindex(&self, goal_id: &str) -> JoinHandle<()> {
        let board = self.clone();
        let goal_id = goal_id.to_string();
        tokio::spawn(async move {
            match board.api.reindex_tasks(&goal_id).await {
                Ok(()) => {
                    tracing::info!(goal_id = %goal_id, "tasks reindexed");
                    board.refresh(&goal_id).await;
                }
                Err(e) => {
                    tracing::warn!(goal_id = %goal_id, error = %e, "reindexing failed");
                }
            }
        })
    }
}
