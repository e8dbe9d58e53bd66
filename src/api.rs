//! Persistence Collaborator
//!
//! Abstract contract for the remote task store. The engine never talks to a
//! transport directly; implementations can be HTTP clients, SQLite, in-memory, etc.

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::models::{NewTask, Task, TaskPatch};

/// Remote task operations scoped by goal
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Full current task set of a goal
    async fn fetch_tasks(&self, goal_id: &str) -> DomainResult<Vec<Task>>;

    /// Persist a single task's order key
    async fn set_task_order(&self, goal_id: &str, task_id: &str, new_order: f64) -> DomainResult<()>;

    /// Persist a task's completion flag
    async fn set_task_completed(&self, goal_id: &str, task_id: &str, completed: bool) -> DomainResult<()>;

    /// Renumber every task of a goal to restore key spacing
    async fn reindex_tasks(&self, goal_id: &str) -> DomainResult<()>;

    async fn delete_task(&self, goal_id: &str, task_id: &str) -> DomainResult<()>;

    async fn create_task(&self, goal_id: &str, task: &NewTask) -> DomainResult<Task>;

    /// Update text, deadline or time spent
    async fn update_task(&self, goal_id: &str, patch: &TaskPatch) -> DomainResult<()>;
}
