//! Local `TaskApi`
//!
//! Serves the ordering engine straight from the SQLite store.

use async_trait::async_trait;
use goal_tracker::{DomainResult, NewTask, Task, TaskApi, TaskPatch};

use crate::db::DbState;
use crate::task_positioning::TaskPositioningOperations;
use crate::task_repo::TaskRepository;

pub struct LocalTaskApi {
    tasks: TaskRepository,
}

impl LocalTaskApi {
    pub fn new(db: &DbState) -> Self {
        Self {
            tasks: TaskRepository::new(db.connection()),
        }
    }

    pub fn tasks(&self) -> &TaskRepository {
        &self.tasks
    }
}

#[async_trait]
impl TaskApi for LocalTaskApi {
    async fn fetch_tasks(&self, goal_id: &str) -> DomainResult<Vec<Task>> {
        self.tasks.list_by_goal(goal_id).await
    }

    async fn set_task_order(&self, goal_id: &str, task_id: &str, new_order: f64) -> DomainResult<()> {
        self.tasks.set_order(goal_id, task_id, new_order).await
    }

    async fn set_task_completed(&self, goal_id: &str, task_id: &str, completed: bool) -> DomainResult<()> {
        self.tasks.set_completed(goal_id, task_id, completed).await
    }

    async fn reindex_tasks(&self, goal_id: &str) -> DomainResult<()> {
        TaskPositioningOperations::reindex_tasks(&self.tasks, goal_id).await
    }

    async fn delete_task(&self, goal_id: &str, task_id: &str) -> DomainResult<()> {
        self.tasks.delete(goal_id, task_id).await
    }

    async fn create_task(&self, goal_id: &str, task: &NewTask) -> DomainResult<Task> {
        self.tasks.create(goal_id, task).await
    }

    async fn update_task(&self, goal_id: &str, patch: &TaskPatch) -> DomainResult<()> {
        self.tasks.update(goal_id, patch).await.map(|_| ())
    }
}
