//! In-memory `TaskApi` used by the engine's tests.
//!
//! Failures can be injected per call kind, and one call can be held open
//! until the test releases it.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::TaskApi;
use crate::error::{DomainError, DomainResult};
use crate::models::{NewTask, Task, TaskPatch};
use crate::order::ORDER_STEP;
use crate::view::sort_tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeCall {
    Fetch,
    SetOrder,
    SetCompleted,
    Reindex,
    Delete,
    Create,
    Update,
}

#[derive(Default)]
pub struct FakeApi {
    goals: Mutex<HashMap<String, Vec<Task>>>,
    failing: Mutex<HashSet<FakeCall>>,
    calls: Mutex<Vec<FakeCall>>,
    held: Mutex<Option<FakeCall>>,
    entered: Notify,
    release: Notify,
    next_id: Mutex<u32>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeApi {
    pub fn with_tasks(goal_id: &str, tasks: Vec<Task>) -> Self {
        let api = Self::default();
        lock(&api.goals).insert(goal_id.to_string(), tasks);
        api
    }

    pub fn fail_on(&self, call: FakeCall) {
        lock(&self.failing).insert(call);
    }

    pub fn succeed_on(&self, call: FakeCall) {
        lock(&self.failing).remove(&call);
    }

    /// Hold the next call of this kind open until [`FakeApi::release`]
    pub fn hold(&self, call: FakeCall) {
        *lock(&self.held) = Some(call);
    }

    /// Wait until the held call has been entered
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, call: FakeCall) -> usize {
        lock(&self.calls).iter().filter(|c| **c == call).count()
    }

    pub fn stored(&self, goal_id: &str) -> Vec<Task> {
        lock(&self.goals).get(goal_id).cloned().unwrap_or_default()
    }

    async fn enter(&self, call: FakeCall) -> DomainResult<()> {
        lock(&self.calls).push(call);
        let hold = {
            let mut held = lock(&self.held);
            if *held == Some(call) {
                held.take();
                true
            } else {
                false
            }
        };
        if hold {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if lock(&self.failing).contains(&call) {
            return Err(DomainError::Internal(format!("{:?} rejected", call)));
        }
        Ok(())
    }

    fn with_task<F>(&self, goal_id: &str, task_id: &str, f: F) -> DomainResult<()>
    where
        F: FnOnce(&mut Task),
    {
        let mut goals = lock(&self.goals);
        let task = goals
            .get_mut(goal_id)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.task_id == task_id))
            .ok_or_else(|| DomainError::NotFound(format!("task {}", task_id)))?;
        f(task);
        Ok(())
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn fetch_tasks(&self, goal_id: &str) -> DomainResult<Vec<Task>> {
        self.enter(FakeCall::Fetch).await?;
        Ok(self.stored(goal_id))
    }

    async fn set_task_order(&self, goal_id: &str, task_id: &str, new_order: f64) -> DomainResult<()> {
        self.enter(FakeCall::SetOrder).await?;
        self.with_task(goal_id, task_id, |t| t.order = new_order)
    }

    async fn set_task_completed(&self, goal_id: &str, task_id: &str, completed: bool) -> DomainResult<()> {
        self.enter(FakeCall::SetCompleted).await?;
        self.with_task(goal_id, task_id, |t| t.completed = completed)
    }

    async fn reindex_tasks(&self, goal_id: &str) -> DomainResult<()> {
        self.enter(FakeCall::Reindex).await?;
        let mut goals = lock(&self.goals);
        if let Some(tasks) = goals.get_mut(goal_id) {
            sort_tasks(tasks);
            for (i, task) in tasks.iter_mut().enumerate() {
                task.order = (i as f64 + 1.0) * ORDER_STEP;
            }
        }
        Ok(())
    }

    async fn delete_task(&self, goal_id: &str, task_id: &str) -> DomainResult<()> {
        self.enter(FakeCall::Delete).await?;
        let mut goals = lock(&self.goals);
        let tasks = goals
            .get_mut(goal_id)
            .ok_or_else(|| DomainError::NotFound(format!("goal {}", goal_id)))?;
        tasks.retain(|t| t.task_id != task_id);
        Ok(())
    }

    async fn create_task(&self, goal_id: &str, task: &NewTask) -> DomainResult<Task> {
        self.enter(FakeCall::Create).await?;
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            format!("new-{}", *next)
        };
        let mut created = Task::new(id, task.text.clone(), task.order);
        created.deadline = task.deadline;
        lock(&self.goals)
            .entry(goal_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, goal_id: &str, patch: &TaskPatch) -> DomainResult<()> {
        self.enter(FakeCall::Update).await?;
        self.with_task(goal_id, &patch.task_id, |t| patch.apply_to(t))
    }
}
