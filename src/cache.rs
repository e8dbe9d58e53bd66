//! Task List Cache
//!
//! Keyed store of the last server-confirmed (canonical) task list per goal.
//! Lists are replaced wholesale, never edited in place.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::models::Task;
use crate::notify::ChangeNotifier;

/// Canonical list of one goal
#[derive(Debug, Clone)]
pub struct CachedList {
    pub tasks: Vec<Task>,
    /// Invalidated and waiting for a re-fetch
    pub stale: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Canonical task lists keyed by goal id
#[derive(Debug, Default)]
pub struct TaskCache {
    entries: Mutex<HashMap<String, CachedList>>,
    notifier: ChangeNotifier,
}

impl TaskCache {
    pub fn new(notifier: ChangeNotifier) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedList>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Canonical tasks of a goal, if ever fetched
    pub fn get(&self, goal_id: &str) -> Option<Vec<Task>> {
        self.lock().get(goal_id).map(|entry| entry.tasks.clone())
    }

    pub fn entry(&self, goal_id: &str) -> Option<CachedList> {
        self.lock().get(goal_id).cloned()
    }

    /// Replace a goal's canonical list with a fresh fetch
    pub fn set(&self, goal_id: &str, tasks: Vec<Task>) {
        self.lock().insert(
            goal_id.to_string(),
            CachedList {
                tasks,
                stale: false,
                fetched_at: Utc::now(),
            },
        );
        self.notifier.bump();
    }

    /// Mark a goal's list stale. Returns false if nothing was cached.
    pub fn invalidate(&self, goal_id: &str) -> bool {
        let found = match self.lock().get_mut(goal_id) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        };
        if found {
            self.notifier.bump();
        }
        found
    }

    /// Missing lists count as stale
    pub fn is_stale(&self, goal_id: &str) -> bool {
        self.lock().get(goal_id).map_or(true, |entry| entry.stale)
    }

    /// Swap one confirmed task record into a copy of the goal's list.
    ///
    /// Returns false if the goal or task is not cached.
    pub fn update_task<F>(&self, goal_id: &str, task_id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Task),
    {
        let updated = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(goal_id) else {
                return false;
            };
            let mut tasks = entry.tasks.clone();
            match tasks.iter_mut().find(|t| t.task_id == task_id) {
                Some(task) => {
                    update(task);
                    entry.tasks = tasks;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notifier.bump();
        }
        updated
    }

    /// Drop a goal's list (goal deleted)
    pub fn remove(&self, goal_id: &str) {
        if self.lock().remove(goal_id).is_some() {
            self.notifier.bump();
        }
    }
}
