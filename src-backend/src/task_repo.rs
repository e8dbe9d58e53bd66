//! Task Repository
//!
//! SQLite-backed storage for the tasks of a goal. Every operation is scoped
//! by goal id; a task id under the wrong goal is reported as missing.
//! Positioning (reindex) lives in `task_positioning`.

use chrono::{SubsecRound, Utc};
use goal_tracker::{DomainError, DomainResult, NewTask, Task, TaskPatch};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{db_err, format_timestamp, parse_timestamp, SharedConnection};

const TASK_COLUMNS: &str = "task_id, task_text, order_key, completed, deadline, time_spent, created_at";

/// SQLite implementation of task storage
pub struct TaskRepository {
    pub(crate) conn: SharedConnection,
}

impl TaskRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All tasks of a goal, by order key
    pub async fn list_by_goal(&self, goal_id: &str) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        ensure_goal(&conn, goal_id)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tasks WHERE goal_id = ?1 ORDER BY order_key, task_id",
                TASK_COLUMNS
            ))
            .map_err(db_err)?;
        let rows = stmt.query_map(params![goal_id], row_to_task).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    pub async fn find_by_id(&self, goal_id: &str, task_id: &str) -> DomainResult<Option<Task>> {
        let conn = self.conn.lock().await;
        find_task(&conn, goal_id, task_id)
    }

    /// Insert a task with a fresh id; `time_spent` starts at zero
    pub async fn create(&self, goal_id: &str, new_task: &NewTask) -> DomainResult<Task> {
        let text = new_task.text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidInput("task text must not be empty".to_string()));
        }

        let conn = self.conn.lock().await;
        ensure_goal(&conn, goal_id)?;

        let mut task = Task::new(uuid::Uuid::new_v4().to_string(), text, new_task.order);
        task.deadline = new_task.deadline;
        // Stored with microsecond precision
        task.created_at = Utc::now().trunc_subsecs(6);

        conn.execute(
            "INSERT INTO tasks (task_id, goal_id, task_text, order_key, completed, deadline, time_spent, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, 0, ?6)",
            params![
                task.task_id,
                goal_id,
                task.text,
                task.order,
                task.deadline.as_ref().map(format_timestamp),
                format_timestamp(&task.created_at),
            ],
        )
        .map_err(db_err)?;

        tracing::debug!(goal_id, task_id = %task.task_id, order = task.order, "task inserted");
        Ok(task)
    }

    pub async fn set_order(&self, goal_id: &str, task_id: &str, order: f64) -> DomainResult<()> {
        if !order.is_finite() {
            return Err(DomainError::InvalidInput(format!("order key must be finite, got {}", order)));
        }
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE tasks SET order_key = ?1 WHERE task_id = ?2 AND goal_id = ?3",
                params![order, task_id, goal_id],
            )
            .map_err(db_err)?;
        expect_changed(changed, goal_id, task_id)
    }

    pub async fn set_completed(&self, goal_id: &str, task_id: &str, completed: bool) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE tasks SET completed = ?1 WHERE task_id = ?2 AND goal_id = ?3",
                params![completed, task_id, goal_id],
            )
            .map_err(db_err)?;
        expect_changed(changed, goal_id, task_id)
    }

    /// Apply a patch and return the stored record
    pub async fn update(&self, goal_id: &str, patch: &TaskPatch) -> DomainResult<Task> {
        if patch.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }

        let conn = self.conn.lock().await;
        let mut task = find_task(&conn, goal_id, &patch.task_id)?
            .ok_or_else(|| not_found(goal_id, &patch.task_id))?;
        patch.apply_to(&mut task);

        conn.execute(
            "UPDATE tasks SET task_text = ?1, deadline = ?2, time_spent = ?3 WHERE task_id = ?4 AND goal_id = ?5",
            params![
                task.text,
                task.deadline.as_ref().map(format_timestamp),
                i64::try_from(task.time_spent).unwrap_or(i64::MAX),
                task.task_id,
                goal_id,
            ],
        )
        .map_err(db_err)?;

        Ok(task)
    }

    pub async fn delete(&self, goal_id: &str, task_id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "DELETE FROM tasks WHERE task_id = ?1 AND goal_id = ?2",
                params![task_id, goal_id],
            )
            .map_err(db_err)?;
        expect_changed(changed, goal_id, task_id)?;
        tracing::debug!(goal_id, task_id, "task deleted");
        Ok(())
    }
}

fn not_found(goal_id: &str, task_id: &str) -> DomainError {
    DomainError::NotFound(format!("task {} in goal {}", task_id, goal_id))
}

fn expect_changed(changed: usize, goal_id: &str, task_id: &str) -> DomainResult<()> {
    if changed == 0 {
        return Err(not_found(goal_id, task_id));
    }
    Ok(())
}

pub(crate) fn ensure_goal(conn: &Connection, goal_id: &str) -> DomainResult<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM goals WHERE goal_id = ?1)",
            params![goal_id],
            |row| row.get(0),
        )
        .map_err(db_err)?;
    if !exists {
        return Err(DomainError::NotFound(format!("goal {}", goal_id)));
    }
    Ok(())
}

fn find_task(conn: &Connection, goal_id: &str, task_id: &str) -> DomainResult<Option<Task>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM tasks WHERE task_id = ?1 AND goal_id = ?2",
            TASK_COLUMNS
        ),
        params![task_id, goal_id],
        row_to_task,
    )
    .optional()
    .map_err(db_err)
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let deadline: Option<String> = row.get(4)?;
    let time_spent: i64 = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Task {
        task_id: row.get(0)?,
        text: row.get(1)?,
        order: row.get(2)?,
        completed: row.get(3)?,
        deadline: deadline.map(|s| parse_timestamp(4, &s)).transpose()?,
        time_spent: u64::try_from(time_spent).unwrap_or(0),
        created_at: parse_timestamp(6, &created_at)?,
    })
}
