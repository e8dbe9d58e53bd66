//! Goal Repository
//!
//! Goals own their tasks: deleting a goal deletes its tasks.

use chrono::{SubsecRound, Utc};
use goal_tracker::{DomainError, DomainResult, Goal, TaskCounts};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{db_err, format_timestamp, parse_timestamp, SharedConnection};
use crate::task_repo::ensure_goal;

/// SQLite implementation of goal storage
pub struct GoalRepository {
    conn: SharedConnection,
}

impl GoalRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, text: &str) -> DomainResult<Goal> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidInput("goal text must not be empty".to_string()));
        }

        let goal = Goal {
            goal_id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO goals (goal_id, goal_text, created_at) VALUES (?1, ?2, ?3)",
            params![goal.goal_id, goal.text, format_timestamp(&goal.created_at)],
        )
        .map_err(db_err)?;

        tracing::info!(goal_id = %goal.goal_id, "goal created");
        Ok(goal)
    }

    pub async fn find_by_id(&self, goal_id: &str) -> DomainResult<Option<Goal>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT goal_id, goal_text, created_at FROM goals WHERE goal_id = ?1",
            params![goal_id],
            row_to_goal,
        )
        .optional()
        .map_err(db_err)
    }

    /// All goals, newest first
    pub async fn list(&self) -> DomainResult<Vec<Goal>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT goal_id, goal_text, created_at FROM goals ORDER BY created_at DESC, rowid DESC")
            .map_err(db_err)?;
        let rows = stmt.query_map([], row_to_goal).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Delete a goal together with its tasks
    pub async fn delete(&self, goal_id: &str) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(db_err)?;

        let tasks = tx
            .execute("DELETE FROM tasks WHERE goal_id = ?1", params![goal_id])
            .map_err(db_err)?;
        let goals = tx
            .execute("DELETE FROM goals WHERE goal_id = ?1", params![goal_id])
            .map_err(db_err)?;
        if goals == 0 {
            return Err(DomainError::NotFound(format!("goal {}", goal_id)));
        }
        tx.commit().map_err(db_err)?;

        tracing::info!(goal_id, tasks, "goal deleted");
        Ok(())
    }

    /// Completed/total counts for a goal's progress bar
    pub async fn progress(&self, goal_id: &str) -> DomainResult<TaskCounts> {
        let conn = self.conn.lock().await;
        ensure_goal(&conn, goal_id)?;

        let (total, completed): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks WHERE goal_id = ?1",
                params![goal_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(db_err)?;
        Ok(TaskCounts::new(total as usize, completed as usize))
    }
}

fn row_to_goal(row: &Row) -> rusqlite::Result<Goal> {
    let created_at: String = row.get(2)?;
    Ok(Goal {
        goal_id: row.get(0)?,
        text: row.get(1)?,
        created_at: parse_timestamp(2, &created_at)?,
    })
}
