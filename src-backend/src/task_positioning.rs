//! Task Positioning Operations
//!
//! Order key maintenance for the tasks of a goal.

use async_trait::async_trait;
use goal_tracker::{synthesize_order, DomainResult, ORDER_STEP};
use rusqlite::params;

use crate::db::db_err;
use crate::task_repo::{ensure_goal, TaskRepository};

/// Trait for task positioning operations
#[async_trait]
pub trait TaskPositioningOperations {
    /// Key that places a new task after every task of the goal
    async fn next_order(&self, goal_id: &str) -> DomainResult<f64>;

    /// Rewrite the goal's keys as 1000, 2000, 3000, ... in current order
    async fn reindex_tasks(&self, goal_id: &str) -> DomainResult<()>;
}

#[async_trait]
impl TaskPositioningOperations for TaskRepository {
    async fn next_order(&self, goal_id: &str) -> DomainResult<f64> {
        let conn = self.conn.lock().await;
        ensure_goal(&conn, goal_id)?;

        let last: Option<f64> = conn
            .query_row(
                "SELECT MAX(order_key) FROM tasks WHERE goal_id = ?1",
                params![goal_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(synthesize_order(last, None))
    }

    async fn reindex_tasks(&self, goal_id: &str) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        ensure_goal(&conn, goal_id)?;
        let tx = conn.transaction().map_err(db_err)?;

        // Get all tasks of this goal ordered by current key
        let ids = {
            let mut stmt = tx
                .prepare("SELECT task_id FROM tasks WHERE goal_id = ?1 ORDER BY order_key, task_id")
                .map_err(db_err)?;
            let rows = stmt
                .query_map(params![goal_id], |row| row.get::<_, String>(0))
                .map_err(db_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(db_err)?
        };

        for (i, id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE tasks SET order_key = ?1 WHERE task_id = ?2",
                params![(i as f64 + 1.0) * ORDER_STEP, id],
            )
            .map_err(db_err)?;
        }
        tx.commit().map_err(db_err)?;

        tracing::info!(goal_id, count = ids.len(), "task keys renumbered");
        Ok(())
    }
}
