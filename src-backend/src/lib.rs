//! Goal Store
//!
//! SQLite persistence for goals and their tasks, plus a [`TaskApi`]
//! implementation serving the ordering engine from the local database.
//!
//! [`TaskApi`]: goal_tracker::TaskApi

mod client;
mod db;
mod goal_repo;
mod task_positioning;
mod task_repo;


pub use client::LocalTaskApi;
pub use db::{init_db, DbState, SharedConnection};
pub use goal_repo::GoalRepository;
pub use task_positioning::TaskPositioningOperations;
pub use task_repo::TaskRepository;
