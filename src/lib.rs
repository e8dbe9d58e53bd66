//! Goal Tracker ordering engine
//!
//! Client-side ordering for the task lists of a goal tracker: fractional
//! order keys, a derived active/completed view, an optimistic overlay over
//! the server-confirmed list, drag resolution and precision-driven
//! reindexing. The remote store sits behind [`TaskApi`].

pub mod api;
pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod order;
pub mod overlay;
pub mod reindex;
pub mod view;

#[cfg(test)]
mod testing;

pub use api::TaskApi;
pub use board::{DropOutcome, ReorderOutcome, TaskBoard, TaskIntent};
pub use cache::{CachedList, TaskCache};
pub use config::EngineConfig;
pub use error::{DomainError, DomainResult, MutationKind, SyncFailure};
pub use models::{Goal, NewTask, Task, TaskPatch};
pub use notify::ChangeNotifier;
pub use order::{append_order, order_for_move, synthesize_order, ORDER_STEP};
pub use overlay::{OverlayLayer, OverlayTicket};
pub use reindex::ReindexTrigger;
pub use view::{TaskCollectionView, TaskCounts};

pub use task_dragdrop::{DragEvent, DragMachine, DragState, DropTarget};
