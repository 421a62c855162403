//! Command Deck - terminal kanban board
//!
//! Turn a goal into a starter plan, then work the tasks across To Do,
//! In Progress and Done. Finished tasks move to a history archive and can be
//! restored.
//!
//! # Modules
//!
//! - [`task`] - task records, statuses and priorities
//! - [`plan`] - keyword-selected plan templates
//! - [`store`] - active collection and archive lifecycle
//! - [`storage`] - JSON persistence behind a key/value trait
//! - [`kanban_board`] - board cursor and drag-and-drop state machine
//! - [`views`] - timeline, table and workload view models
//! - [`ui`] - ratatui front end
//!
//! # Example
//!
//! ```ignore
//! use deck::{FileStorage, plan, storage};
//!
//! let mut files = FileStorage::open(".deck")?;
//! let mut store = storage::load(&mut files)?;
//! store.merge_plan(plan::generate_plan("Ship the mobile app").unwrap_or_default())?;
//! storage::persist(&store, &mut files)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod kanban_board;
pub mod plan;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;
pub mod views;

pub use config::Config;
pub use error::{DeckError, Result};
pub use kanban_board::{DragOutcome, DragState, DropTarget, KanbanBoard, Resolution};
pub use plan::{generate_plan, PlanCategory};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, CURRENT_TASKS_KEY, TASK_HISTORY_KEY};
pub use store::{partition_by_status, TaskStore};
pub use task::{NewTask, Priority, Task, TaskEdit, TaskStatus};

/// Default team roster
pub const DEFAULT_TEAM: &[&str] = &["Sarah Chen", "Alex Johnson", "Mike Rodriguez", "Emma Davis"];

/// Open tasks per member that count as a full load
pub const DEFAULT_MEMBER_CAPACITY: usize = 4;

/// How long a completed card stays visible on the board (ms)
pub const DEFAULT_REMOVAL_DELAY_MS: u64 = 300;
