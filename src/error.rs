//! Error types for the task store, board and storage layers

use thiserror::Error;

/// Errors from deck operations
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Already dragging task {0}")]
    DragInProgress(String),

    #[error("No drag in progress")]
    NotDragging,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeckError>;
