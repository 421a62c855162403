use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub time_estimate: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Board column a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Columns in board order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn label(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Column index on the board
    pub fn index(self) -> usize {
        match self {
            Self::ToDo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Next status in the status-selector cycle
    pub fn next(self) -> Self {
        match self {
            Self::ToDo => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::ToDo,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" | "doing" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(DeckError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(DeckError::InvalidPriority(s.to_string())),
        }
    }
}

/// Generate a task id: creation timestamp plus a random base36 suffix
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("task-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Fields collected by the add form
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: String,
    pub time_estimate: String,
    pub status: Option<TaskStatus>,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>, assignee: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            assignee: assignee.into(),
            ..Default::default()
        }
    }

    /// Title and assignee are required
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DeckError::InvalidTask("title is required".to_string()));
        }
        if self.assignee.trim().is_empty() {
            return Err(DeckError::InvalidTask("assignee is required".to_string()));
        }
        Ok(())
    }

    /// Validate and assign a fresh id
    pub fn build(self) -> Result<Task> {
        self.validate()?;
        Ok(Task {
            id: generate_id(),
            title: self.title.trim().to_string(),
            description: self.description,
            assignee: self.assignee.trim().to_string(),
            due_date: self.due_date,
            time_estimate: self.time_estimate,
            status: self.status.unwrap_or(TaskStatus::ToDo),
            priority: self.priority,
            completed_at: None,
        })
    }
}

/// Partial update from the edit form. Never touches status or position.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub time_estimate: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.time_estimate.is_none()
            && self.priority.is_none()
    }

    pub fn apply(self, task: &mut Task) -> Result<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(DeckError::InvalidTask("title cannot be empty".to_string()));
            }
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(time_estimate) = self.time_estimate {
            task.time_estimate = time_estimate;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        Ok(())
    }
}
