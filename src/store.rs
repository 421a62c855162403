//! Active task collection and completed-task archive
//!
//! A task lives in exactly one of the two lists. Moving a task to Done
//! migrates it into the archive with a completion timestamp; restoring moves
//! it back as a fresh To Do task.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{DeckError, Result};
use crate::task::{NewTask, Task, TaskEdit, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    active: Vec<Task>,
    archive: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(active: Vec<Task>, archive: Vec<Task>) -> Self {
        Self { active, archive }
    }

    /// Active tasks in board order
    pub fn active(&self) -> &[Task] {
        &self.active
    }

    /// Archived tasks in completion order
    pub fn archive(&self) -> &[Task] {
        &self.archive
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.active.iter().find(|t| t.id == id)
    }

    pub fn get_archived(&self, id: &str) -> Option<&Task> {
        self.archive.iter().find(|t| t.id == id)
    }

    /// Index of a task in the active collection
    pub fn position(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|t| t.id == id)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some() || self.get_archived(id).is_some()
    }

    /// Validate the add form, assign an id and store the task
    pub fn add(&mut self, new_task: NewTask) -> Result<Task> {
        let task = new_task.build()?;
        let id = task.id.clone();
        self.insert(task)?;
        self.get(&id)
            .or_else(|| self.get_archived(&id))
            .cloned()
            .ok_or(DeckError::TaskNotFound(id))
    }

    /// Append a built task. A task that is already Done goes straight to the archive.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.contains_id(&task.id) {
            return Err(DeckError::DuplicateTask(task.id));
        }
        debug!(id = %task.id, status = %task.status, "insert: adding task");
        if task.status == TaskStatus::Done {
            self.archive_task(task, Utc::now());
        } else {
            self.active.push(task);
        }
        Ok(())
    }

    /// Merge an approved plan, preserving its order
    pub fn merge_plan(&mut self, tasks: Vec<Task>) -> Result<usize> {
        let mut seen = HashSet::new();
        if let Some(dup) = tasks
            .iter()
            .find(|t| self.contains_id(&t.id) || !seen.insert(t.id.as_str()))
        {
            return Err(DeckError::DuplicateTask(dup.id.clone()));
        }
        let count = tasks.len();
        for task in tasks {
            self.insert(task)?;
        }
        info!(count, "merge_plan: plan merged into active tasks");
        Ok(count)
    }

    pub fn edit(&mut self, id: &str, edit: TaskEdit) -> Result<&Task> {
        let index = self.position(id).ok_or_else(|| DeckError::TaskNotFound(id.to_string()))?;
        edit.apply(&mut self.active[index])?;
        debug!(id, "edit: task updated");
        Ok(&self.active[index])
    }

    /// Status-selector transition
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<()> {
        self.set_status_at(id, status, Utc::now())
    }

    pub fn set_status_at(&mut self, id: &str, status: TaskStatus, now: DateTime<Utc>) -> Result<()> {
        self.move_to(id, status, None, now)
    }

    /// Change status and optionally reposition at `insert_at` in the active
    /// collection. Done archives the task instead.
    pub fn move_to(
        &mut self,
        id: &str,
        status: TaskStatus,
        insert_at: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let index = self.position(id).ok_or_else(|| DeckError::TaskNotFound(id.to_string()))?;
        if status == TaskStatus::Done {
            self.complete(id, now)?;
            return Ok(());
        }
        let from = self.active[index].status;
        self.active[index].status = status;
        if let Some(to) = insert_at {
            self.reorder(index, to)?;
        }
        debug!(id, %from, to = %status, "move_to: status changed");
        Ok(())
    }

    /// Splice-move within the active collection: remove at `from`, insert at `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.active.len();
        if from >= len {
            return Err(DeckError::TaskNotFound(format!("index {}", from)));
        }
        let to = to.min(len - 1);
        if from != to {
            let task = self.active.remove(from);
            self.active.insert(to, task);
        }
        Ok(())
    }

    /// Archive an active task with a completion timestamp
    pub fn complete(&mut self, id: &str, now: DateTime<Utc>) -> Result<Task> {
        let index = self.position(id).ok_or_else(|| DeckError::TaskNotFound(id.to_string()))?;
        let task = self.active.remove(index);
        let archived = self.archive_task(task, now);
        info!(id, "complete: task archived");
        Ok(archived)
    }

    /// Append to the archive unless the id is already there
    fn archive_task(&mut self, mut task: Task, now: DateTime<Utc>) -> Task {
        task.status = TaskStatus::Done;
        if task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
        if let Some(existing) = self.get_archived(&task.id) {
            debug!(id = %task.id, "archive_task: already archived, skipping append");
            return existing.clone();
        }
        self.archive.push(task.clone());
        task
    }

    /// Move an archived task back to the end of the active collection as To Do
    pub fn restore(&mut self, id: &str) -> Result<&Task> {
        let index = self
            .archive
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DeckError::TaskNotFound(id.to_string()))?;
        if self.get(id).is_some() {
            return Err(DeckError::DuplicateTask(id.to_string()));
        }
        let mut task = self.archive.remove(index);
        task.status = TaskStatus::ToDo;
        task.completed_at = None;
        self.active.push(task);
        info!(id, "restore: task restored to active");
        Ok(&self.active[self.active.len() - 1])
    }

    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id).ok_or_else(|| DeckError::TaskNotFound(id.to_string()))?;
        info!(id, "delete: task removed");
        Ok(self.active.remove(index))
    }

    /// Drop every archived task, returning how many were removed
    pub fn clear_history(&mut self) -> usize {
        let count = self.archive.len();
        self.archive.clear();
        info!(count, "clear_history: archive emptied");
        count
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.active.iter().filter(|t| t.status == status).collect()
    }
}

/// Split a task list into To Do, In Progress and Done groups, keeping order
pub fn partition_by_status(tasks: &[Task]) -> [Vec<&Task>; 3] {
    let mut groups: [Vec<&Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for task in tasks {
        groups[task.status.index()].push(task);
    }
    groups
}
