//! Kanban board selection and drag-and-drop state machine
//!
//! A drag goes `Idle -> Dragging -> Resolving -> Idle`. While dragging, the
//! hovered column only changes where the task is *shown*; nothing touches the
//! store until the drop is resolved. A drop with no target commits nothing.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{DeckError, Result};
use crate::store::TaskStore;
use crate::task::{Task, TaskStatus};

/// Where a dragged task was released or is hovering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(TaskStatus),
    Task(String),
}

/// What a drop will do to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NoOp,
    /// Splice-move within the active collection
    Reorder { from: usize, to: usize },
    /// Status change, optionally repositioned at an active-collection index
    Transition { status: TaskStatus, insert_at: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        origin: TaskStatus,
        hover: TaskStatus,
    },
    Resolving {
        task_id: String,
        resolution: Resolution,
    },
}

/// Result of a completed drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    NoOp,
    Reordered { from: usize, to: usize },
    StatusChanged { id: String, from: TaskStatus, to: TaskStatus },
    Archived { id: String },
}

/// Decide what releasing `task_id` over `target` means.
pub fn resolve(
    store: &TaskStore,
    task_id: &str,
    origin: TaskStatus,
    hover: TaskStatus,
    target: Option<&DropTarget>,
) -> Resolution {
    let Some(from) = store.position(task_id) else {
        return Resolution::NoOp;
    };
    match target {
        None => Resolution::NoOp,
        Some(DropTarget::Column(status)) if *status != origin => Resolution::Transition {
            status: *status,
            insert_at: None,
        },
        Some(DropTarget::Column(_)) => Resolution::NoOp,
        Some(DropTarget::Task(over_id)) if over_id == task_id => {
            if hover != origin {
                Resolution::Transition {
                    status: hover,
                    insert_at: None,
                }
            } else {
                Resolution::NoOp
            }
        }
        Some(DropTarget::Task(over_id)) => {
            let Some(to) = store.position(over_id) else {
                return Resolution::NoOp;
            };
            let over_status = store.active()[to].status;
            if over_status == origin {
                if from == to {
                    Resolution::NoOp
                } else {
                    Resolution::Reorder { from, to }
                }
            } else {
                Resolution::Transition {
                    status: over_status,
                    insert_at: Some(to),
                }
            }
        }
    }
}

/// Apply a resolution to the store
pub fn apply(
    store: &mut TaskStore,
    task_id: &str,
    resolution: &Resolution,
    now: DateTime<Utc>,
) -> Result<DragOutcome> {
    match resolution {
        Resolution::NoOp => Ok(DragOutcome::NoOp),
        Resolution::Reorder { from, to } => {
            store.reorder(*from, *to)?;
            Ok(DragOutcome::Reordered { from: *from, to: *to })
        }
        Resolution::Transition { status, insert_at } => {
            let from = store
                .get(task_id)
                .map(|t| t.status)
                .ok_or_else(|| DeckError::TaskNotFound(task_id.to_string()))?;
            store.move_to(task_id, *status, *insert_at, now)?;
            if *status == TaskStatus::Done {
                Ok(DragOutcome::Archived {
                    id: task_id.to_string(),
                })
            } else {
                Ok(DragOutcome::StatusChanged {
                    id: task_id.to_string(),
                    from,
                    to: *status,
                })
            }
        }
    }
}

/// Board cursor plus the drag in flight
#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub selected_status: usize,
    pub selected_task: usize,
    drag: DragState,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn dragged_id(&self) -> Option<&str> {
        match &self.drag {
            DragState::Dragging { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    fn current_status(&self) -> TaskStatus {
        TaskStatus::from_index(self.selected_status).unwrap_or(TaskStatus::ToDo)
    }

    /// Status a task is displayed under, counting the hover of a drag
    pub fn display_status(&self, task: &Task) -> TaskStatus {
        match &self.drag {
            DragState::Dragging { task_id, hover, .. } if *task_id == task.id => *hover,
            _ => task.status,
        }
    }

    /// Tasks shown in a column, in active-collection order
    pub fn column_tasks<'a>(&self, store: &'a TaskStore, status: TaskStatus) -> Vec<&'a Task> {
        store
            .active()
            .iter()
            .filter(|t| self.display_status(t) == status)
            .collect()
    }

    pub fn selected<'a>(&self, store: &'a TaskStore) -> Option<&'a Task> {
        self.column_tasks(store, self.current_status())
            .get(self.selected_task)
            .copied()
    }

    /// Drop target under the cursor: the selected card, or the column itself
    pub fn cursor_target(&self, store: &TaskStore) -> DropTarget {
        match self.selected(store) {
            Some(task) => DropTarget::Task(task.id.clone()),
            None => DropTarget::Column(self.current_status()),
        }
    }

    pub fn drag_start(&mut self, store: &TaskStore, task_id: &str) -> Result<()> {
        if let DragState::Dragging { task_id: current, .. } = &self.drag {
            return Err(DeckError::DragInProgress(current.clone()));
        }
        let task = store
            .get(task_id)
            .ok_or_else(|| DeckError::TaskNotFound(task_id.to_string()))?;
        debug!(task_id, status = %task.status, "drag_start: picked up task");
        self.drag = DragState::Dragging {
            task_id: task_id.to_string(),
            origin: task.status,
            hover: task.status,
        };
        Ok(())
    }

    /// Preview the dragged task under the hovered column; latest hover wins
    pub fn drag_over(&mut self, store: &TaskStore, target: &DropTarget) {
        let DragState::Dragging { task_id, hover, .. } = &mut self.drag else {
            return;
        };
        let hovered = match target {
            DropTarget::Column(status) => Some(*status),
            DropTarget::Task(id) if *id != *task_id => store.get(id).map(|t| t.status),
            DropTarget::Task(_) => None,
        };
        if let Some(status) = hovered {
            if status != *hover {
                debug!(task_id = %task_id, from = %hover, to = %status, "drag_over: hover changed");
                *hover = status;
            }
        }
    }

    /// Release the dragged task over `target` and commit the result
    pub fn drag_end(
        &mut self,
        store: &mut TaskStore,
        target: Option<DropTarget>,
        now: DateTime<Utc>,
    ) -> Result<DragOutcome> {
        let DragState::Dragging { task_id, origin, hover } = std::mem::take(&mut self.drag) else {
            return Err(DeckError::NotDragging);
        };
        let resolution = resolve(store, &task_id, origin, hover, target.as_ref());
        self.drag = DragState::Resolving {
            task_id: task_id.clone(),
            resolution,
        };

        let outcome = match &self.drag {
            DragState::Resolving { task_id, resolution } => apply(store, task_id, resolution, now),
            _ => Ok(DragOutcome::NoOp),
        };
        self.drag = DragState::Idle;
        debug!(task_id = %task_id, ?outcome, "drag_end: resolved");

        self.follow(store, &task_id);
        outcome
    }

    pub fn drag_cancel(&mut self) {
        if let DragState::Dragging { task_id, .. } = &self.drag {
            debug!(task_id = %task_id, "drag_cancel: dropped without target");
        }
        self.drag = DragState::Idle;
    }

    /// Pick up the card under the cursor
    pub fn pick_up(&mut self, store: &TaskStore) -> Result<()> {
        let id = self
            .selected(store)
            .map(|t| t.id.clone())
            .ok_or_else(|| DeckError::TaskNotFound("no task selected".to_string()))?;
        self.drag_start(store, &id)
    }

    /// Drop the dragged card at the cursor
    pub fn drop_here(&mut self, store: &mut TaskStore, now: DateTime<Utc>) -> Result<DragOutcome> {
        let target = self.cursor_target(store);
        self.drag_end(store, Some(target), now)
    }

    pub fn move_left(&mut self, store: &TaskStore) {
        if self.selected_status > 0 {
            self.selected_status -= 1;
            self.after_column_change(store);
        }
    }

    pub fn move_right(&mut self, store: &TaskStore) {
        if self.selected_status < TaskStatus::ALL.len() - 1 {
            self.selected_status += 1;
            self.after_column_change(store);
        }
    }

    pub fn move_up(&mut self, store: &TaskStore) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
            self.hover_cursor(store);
        }
    }

    pub fn move_down(&mut self, store: &TaskStore) {
        let len = self.column_tasks(store, self.current_status()).len();
        if self.selected_task + 1 < len {
            self.selected_task += 1;
            self.hover_cursor(store);
        }
    }

    /// Keep the cursor inside the current column after the store changed
    pub fn clamp_selection(&mut self, store: &TaskStore) {
        let len = self.column_tasks(store, self.current_status()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn after_column_change(&mut self, store: &TaskStore) {
        if self.is_dragging() {
            let status = self.current_status();
            self.drag_over(store, &DropTarget::Column(status));
            if let Some(id) = self.dragged_id().map(str::to_string) {
                self.follow(store, &id);
                return;
            }
        }
        self.clamp_selection(store);
    }

    fn hover_cursor(&mut self, store: &TaskStore) {
        if self.is_dragging() {
            let target = self.cursor_target(store);
            self.drag_over(store, &target);
        }
    }

    /// Put the cursor on a task if it is still on the board
    fn follow(&mut self, store: &TaskStore, id: &str) {
        let Some(task) = store.get(id) else {
            self.clamp_selection(store);
            return;
        };
        let status = self.display_status(task);
        self.selected_status = status.index();
        self.selected_task = self
            .column_tasks(store, status)
            .iter()
            .position(|t| t.id == id)
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            assignee: "Mike Rodriguez".to_string(),
            due_date: String::new(),
            time_estimate: String::new(),
            status,
            priority: Priority::Low,
            completed_at: None,
        }
    }

    fn store() -> TaskStore {
        TaskStore::from_parts(
            vec![
                task("a", TaskStatus::ToDo),
                task("b", TaskStatus::InProgress),
                task("c", TaskStatus::ToDo),
                task("d", TaskStatus::InProgress),
                task("e", TaskStatus::ToDo),
            ],
            Vec::new(),
        )
    }

    fn ids(store: &TaskStore) -> Vec<&str> {
        store.active().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_drag_over_only_previews() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "a").unwrap();
        board.drag_over(&store, &DropTarget::Column(TaskStatus::Done));
        board.drag_over(&store, &DropTarget::Task("b".to_string()));

        assert_eq!(store.get("a").unwrap().status, TaskStatus::ToDo);
        let shown: Vec<&str> = board
            .column_tasks(&store, TaskStatus::InProgress)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(shown, vec!["a", "b", "d"]);

        let outcome = board.drag_end(&mut store, None, Utc::now()).unwrap();
        assert_eq!(outcome, DragOutcome::NoOp);
        assert_eq!(store.get("a").unwrap().status, TaskStatus::ToDo);
        assert_eq!(board.drag_state(), &DragState::Idle);
    }

    #[test]
    fn test_column_drop_changes_status() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "c").unwrap();
        let outcome = board
            .drag_end(&mut store, Some(DropTarget::Column(TaskStatus::InProgress)), Utc::now())
            .unwrap();
        assert_eq!(
            outcome,
            DragOutcome::StatusChanged {
                id: "c".to_string(),
                from: TaskStatus::ToDo,
                to: TaskStatus::InProgress,
            }
        );
        assert_eq!(ids(&store), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_done_column_drop_archives() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "b").unwrap();
        let outcome = board
            .drag_end(&mut store, Some(DropTarget::Column(TaskStatus::Done)), Utc::now())
            .unwrap();
        assert_eq!(outcome, DragOutcome::Archived { id: "b".to_string() });
        assert!(store.get("b").is_none());
        assert_eq!(store.archive().len(), 1);
        assert!(store.archive()[0].completed_at.is_some());
    }

    #[test]
    fn test_same_status_task_drop_reorders() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "e").unwrap();
        let outcome = board
            .drag_end(&mut store, Some(DropTarget::Task("a".to_string())), Utc::now())
            .unwrap();
        assert_eq!(outcome, DragOutcome::Reordered { from: 4, to: 0 });
        assert_eq!(ids(&store), vec!["e", "a", "b", "c", "d"]);
    }

    #[test]
    fn test_cross_status_task_drop_reassigns_and_positions() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "a").unwrap();
        board
            .drag_end(&mut store, Some(DropTarget::Task("d".to_string())), Utc::now())
            .unwrap();
        assert_eq!(store.get("a").unwrap().status, TaskStatus::InProgress);
        assert_eq!(ids(&store), vec!["b", "c", "d", "a", "e"]);
    }

    #[test]
    fn test_drop_on_self_commits_hover() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "a").unwrap();
        board.drag_over(&store, &DropTarget::Column(TaskStatus::InProgress));
        board
            .drag_end(&mut store, Some(DropTarget::Task("a".to_string())), Utc::now())
            .unwrap();
        assert_eq!(store.get("a").unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn test_second_drag_start_is_rejected() {
        let store = store();
        let mut board = KanbanBoard::new();
        board.drag_start(&store, "a").unwrap();
        assert!(matches!(board.drag_start(&store, "b"), Err(DeckError::DragInProgress(_))));
        board.drag_cancel();
        assert!(board.drag_start(&store, "b").is_ok());
    }

    #[test]
    fn test_drag_end_without_drag_fails() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        assert!(matches!(
            board.drag_end(&mut store, None, Utc::now()),
            Err(DeckError::NotDragging)
        ));
    }

    #[test]
    fn test_keyboard_drag_across_columns() {
        let mut store = store();
        let mut board = KanbanBoard::new();
        board.move_down(&store);
        assert_eq!(board.selected(&store).unwrap().id, "c");

        board.pick_up(&store).unwrap();
        board.move_right(&store);
        assert_eq!(board.selected(&store).unwrap().id, "c");
        board.drop_here(&mut store, Utc::now()).unwrap();

        assert_eq!(store.get("c").unwrap().status, TaskStatus::InProgress);
        assert_eq!(board.selected_status, TaskStatus::InProgress.index());
        assert_eq!(board.selected(&store).unwrap().id, "c");
    }

    #[test]
    fn test_resolve_is_noop_for_unknown_task() {
        let store = store();
        let resolution = resolve(
            &store,
            "missing",
            TaskStatus::ToDo,
            TaskStatus::Done,
            Some(&DropTarget::Column(TaskStatus::Done)),
        );
        assert_eq!(resolution, Resolution::NoOp);
    }
}
