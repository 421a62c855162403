//! CLI argument parsing for command-deck

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::task::{NewTask, Priority, TaskEdit, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about = "Terminal kanban board with goal-based plans", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Fields shared by `add` and `edit`
#[derive(clap::Args, Debug, Default)]
pub struct TaskFields {
    /// Task title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Longer description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Person responsible
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Due date (e.g. "Tomorrow", "Next week", 2024-06-01)
    #[arg(long)]
    pub due: Option<String>,

    /// Time estimate (e.g. "2 days")
    #[arg(short, long)]
    pub estimate: Option<String>,

    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Status (todo, in-progress, done)
    #[arg(short, long)]
    pub status: Option<TaskStatus>,
}

impl TaskFields {
    pub fn into_new_task(self) -> NewTask {
        NewTask {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            assignee: self.assignee.unwrap_or_default(),
            due_date: self.due.unwrap_or_default(),
            time_estimate: self.estimate.unwrap_or_default(),
            status: self.status,
            priority: self.priority.unwrap_or_default(),
        }
    }

    /// Split into the field edit and the optional status change
    pub fn into_edit(self) -> (TaskEdit, Option<TaskStatus>) {
        let edit = TaskEdit {
            title: self.title,
            description: self.description,
            assignee: self.assignee,
            due_date: self.due,
            time_estimate: self.estimate,
            priority: self.priority,
        };
        (edit, self.status)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive board (default)
    Board,

    /// Generate a plan from a goal
    Plan {
        /// Goal description
        #[arg(required = true)]
        goal: Vec<String>,

        /// Add the generated tasks to the board
        #[arg(long)]
        accept: bool,
    },

    /// Add a task
    Add {
        #[command(flatten)]
        fields: TaskFields,
    },

    /// List active tasks
    List {
        /// Only show tasks with this status
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },

    /// Show one task in full
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// Edit task fields
    Edit {
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Change a task's status (done archives it)
    Move {
        #[arg(required = true)]
        id: String,

        #[arg(required = true)]
        status: TaskStatus,
    },

    /// Move the task at one board position to another
    Reorder {
        #[arg(required = true)]
        from: usize,

        #[arg(required = true)]
        to: usize,
    },

    /// Delete an active task
    Delete {
        #[arg(required = true)]
        id: String,
    },

    /// List completed tasks
    History,

    /// Move a completed task back to To Do
    Restore {
        #[arg(required = true)]
        id: String,
    },

    /// Remove every completed task from history
    ClearHistory,

    /// Show active tasks ordered by due date
    Timeline,

    /// Show active tasks as a table
    Table,

    /// Show open tasks per team member
    Workload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from(["deck", "move", "task-1", "in-progress"]).unwrap();
        match cli.command {
            Some(Command::Move { id, status }) => {
                assert_eq!(id, "task-1");
                assert_eq!(status, TaskStatus::InProgress);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_fields() {
        let cli = Cli::try_parse_from([
            "deck", "add", "--title", "Write README", "--assignee", "Emma Davis", "--priority", "high",
        ])
        .unwrap();
        let Some(Command::Add { fields }) = cli.command else {
            panic!("expected add");
        };
        let new_task = fields.into_new_task();
        assert_eq!(new_task.title, "Write README");
        assert_eq!(new_task.priority, Priority::High);
        assert!(new_task.status.is_none());
    }

    #[test]
    fn test_no_subcommand_means_board() {
        let cli = Cli::try_parse_from(["deck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        assert!(Cli::try_parse_from(["deck", "list", "--status", "blocked"]).is_err());
    }
}
