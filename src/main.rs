//! Command Deck - terminal kanban board
//!
//! CLI entry point: opens the interactive board or runs one store operation.

use std::fs;

use chrono::{Local, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use deck::cli::{Cli, Command};
use deck::config::Config;
use deck::storage::{self, FileStorage};
use deck::store::TaskStore;
use deck::task::{Task, TaskStatus};
use deck::ui::{self, App};
use deck::{generate_plan, views, PlanCategory};

fn setup_logging(config: &Config, cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = config.log_dir();
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config.log_level.as_deref()) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("command-deck.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }

    setup_logging(&config, cli.log_level.as_deref()).context("Failed to setup logging")?;
    info!(data_dir = %config.data_dir.display(), "command-deck starting");

    let mut files = FileStorage::open(&config.data_dir).context("Failed to open data directory")?;
    let mut store = storage::load(&mut files).context("Failed to load tasks")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or(Command::Board) {
        Command::Board => {
            let mut app = App::new(store, files, config);
            ui::run(&mut app).context("Board exited with an error")?;
        }
        Command::Plan { goal, accept } => {
            let goal = goal.join(" ");
            let Some(tasks) = generate_plan(&goal) else {
                println!("Describe a goal to generate a plan.");
                return Ok(());
            };
            println!(
                "{} plan for {}",
                PlanCategory::classify(&goal).label().cyan(),
                goal.bold()
            );
            for (i, task) in tasks.iter().enumerate() {
                println!(
                    "  {}. {} {}",
                    i + 1,
                    task.title,
                    format!(
                        "({} | {} | {} | {} priority)",
                        task.assignee, task.due_date, task.time_estimate, task.priority
                    )
                    .dimmed()
                );
            }
            if accept {
                let count = store.merge_plan(tasks)?;
                storage::persist(&store, &mut files)?;
                println!("{} Added {} tasks", "✓".green(), count);
            }
        }
        Command::Add { fields } => {
            let task = store.add(fields.into_new_task())?;
            storage::persist(&store, &mut files)?;
            println!("{} Added {}: {}", "✓".green(), task.id.cyan(), task.title);
        }
        Command::List { status } => {
            let statuses: Vec<TaskStatus> = match status {
                Some(s) => vec![s],
                None => TaskStatus::ALL.to_vec(),
            };
            for status in statuses {
                let tasks = store.tasks_with_status(status);
                println!("{} ({})", status.label().bold(), tasks.len());
                for task in tasks {
                    print_task_line(task);
                }
            }
        }
        Command::Show { id } => {
            let task = store
                .get(&id)
                .or_else(|| store.get_archived(&id))
                .ok_or_else(|| eyre::eyre!("Task not found: {}", id))?;
            print_task_details(task);
        }
        Command::Edit { id, fields } => {
            let (edit, status) = fields.into_edit();
            if !edit.is_empty() {
                store.edit(&id, edit)?;
            }
            if let Some(status) = status {
                store.set_status(&id, status)?;
            }
            storage::persist(&store, &mut files)?;
            println!("{} Updated {}", "✓".green(), id.cyan());
        }
        Command::Move { id, status } => {
            store.set_status(&id, status)?;
            storage::persist(&store, &mut files)?;
            if status == TaskStatus::Done {
                println!("{} Completed {}", "✓".green(), id.cyan());
            } else {
                println!("{} Moved {} to {}", "✓".green(), id.cyan(), status);
            }
        }
        Command::Reorder { from, to } => {
            store.reorder(from, to)?;
            storage::persist(&store, &mut files)?;
            println!("{} Moved task at {} to {}", "✓".green(), from, to);
        }
        Command::Delete { id } => {
            let task = store.delete(&id)?;
            storage::persist(&store, &mut files)?;
            println!("{} Deleted {}", "✓".green(), task.title);
        }
        Command::History => print_history(&store),
        Command::Restore { id } => {
            let title = store.restore(&id)?.title.clone();
            storage::persist(&store, &mut files)?;
            println!("{} Restored {} to To Do", "✓".green(), title);
        }
        Command::ClearHistory => {
            let count = store.clear_history();
            storage::persist(&store, &mut files)?;
            println!("{} Cleared {} completed tasks", "✓".green(), count);
        }
        Command::Timeline => {
            let today = Local::now().date_naive();
            for entry in views::timeline(store.active(), today) {
                let when = entry.date.format("%Y-%m-%d").to_string();
                let note = if entry.parsed {
                    String::new()
                } else {
                    format!(" (\"{}\")", entry.task.due_date)
                };
                println!("{}{} {}", when.yellow(), note.dimmed(), entry.task.title);
            }
        }
        Command::Table => {
            println!("{:<40} {:<18} {:<12} {}", "Task".bold(), "Assignee".bold(), "Status".bold(), "Due Date".bold());
            for row in views::table_rows(store.active()) {
                println!("{:<40} {:<18} {:<12} {}", row.title, row.assignee, row.status.label(), row.due_date);
            }
        }
        Command::Workload => {
            for member in views::team_workload(store.active(), &config.team, config.member_capacity) {
                let band = match member.band {
                    views::WorkloadBand::Underloaded => member.band.label().blue(),
                    views::WorkloadBand::Balanced => member.band.label().green(),
                    views::WorkloadBand::Overloaded => member.band.label().red(),
                };
                println!(
                    "{:<18} {:>3}% {} ({} open)",
                    member.name, member.percent, band, member.open_tasks
                );
            }
        }
    }

    Ok(())
}

fn print_task_line(task: &Task) {
    println!(
        "  {} {} {}",
        task.id.dimmed(),
        task.title,
        format!("[{} | {} | {}]", task.assignee, task.priority, task.due_date).dimmed()
    );
}

fn print_task_details(task: &Task) {
    println!("{}", task.title.bold());
    println!("  ID:          {}", task.id);
    println!("  Status:      {}", task.status);
    println!("  Priority:    {}", task.priority);
    println!("  Assignee:    {}", task.assignee);
    println!("  Due:         {}", task.due_date);
    println!("  Estimate:    {}", task.time_estimate);
    if let Some(completed) = task.completed_at {
        println!("  Completed:   {}", completed.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
}

fn print_history(store: &TaskStore) {
    let archive = store.archive();
    println!("{} ({} Completed)", "Task History".bold(), archive.len());
    if archive.is_empty() {
        println!("No completed tasks yet");
        return;
    }
    let now = Utc::now();
    for task in archive {
        let age = task
            .completed_at
            .map(|c| format!("{}d ago", (now - c).num_days()))
            .unwrap_or_default();
        print_task_line(task);
        println!("    {} {}", "completed".green(), age.dimmed());
    }
}
