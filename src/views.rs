//! View models for the board, timeline, table, history and workload screens
//!
//! Everything here is a pure function of the store. Rendering lives in `ui`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{Days, Months, NaiveDate};

use crate::task::{Task, TaskStatus};

/// Offset used when a due date cannot be understood
pub const DEFAULT_DUE_OFFSET_DAYS: u64 = 7;

/// Secondary line shown on a board card
pub fn card_subtitle(task: &Task, status: TaskStatus) -> String {
    match status {
        TaskStatus::ToDo => format!("{} priority | {}", task.priority, task.assignee),
        TaskStatus::InProgress => format!("{} | Due: {}", task.assignee, task.due_date),
        TaskStatus::Done => format!("Completed | {}", task.assignee),
    }
}

/// Interpret free-text due dates relative to `today`.
///
/// Returns `None` when the text is not understood.
pub fn parse_due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().to_lowercase();
    match text.as_str() {
        "" => return None,
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "next week" => return today.checked_add_days(Days::new(7)),
        "next month" => return today.checked_add_months(Months::new(1)),
        _ => {}
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return Some(date);
        }
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let words = match words.as_slice() {
        ["in", rest @ ..] => rest,
        all => all,
    };
    if let [count, unit] = words {
        let count: u64 = count.parse().ok()?;
        return match unit.trim_end_matches('s') {
            "day" => today.checked_add_days(Days::new(count)),
            "week" => today.checked_add_days(Days::new(count.checked_mul(7)?)),
            "month" => today.checked_add_months(Months::new(u32::try_from(count).ok()?)),
            _ => None,
        };
    }
    None
}

/// Due date for timeline placement, falling back to a week out
pub fn resolve_due_date(text: &str, today: NaiveDate) -> NaiveDate {
    parse_due_date(text, today)
        .or_else(|| today.checked_add_days(Days::new(DEFAULT_DUE_OFFSET_DAYS)))
        .unwrap_or(today)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry<'a> {
    pub task: &'a Task,
    pub date: NaiveDate,
    /// False when the date is the fallback offset
    pub parsed: bool,
}

/// Active tasks ordered by due date; ties keep board order
pub fn timeline(tasks: &[Task], today: NaiveDate) -> Vec<TimelineEntry<'_>> {
    let mut entries: Vec<TimelineEntry<'_>> = tasks
        .iter()
        .map(|task| {
            let parsed = parse_due_date(&task.due_date, today);
            TimelineEntry {
                task,
                date: parsed.unwrap_or_else(|| resolve_due_date(&task.due_date, today)),
                parsed: parsed.is_some(),
            }
        })
        .collect();
    entries.sort_by_key(|e| e.date);
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub title: String,
    pub assignee: String,
    pub status: TaskStatus,
    pub due_date: String,
}

pub fn table_rows(tasks: &[Task]) -> Vec<TableRow> {
    tasks
        .iter()
        .map(|t| TableRow {
            id: t.id.clone(),
            title: t.title.clone(),
            assignee: t.assignee.clone(),
            status: t.status,
            due_date: t.due_date.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadBand {
    Underloaded,
    Balanced,
    Overloaded,
}

impl WorkloadBand {
    pub fn from_percent(percent: u32) -> Self {
        if percent < 50 {
            Self::Underloaded
        } else if percent <= 80 {
            Self::Balanced
        } else {
            Self::Overloaded
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Underloaded => "Underloaded",
            Self::Balanced => "Balanced",
            Self::Overloaded => "Overloaded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberWorkload {
    pub name: String,
    pub open_tasks: usize,
    pub percent: u32,
    pub band: WorkloadBand,
}

/// Open-task load per person against `capacity` tasks each.
///
/// Team members come first in roster order, then any other assignees
/// alphabetically.
pub fn team_workload(tasks: &[Task], team: &[String], capacity: usize) -> Vec<MemberWorkload> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in tasks.iter().filter(|t| t.status != TaskStatus::Done) {
        let name = task.assignee.trim();
        if !name.is_empty() {
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut names: Vec<String> = team.to_vec();
    let mut extra: Vec<String> = counts
        .keys()
        .filter(|name| !team.iter().any(|m| m == *name))
        .map(|name| name.to_string())
        .collect();
    extra.sort();
    names.extend(extra);

    names
        .into_iter()
        .map(|name| {
            let open_tasks = counts.get(name.as_str()).copied().unwrap_or(0);
            let percent = if capacity == 0 {
                100
            } else {
                ((open_tasks * 100) / capacity).min(100) as u32
            };
            MemberWorkload {
                name,
                open_tasks,
                percent,
                band: WorkloadBand::from_percent(percent),
            }
        })
        .collect()
}

/// Completed tasks kept on screen briefly before they disappear
#[derive(Debug, Default)]
pub struct RemovalQueue {
    entries: Vec<(Task, Instant)>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task, delay: Duration, now: Instant) {
        self.entries.retain(|(t, _)| t.id != task.id);
        self.entries.push((task, now + delay));
    }

    /// Drop expired entries; returns true if anything was removed
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, deadline)| *deadline > now);
        self.entries.len() != before
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter().map(|(t, _)| t)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|(_, d)| *d).min()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, assignee: &str, due: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            assignee: assignee.to_string(),
            due_date: due.to_string(),
            time_estimate: String::new(),
            status,
            priority: Priority::High,
            completed_at: None,
        }
    }

    #[test]
    fn test_parse_relative_due_dates() {
        let today = date(2024, 1, 31);
        assert_eq!(parse_due_date("Today", today), Some(today));
        assert_eq!(parse_due_date("tomorrow", today), Some(date(2024, 2, 1)));
        assert_eq!(parse_due_date("Next week", today), Some(date(2024, 2, 7)));
        assert_eq!(parse_due_date("next month", today), Some(date(2024, 2, 29)));
        assert_eq!(parse_due_date("in 3 days", today), Some(date(2024, 2, 3)));
        assert_eq!(parse_due_date("2 weeks", today), Some(date(2024, 2, 14)));
    }

    #[test]
    fn test_parse_absolute_due_dates() {
        let today = date(2024, 1, 1);
        assert_eq!(parse_due_date("2024-03-15", today), Some(date(2024, 3, 15)));
        assert_eq!(parse_due_date("03/15/2024", today), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_unparseable_due_date_falls_back_to_next_week() {
        let today = date(2024, 5, 10);
        assert_eq!(parse_due_date("whenever", today), None);
        assert_eq!(resolve_due_date("whenever", today), date(2024, 5, 17));
        assert_eq!(resolve_due_date("", today), date(2024, 5, 17));
    }

    #[test]
    fn test_huge_relative_counts_fall_back() {
        let today = date(2024, 1, 1);
        assert_eq!(parse_due_date("3000000000000000000 weeks", today), None);
        assert_eq!(parse_due_date("in 3000000000000000000 days", today), None);
        assert_eq!(resolve_due_date("3000000000000000000 weeks", today), date(2024, 1, 8));
    }

    #[test]
    fn test_timeline_sorts_by_date_and_keeps_text() {
        let today = date(2024, 5, 10);
        let tasks = vec![
            task("later", "A", "someday", TaskStatus::ToDo),
            task("now", "A", "Today", TaskStatus::InProgress),
            task("soon", "A", "tomorrow", TaskStatus::ToDo),
        ];
        let entries = timeline(&tasks, today);
        let order: Vec<&str> = entries.iter().map(|e| e.task.id.as_str()).collect();
        assert_eq!(order, vec!["now", "soon", "later"]);
        assert!(!entries[2].parsed);
        assert_eq!(entries[2].task.due_date, "someday");
    }

    #[test]
    fn test_card_subtitles() {
        let t = task("x", "Emma Davis", "Friday", TaskStatus::ToDo);
        assert_eq!(card_subtitle(&t, TaskStatus::ToDo), "High priority | Emma Davis");
        assert_eq!(card_subtitle(&t, TaskStatus::InProgress), "Emma Davis | Due: Friday");
        assert_eq!(card_subtitle(&t, TaskStatus::Done), "Completed | Emma Davis");
    }

    #[test]
    fn test_team_workload_bands() {
        let team = vec!["Sarah Chen".to_string(), "Alex Johnson".to_string()];
        let tasks = vec![
            task("1", "Sarah Chen", "", TaskStatus::ToDo),
            task("2", "Sarah Chen", "", TaskStatus::InProgress),
            task("3", "Sarah Chen", "", TaskStatus::ToDo),
            task("4", "Sarah Chen", "", TaskStatus::ToDo),
            task("5", "Zoe Park", "", TaskStatus::ToDo),
            task("6", "Alex Johnson", "", TaskStatus::Done),
        ];
        let load = team_workload(&tasks, &team, 4);
        assert_eq!(load.len(), 3);
        assert_eq!(load[0].name, "Sarah Chen");
        assert_eq!(load[0].percent, 100);
        assert_eq!(load[0].band, WorkloadBand::Overloaded);
        assert_eq!(load[1].open_tasks, 0);
        assert_eq!(load[1].band, WorkloadBand::Underloaded);
        assert_eq!(load[2].name, "Zoe Park");
        assert_eq!(load[2].percent, 25);
    }

    #[test]
    fn test_removal_queue_expires_after_delay() {
        let mut queue = RemovalQueue::new();
        let start = Instant::now();
        queue.push(task("x", "A", "", TaskStatus::Done), Duration::from_millis(300), start);

        assert!(!queue.expire(start + Duration::from_millis(100)));
        assert_eq!(queue.tasks().count(), 1);
        assert!(queue.expire(start + Duration::from_millis(300)));
        assert!(queue.is_empty());
    }
}
