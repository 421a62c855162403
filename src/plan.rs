//! Goal-to-plan templates
//!
//! A goal is classified by keyword into one of three fixed templates. The
//! first category whose keyword appears in the goal (case-insensitive) wins;
//! anything else gets the generic plan.

use tracing::debug;

use crate::task::{generate_id, Priority, Task, TaskStatus};

/// Which template a goal maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCategory {
    Software,
    Marketing,
    Generic,
}

const CATEGORY_KEYWORDS: &[(PlanCategory, &[&str])] = &[
    (PlanCategory::Software, &["app", "software", "platform"]),
    (PlanCategory::Marketing, &["marketing", "campaign", "brand"]),
];

struct TemplateTask {
    title: &'static str,
    description: &'static str,
    assignee: &'static str,
    due_date: &'static str,
    time_estimate: &'static str,
    priority: Priority,
}

const SOFTWARE_TEMPLATE: &[TemplateTask] = &[
    TemplateTask {
        title: "Define requirements and user stories",
        description: "Interview stakeholders and capture the core user journeys",
        assignee: "Sarah Chen",
        due_date: "Today",
        time_estimate: "2 days",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Design system architecture",
        description: "Choose the stack and sketch components, data model and APIs",
        assignee: "Alex Johnson",
        due_date: "Tomorrow",
        time_estimate: "3 days",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Build core features",
        description: "Implement the MVP feature set behind the agreed interfaces",
        assignee: "Mike Rodriguez",
        due_date: "Next week",
        time_estimate: "2 weeks",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Write automated tests",
        description: "Cover the critical paths with unit and integration tests",
        assignee: "Emma Davis",
        due_date: "Next week",
        time_estimate: "1 week",
        priority: Priority::Medium,
    },
    TemplateTask {
        title: "Deploy and monitor release",
        description: "Ship to production and watch error rates and usage",
        assignee: "Alex Johnson",
        due_date: "Next month",
        time_estimate: "3 days",
        priority: Priority::Medium,
    },
];

const MARKETING_TEMPLATE: &[TemplateTask] = &[
    TemplateTask {
        title: "Research target audience",
        description: "Segment customers and collect competitor positioning",
        assignee: "Sarah Chen",
        due_date: "Today",
        time_estimate: "3 days",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Craft brand messaging",
        description: "Write the value proposition, tone guide and key messages",
        assignee: "Emma Davis",
        due_date: "Tomorrow",
        time_estimate: "1 week",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Produce campaign content",
        description: "Create copy, visuals and landing pages for each channel",
        assignee: "Mike Rodriguez",
        due_date: "Next week",
        time_estimate: "2 weeks",
        priority: Priority::Medium,
    },
    TemplateTask {
        title: "Launch and measure campaign",
        description: "Go live across channels and report on conversion",
        assignee: "Alex Johnson",
        due_date: "Next month",
        time_estimate: "1 week",
        priority: Priority::Medium,
    },
];

const GENERIC_TEMPLATE: &[TemplateTask] = &[
    TemplateTask {
        title: "Clarify the goal and success criteria",
        description: "Write down what done looks like and how it will be measured",
        assignee: "Sarah Chen",
        due_date: "Today",
        time_estimate: "1 day",
        priority: Priority::High,
    },
    TemplateTask {
        title: "Break the work into milestones",
        description: "Split the goal into a few deliverable checkpoints",
        assignee: "Alex Johnson",
        due_date: "Tomorrow",
        time_estimate: "2 days",
        priority: Priority::Medium,
    },
    TemplateTask {
        title: "Execute the first milestone",
        description: "Deliver the first checkpoint end to end",
        assignee: "Mike Rodriguez",
        due_date: "Next week",
        time_estimate: "1 week",
        priority: Priority::Medium,
    },
    TemplateTask {
        title: "Review progress and adjust",
        description: "Compare results with the success criteria and replan",
        assignee: "Emma Davis",
        due_date: "Next month",
        time_estimate: "1 day",
        priority: Priority::Low,
    },
];

impl PlanCategory {
    /// Classify a goal by keyword
    pub fn classify(goal: &str) -> Self {
        let goal = goal.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| goal.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(PlanCategory::Generic)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Software => "Software",
            Self::Marketing => "Marketing",
            Self::Generic => "Generic",
        }
    }

    fn template(self) -> &'static [TemplateTask] {
        match self {
            Self::Software => SOFTWARE_TEMPLATE,
            Self::Marketing => MARKETING_TEMPLATE,
            Self::Generic => GENERIC_TEMPLATE,
        }
    }
}

/// Generate the task list for a goal. Blank goals produce nothing.
pub fn generate_plan(goal: &str) -> Option<Vec<Task>> {
    if goal.trim().is_empty() {
        return None;
    }
    let category = PlanCategory::classify(goal);
    debug!(?category, goal, "generate_plan: selected template");

    let tasks = category
        .template()
        .iter()
        .map(|t| Task {
            id: generate_id(),
            title: t.title.to_string(),
            description: t.description.to_string(),
            assignee: t.assignee.to_string(),
            due_date: t.due_date.to_string(),
            time_estimate: t.time_estimate.to_string(),
            status: TaskStatus::ToDo,
            priority: t.priority,
            completed_at: None,
        })
        .collect();
    Some(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_app_goal_yields_software_template() {
        let plan = generate_plan("Launch a mobile App for runners").unwrap();
        let titles: Vec<&str> = plan.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Define requirements and user stories",
                "Design system architecture",
                "Build core features",
                "Write automated tests",
                "Deploy and monitor release",
            ]
        );
        let assignees: Vec<&str> = plan.iter().map(|t| t.assignee.as_str()).collect();
        assert_eq!(
            assignees,
            vec!["Sarah Chen", "Alex Johnson", "Mike Rodriguez", "Emma Davis", "Alex Johnson"]
        );
        let priorities: Vec<Priority> = plan.iter().map(|t| t.priority).collect();
        assert_eq!(
            priorities,
            vec![Priority::High, Priority::High, Priority::High, Priority::Medium, Priority::Medium]
        );
        assert!(plan.iter().all(|t| t.status == TaskStatus::ToDo && t.completed_at.is_none()));
    }

    #[test]
    fn test_first_matching_category_wins() {
        assert_eq!(PlanCategory::classify("Marketing platform relaunch"), PlanCategory::Software);
        assert_eq!(PlanCategory::classify("Spring BRAND refresh"), PlanCategory::Marketing);
        assert_eq!(PlanCategory::classify("Run a half marathon"), PlanCategory::Generic);
    }

    #[test]
    fn test_template_sizes() {
        assert_eq!(generate_plan("new software").unwrap().len(), 5);
        assert_eq!(generate_plan("email campaign").unwrap().len(), 4);
        assert_eq!(generate_plan("renovate the kitchen").unwrap().len(), 4);
    }

    #[test]
    fn test_blank_goal_generates_nothing() {
        assert!(generate_plan("").is_none());
        assert!(generate_plan("   \n\t").is_none());
    }

    #[test]
    fn test_every_generation_gets_fresh_ids() {
        let first = generate_plan("app").unwrap();
        let second = generate_plan("app").unwrap();
        let ids: HashSet<&str> = first.iter().chain(second.iter()).map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), first.len() + second.len());
    }

    #[test]
    fn test_template_tasks_are_fully_populated() {
        for goal in ["app", "campaign", "garden"] {
            for task in generate_plan(goal).unwrap() {
                assert!(!task.title.is_empty());
                assert!(!task.description.is_empty());
                assert!(!task.assignee.is_empty());
                assert!(!task.due_date.is_empty());
                assert!(!task.time_estimate.is_empty());
            }
        }
    }
}
