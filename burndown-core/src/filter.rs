//! Task selection: the join of milestone membership and project board items.

use std::collections::HashSet;

use crate::task::{ProjectItem, Task};

/// Title substring that marks an issue as a burndown task.
pub const DEFAULT_TASK_MARKER: &str = "[Task]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    marker: String,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_MARKER)
    }
}

impl TaskFilter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Keep board items whose issue is in the milestone and carries the marker.
    ///
    /// `items` must already be the fully drained board; output keeps its order.
    pub fn select(&self, items: &[ProjectItem], milestone_issue_numbers: &HashSet<u64>) -> Vec<Task> {
        items
            .iter()
            .filter_map(|item| {
                let issue = item.content.as_ref()?;
                let keep = milestone_issue_numbers.contains(&issue.number)
                    && issue.title.contains(&self.marker);
                keep.then(|| Task::from_parts(issue.clone(), item.field_values.clone()))
            })
            .collect()
    }
}

/// [`TaskFilter::select`] with the default `[Task]` marker.
pub fn select_tasks(items: &[ProjectItem], milestone_issue_numbers: &HashSet<u64>) -> Vec<Task> {
    TaskFilter::default().select(items, milestone_issue_numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;
    use crate::task::{IssueContent, TaskState};
    use chrono::{TimeZone, Utc};

    fn item(number: u64, title: &str) -> ProjectItem {
        ProjectItem {
            content: Some(IssueContent {
                id: format!("I_{number}"),
                number,
                title: title.to_string(),
                state: TaskState::Open,
                created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
                closed_at: None,
            }),
            field_values: vec![FieldValue::number("Story Points", number as f64)],
        }
    }

    fn note() -> ProjectItem {
        ProjectItem {
            content: None,
            field_values: vec![],
        }
    }

    #[test]
    fn test_intersection_with_marker() {
        let items = vec![
            item(9, "[Task] outside milestone"),
            item(10, "[Task] login form"),
            item(11, "[Task] logout"),
            item(12, "Bug: crash on start"),
        ];
        let milestone: HashSet<u64> = [10, 11].into_iter().collect();

        let tasks = select_tasks(&items, &milestone);
        let numbers: Vec<u64> = tasks.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![10, 11]);
    }

    #[test]
    fn test_milestone_issue_without_marker_is_dropped() {
        let items = vec![item(10, "[Task] a"), item(11, "Epic: b")];
        let milestone: HashSet<u64> = [10, 11].into_iter().collect();
        assert_eq!(select_tasks(&items, &milestone).len(), 1);
    }

    #[test]
    fn test_items_without_content_are_skipped() {
        let items = vec![note(), item(10, "[Task] a"), note()];
        let milestone: HashSet<u64> = [10].into_iter().collect();
        let tasks = select_tasks(&items, &milestone);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].field_values.len(), 1);
    }

    #[test]
    fn test_preserves_board_order() {
        let items = vec![item(11, "[Task] b"), item(3, "[Task] c"), item(10, "[Task] a")];
        let milestone: HashSet<u64> = [3, 10, 11].into_iter().collect();
        let numbers: Vec<u64> = select_tasks(&items, &milestone).iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![11, 3, 10]);
    }

    #[test]
    fn test_custom_marker() {
        let items = vec![item(10, "[Story] a"), item(11, "[Task] b")];
        let milestone: HashSet<u64> = [10, 11].into_iter().collect();
        let tasks = TaskFilter::new("[Story]").select(&items, &milestone);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].number, 10);
    }
}
