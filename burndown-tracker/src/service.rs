//! Burndown pipeline: independent fetches → task join → sprint resolution → compute.

use burndown_core::{
    BurndownChart, BurndownComputer, BurndownError, FieldSchema, Iteration, LookupKind,
    ProjectItem, RequestConfig, Result, SprintSummary, Task, TaskFilter, current_sprint,
    iterations_from_tasks, list_sprints, resolve_sprint_range,
};
use burndown_ingest::parsers::graphql::field_kind_label;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::client::Tracker;

pub struct BurndownService<T: Tracker> {
    tracker: T,
}

impl<T: Tracker> BurndownService<T> {
    pub fn new(tracker: T) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Every item on the board, draining `hasNextPage`/`endCursor`.
    pub async fn project_items(&self, project_id: &str) -> Result<Vec<ProjectItem>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .tracker
                .project_items_page(project_id, cursor.as_deref())
                .await?;
            debug!(
                project_id,
                after = cursor.as_deref().unwrap_or("-"),
                n = page.items.len(),
                "project items page"
            );
            items.extend(page.items);

            if !page.has_next_page {
                break;
            }
            cursor = match page.end_cursor {
                Some(c) => Some(c),
                None => {
                    return Err(BurndownError::malformed(
                        "project items: hasNextPage without endCursor",
                    ));
                }
            };
        }
        Ok(items)
    }

    async fn milestone_issues(&self, cfg: &RequestConfig) -> Result<HashSet<u64>> {
        let number = self.tracker.milestone_number(&cfg.milestone).await?;
        let issues = self.tracker.milestone_issue_numbers(number).await?;
        info!(milestone = %cfg.milestone, number, issues = issues.len(), "milestone issues");
        Ok(issues)
    }

    async fn project_snapshot(&self, cfg: &RequestConfig) -> Result<(FieldSchema, Vec<ProjectItem>)> {
        let project_id = self.tracker.project_id(&cfg.project).await?;
        let schema = self.tracker.field_schema(&project_id).await?;
        for field in schema.iter() {
            debug!(
                name = %field.name,
                kind = field_kind_label(field.kind),
                options = ?field.options,
                "custom field"
            );
        }
        let items = self.project_items(&project_id).await?;
        info!(project = %cfg.project, items = items.len(), fields = schema.len(), "project items");
        Ok((schema, items))
    }

    /// Tasks in both the milestone and the project, with the project's field schema.
    pub async fn fetch_tasks(&self, cfg: &RequestConfig) -> Result<(Vec<Task>, FieldSchema)> {
        let (milestone_issues, (schema, items)) =
            tokio::try_join!(self.milestone_issues(cfg), self.project_snapshot(cfg))?;

        let tasks = TaskFilter::new(cfg.task_marker.as_str()).select(&items, &milestone_issues);
        info!(tasks = tasks.len(), marker = %cfg.task_marker, "selected tasks");
        Ok((tasks, schema))
    }

    /// Chart for the configured sprint, or the one running on `today`.
    pub async fn chart(&self, cfg: &RequestConfig, today: NaiveDate) -> Result<BurndownChart> {
        let (tasks, schema) = self.fetch_tasks(cfg).await?;
        if tasks.is_empty() {
            return Err(BurndownError::NoTasksFound {
                milestone: cfg.milestone.clone(),
                project: cfg.project.clone(),
            });
        }

        let known = schema.sprint_iterations(cfg.iteration_field.as_deref());
        let sprint_name = match &cfg.sprint {
            Some(name) => name.clone(),
            None => {
                let candidates = sprint_candidates(known, &tasks);
                current_sprint(&candidates, today)
                    .map(|it| it.title.clone())
                    .ok_or_else(|| BurndownError::not_found(LookupKind::Sprint, "current sprint"))?
            }
        };

        let range = resolve_sprint_range(&sprint_name, known, Some(&tasks))?;
        info!(
            sprint = %sprint_name,
            start = %range.start,
            end = %range.end,
            policy = %cfg.policy,
            "computing burndown"
        );

        let chart = BurndownComputer::new(cfg.policy)
            .for_scope(cfg.milestone.as_str(), cfg.project.as_str())
            .compute(&tasks, &schema, range.start, range.end)?;
        Ok(BurndownChart::new(chart))
    }

    /// Sprints of the project's iteration field with status as of `today`.
    pub async fn sprints(&self, cfg: &RequestConfig, today: NaiveDate) -> Result<Vec<SprintSummary>> {
        let project_id = self.tracker.project_id(&cfg.project).await?;
        let schema = self.tracker.field_schema(&project_id).await?;
        let iterations = schema
            .sprint_iterations(cfg.iteration_field.as_deref())
            .ok_or_else(|| {
                BurndownError::not_found(
                    LookupKind::CustomField,
                    cfg.iteration_field.as_deref().unwrap_or("iteration field"),
                )
            })?;
        Ok(list_sprints(iterations, today))
    }
}

fn sprint_candidates(known: Option<&[Iteration]>, tasks: &[Task]) -> Vec<Iteration> {
    match known {
        Some(its) if !its.is_empty() => its.to_vec(),
        _ => iterations_from_tasks(tasks),
    }
}
