//! Sprint calendar: date ranges and status for iteration-field sprints.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{BurndownError, LookupKind, Result};
use crate::fields::{FieldValueKind, Iteration};
use crate::task::Task;

/// Inclusive `[start, end]` date range of a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SprintRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `(end - start).days + 1`; zero or negative means an inverted range.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.total_days().max(0)).map(move |i| self.start + Duration::days(i))
    }
}

impl From<&Iteration> for SprintRange {
    fn from(it: &Iteration) -> Self {
        SprintRange::new(it.start_date, it.end_date())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Planned,
    Current,
    Closed,
}

impl SprintStatus {
    /// Classify a range against `today`. Never cached: callers pass the
    /// wall-clock date of the listing they are serving.
    pub fn classify(range: SprintRange, today: NaiveDate) -> Self {
        if range.end < today {
            SprintStatus::Closed
        } else if range.start > today {
            SprintStatus::Planned
        } else {
            SprintStatus::Current
        }
    }
}

/// Row of the sprint listing handed to UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintSummary {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SprintStatus,
}

/// Resolve a sprint's date range by title.
///
/// `known_sprints` wins when non-empty. Otherwise every task's iteration
/// field values are scanned and the end date comes from the value itself.
pub fn resolve_sprint_range(
    sprint_name: &str,
    known_sprints: Option<&[Iteration]>,
    fallback_tasks: Option<&[Task]>,
) -> Result<SprintRange> {
    match known_sprints {
        Some(sprints) if !sprints.is_empty() => sprints
            .iter()
            .find(|it| it.title == sprint_name)
            .map(SprintRange::from)
            .ok_or_else(|| BurndownError::not_found(LookupKind::Sprint, sprint_name)),
        _ => fallback_tasks
            .unwrap_or_default()
            .iter()
            .flat_map(|t| t.field_values.iter())
            .find_map(|v| match &v.kind {
                FieldValueKind::Iteration {
                    title,
                    start_date,
                    duration_days,
                } if title == sprint_name => {
                    Some(SprintRange::from(&Iteration::new(title.clone(), *start_date, *duration_days)))
                }
                _ => None,
            })
            .ok_or_else(|| BurndownError::not_found(LookupKind::Sprint, sprint_name)),
    }
}

/// Distinct iterations referenced by task field values, first occurrence wins.
///
/// Stands in for the schema's iteration list when the project exposes none.
pub fn iterations_from_tasks(tasks: &[Task]) -> Vec<Iteration> {
    let mut out: Vec<Iteration> = Vec::new();
    for v in tasks.iter().flat_map(|t| t.field_values.iter()) {
        if let FieldValueKind::Iteration {
            title,
            start_date,
            duration_days,
        } = &v.kind
        {
            if !out.iter().any(|it| &it.title == title) {
                out.push(Iteration::new(title.clone(), *start_date, *duration_days));
            }
        }
    }
    out
}

/// All sprints with their status as of `today`, in schema order.
pub fn list_sprints(iterations: &[Iteration], today: NaiveDate) -> Vec<SprintSummary> {
    iterations
        .iter()
        .map(|it| {
            let range = SprintRange::from(it);
            SprintSummary {
                title: it.title.clone(),
                start_date: range.start,
                end_date: range.end,
                status: SprintStatus::classify(range, today),
            }
        })
        .collect()
}

/// The sprint running on `today`, if any.
pub fn current_sprint(iterations: &[Iteration], today: NaiveDate) -> Option<&Iteration> {
    iterations
        .iter()
        .find(|it| SprintStatus::classify(SprintRange::from(*it), today) == SprintStatus::Current)
}
