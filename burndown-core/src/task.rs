//! Issue-like work items as they come off the project board.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BurndownError;
use crate::fields::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Open,
    Closed,
}

impl FromStr for TaskState {
    type Err = BurndownError;

    /// Case-insensitive: the REST and GraphQL APIs disagree on casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(TaskState::Open),
            "CLOSED" => Ok(TaskState::Closed),
            other => Err(BurndownError::malformed(format!("unknown issue state: {other}"))),
        }
    }
}

/// The linked issue behind a board item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueContent {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    /// Only present when state = CLOSED.
    pub closed_at: Option<DateTime<Utc>>,
}

/// One entry on the project board. Notes and drafts carry no issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub content: Option<IssueContent>,
    pub field_values: Vec<FieldValue>,
}

/// A work item counted by the burndown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// One per custom field attached on the board, in board order.
    pub field_values: Vec<FieldValue>,
}

impl Task {
    pub fn new(number: u64, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("I_{number}"),
            number,
            title: title.into(),
            state: TaskState::Open,
            created_at,
            closed_at: None,
            field_values: Vec::new(),
        }
    }

    pub fn from_parts(issue: IssueContent, field_values: Vec<FieldValue>) -> Self {
        Self {
            id: issue.id,
            number: issue.number,
            title: issue.title,
            state: issue.state,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            field_values,
        }
    }

    pub fn closed(mut self, closed_at: DateTime<Utc>) -> Self {
        self.state = TaskState::Closed;
        self.closed_at = Some(closed_at);
        self
    }

    pub fn with_field(mut self, value: FieldValue) -> Self {
        self.field_values.push(value);
        self
    }

    /// UTC date the task was closed, if it is closed.
    pub fn closed_on(&self) -> Option<NaiveDate> {
        match self.state {
            TaskState::Closed => self.closed_at.map(|t| t.date_naive()),
            TaskState::Open => None,
        }
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_closed_by(&self, day: NaiveDate) -> bool {
        self.closed_on().is_some_and(|closed| closed <= day)
    }

    pub fn is_created_by(&self, day: NaiveDate) -> bool {
        self.created_on() <= day
    }
}
