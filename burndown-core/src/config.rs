//! Request-scoped configuration.
//!
//! A `RequestConfig` is built once per request (defaults + overrides) and then
//! only borrowed. Nothing here is global or mutable after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::burndown::BurndownPolicy;
use crate::error::{BurndownError, Result};
use crate::filter::DEFAULT_TASK_MARKER;

pub const DEFAULT_MILESTONE: &str = "Milestone I";
pub const DEFAULT_PROJECT: &str = "Dashboard Project";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Repository identifier, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(BurndownError::InvalidConfig(format!(
                "repository must be in the format 'owner/repo', got '{s}'"
            ))),
        }
    }
}

impl FromStr for RepoId {
    type Err = BurndownError;

    fn from_str(s: &str) -> Result<Self> {
        RepoId::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything one burndown request needs to know.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub token: Option<String>,
    pub repo: RepoId,
    pub milestone: String,
    pub project: String,
    /// `None` means "whichever sprint is current today".
    pub sprint: Option<String>,
    /// Iteration field holding sprint definitions; `None` picks the first one.
    pub iteration_field: Option<String>,
    pub policy: BurndownPolicy,
    pub task_marker: String,
    /// IANA zone used to decide what "today" is.
    pub timezone: String,
}

// Manual impl so the token never lands in logs.
impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("repo", &self.repo)
            .field("milestone", &self.milestone)
            .field("project", &self.project)
            .field("sprint", &self.sprint)
            .field("iteration_field", &self.iteration_field)
            .field("policy", &self.policy)
            .field("task_marker", &self.task_marker)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl RequestConfig {
    pub fn new(repo: RepoId) -> Self {
        Self {
            token: None,
            repo,
            milestone: DEFAULT_MILESTONE.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            sprint: None,
            iteration_field: None,
            policy: BurndownPolicy::default(),
            task_marker: DEFAULT_TASK_MARKER.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_milestone(mut self, milestone: impl Into<String>) -> Self {
        self.milestone = milestone.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_sprint(mut self, sprint: impl Into<String>) -> Self {
        self.sprint = Some(sprint.into());
        self
    }

    pub fn with_iteration_field(mut self, field: impl Into<String>) -> Self {
        self.iteration_field = Some(field.into());
        self
    }

    pub fn with_policy(mut self, policy: BurndownPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = tz.into();
        self
    }

    /// Token, if one was supplied and is not blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Derive a new config with per-request overrides applied.
    pub fn apply(&self, overrides: &RequestOverrides) -> Result<Self> {
        let mut cfg = self.clone();
        if let Some(token) = &overrides.token {
            cfg.token = Some(token.clone());
        }
        if let Some(repo) = &overrides.repo {
            cfg.repo = RepoId::parse(repo)?;
        }
        if let Some(milestone) = &overrides.milestone {
            cfg.milestone = milestone.clone();
        }
        if let Some(project) = &overrides.project {
            cfg.project = project.clone();
        }
        if let Some(sprint) = &overrides.sprint {
            cfg.sprint = Some(sprint.clone());
        }
        if let Some(policy) = &overrides.policy {
            cfg.policy = policy.parse()?;
        }
        Ok(cfg)
    }
}

/// Optional per-request values, e.g. from a query string or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestOverrides {
    pub token: Option<String>,
    pub repo: Option<String>,
    pub milestone: Option<String>,
    pub project: Option<String>,
    pub sprint: Option<String>,
    pub policy: Option<String>,
}
