//! Error taxonomy shared by every burndown crate.
//!
//! Each kind stays distinguishable all the way up to the presentation layer,
//! which picks the user-visible response (see [`BurndownError::http_status`]).

use chrono::NaiveDate;
use std::fmt;

pub type Result<T> = std::result::Result<T, BurndownError>;

/// What kind of named thing a lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Milestone,
    Project,
    Sprint,
    CustomField,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupKind::Milestone => "milestone",
            LookupKind::Project => "project",
            LookupKind::Sprint => "sprint",
            LookupKind::CustomField => "custom field",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BurndownError {
    #[error("no tracker token supplied (set GITHUB_TOKEN or pass --token)")]
    AuthenticationMissing,

    #[error("failed to fetch {context}: {message}")]
    UpstreamFetchFailed { context: String, message: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: LookupKind, name: String },

    #[error("no tasks found for milestone '{milestone}' in project '{project}'")]
    NoTasksFound { milestone: String, project: String },

    #[error("invalid sprint range: {start} .. {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local output encoding (JSON, CSV) failed.
    #[error("failed to encode {0}")]
    Encoding(String),
}

impl BurndownError {
    pub fn upstream(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamFetchFailed {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn encoding(what: &str, e: impl std::fmt::Display) -> Self {
        Self::Encoding(format!("{what}: {e}"))
    }

    /// HTTP status the presentation layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            BurndownError::AuthenticationMissing => 401,
            BurndownError::NotFound { .. } | BurndownError::NoTasksFound { .. } => 404,
            BurndownError::InvalidRange { .. } | BurndownError::InvalidConfig(_) => 400,
            BurndownError::UpstreamFetchFailed { .. } | BurndownError::MalformedResponse(_) => 502,
            BurndownError::Encoding(_) => 500,
        }
    }
}
