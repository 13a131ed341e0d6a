//! burndown-core: sprint burndown engine (story points, sprint calendar, task
//! selection, ideal/actual series).
//!
//! Pure and synchronous: every function works on snapshots handed in by the
//! caller, so concurrent requests need no locking.

pub mod burndown;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod report;
pub mod sprint;
pub mod story_points;
pub mod task;
pub mod time;

pub use burndown::{BurndownComputer, BurndownPolicy, DailyBurndownPoint};
pub use config::{RepoId, RequestConfig, RequestOverrides};
pub use error::{BurndownError, LookupKind, Result};
pub use fields::{
    CustomField, FieldKind, FieldSchema, FieldValue, FieldValueKind, Iteration, STORY_POINTS_FIELD,
};
pub use filter::{DEFAULT_TASK_MARKER, TaskFilter, select_tasks};
pub use report::BurndownChart;
pub use sprint::{
    SprintRange, SprintStatus, SprintSummary, current_sprint, iterations_from_tasks, list_sprints,
    resolve_sprint_range,
};
pub use story_points::{extract_story_points, story_points};
pub use task::{IssueContent, ProjectItem, Task, TaskState};
