//! REST payload decoding: milestone listing and milestone issues.

use burndown_core::{BurndownError, LookupKind, Result};
use serde_json::Value;

use crate::types::{RestIssue, RestMilestone};

/// Number of the first milestone whose title matches exactly.
pub fn decode_milestone_number(body: Value, title: &str) -> Result<u64> {
    let milestones: Vec<RestMilestone> = serde_json::from_value(body)
        .map_err(|e| BurndownError::malformed(format!("milestones: {e}")))?;

    milestones
        .into_iter()
        .find(|m| m.title == title)
        .map(|m| m.number)
        .ok_or_else(|| BurndownError::not_found(LookupKind::Milestone, title))
}

/// Issue numbers on one page of `GET /repos/{owner}/{repo}/issues?milestone=N`.
pub fn decode_milestone_issue_numbers(body: Value) -> Result<Vec<u64>> {
    let issues: Vec<RestIssue> = serde_json::from_value(body)
        .map_err(|e| BurndownError::malformed(format!("milestone issues: {e}")))?;
    Ok(issues.into_iter().map(|i| i.number).collect())
}
