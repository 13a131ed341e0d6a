//! Burndown computation: ideal vs actual remaining story points per day.
//!
//! Two policies exist and both stay selectable:
//! - `Simple`: one fixed total for the whole sprint, taken over every task.
//! - `ScopeAware`: the ideal line starts from what existed at sprint start,
//!   and the actual line counts tasks only from the day they were created,
//!   so mid-sprint additions show up as upward deviation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BurndownError, Result};
use crate::fields::FieldSchema;
use crate::sprint::SprintRange;
use crate::story_points::story_points;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BurndownPolicy {
    Simple,
    #[default]
    ScopeAware,
}

impl FromStr for BurndownPolicy {
    type Err = BurndownError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(BurndownPolicy::Simple),
            "scope-aware" | "scope_aware" | "scope" => Ok(BurndownPolicy::ScopeAware),
            other => Err(BurndownError::InvalidConfig(format!(
                "unknown burndown policy '{other}' (expected simple or scope-aware)"
            ))),
        }
    }
}

impl fmt::Display for BurndownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurndownPolicy::Simple => f.write_str("simple"),
            BurndownPolicy::ScopeAware => f.write_str("scope-aware"),
        }
    }
}

/// One day of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBurndownPoint {
    pub date: NaiveDate,
    /// Rounded to 2 decimals.
    pub ideal_remaining: f64,
    /// Never negative.
    pub actual_remaining: i64,
    /// Total points in scope on this day. Not part of the chart payload.
    #[serde(skip)]
    pub scope_points: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurndownComputer {
    policy: BurndownPolicy,
    milestone: String,
    project: String,
}

impl BurndownComputer {
    pub fn new(policy: BurndownPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Milestone/project labels reported when no tasks are found.
    pub fn for_scope(mut self, milestone: impl Into<String>, project: impl Into<String>) -> Self {
        self.milestone = milestone.into();
        self.project = project.into();
        self
    }

    /// One point per calendar day from `sprint_start` to `sprint_end` inclusive.
    pub fn compute(
        &self,
        tasks: &[Task],
        schema: &FieldSchema,
        sprint_start: NaiveDate,
        sprint_end: NaiveDate,
    ) -> Result<Vec<DailyBurndownPoint>> {
        if tasks.is_empty() {
            return Err(BurndownError::NoTasksFound {
                milestone: self.milestone.clone(),
                project: self.project.clone(),
            });
        }

        let range = SprintRange::new(sprint_start, sprint_end);
        let total_days = range.total_days();
        if total_days <= 0 {
            return Err(BurndownError::InvalidRange {
                start: sprint_start,
                end: sprint_end,
            });
        }

        let weighted: Vec<(&Task, i64)> = tasks
            .iter()
            .map(|t| (t, story_points(&t.field_values, schema)))
            .collect();

        let baseline: i64 = match self.policy {
            BurndownPolicy::Simple => weighted.iter().map(|(_, p)| p).sum(),
            BurndownPolicy::ScopeAware => points_where(&weighted, |t| t.is_created_by(sprint_start)),
        };

        let chart = range
            .days()
            .enumerate()
            .map(|(i, day)| {
                let scope_points = match self.policy {
                    BurndownPolicy::Simple => baseline,
                    // Recomputed from scratch each day over everything created so far.
                    BurndownPolicy::ScopeAware => points_where(&weighted, |t| t.is_created_by(day)),
                };
                let completed = points_where(&weighted, |t| t.is_closed_by(day));

                DailyBurndownPoint {
                    date: day,
                    ideal_remaining: ideal_remaining(baseline, i as i64, total_days),
                    actual_remaining: (scope_points - completed).max(0),
                    scope_points,
                }
            })
            .collect();

        Ok(chart)
    }
}

fn points_where(weighted: &[(&Task, i64)], pred: impl Fn(&Task) -> bool) -> i64 {
    weighted
        .iter()
        .filter(|&&(t, _)| pred(t))
        .map(|(_, p)| p)
        .sum()
}

/// Linear burn from `baseline` on day 0 to 0 on the last day.
fn ideal_remaining(baseline: i64, day_index: i64, total_days: i64) -> f64 {
    let baseline = baseline as f64;
    let raw = if total_days > 1 {
        baseline - baseline * day_index as f64 / (total_days - 1) as f64
    } else {
        baseline
    };
    round2(raw)
}

/// Two decimals, ties to even on the exact binary value. Float formatting
/// is exact, so going through it avoids the `x * 100.0` rounding error.
fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{CustomField, FieldValue};
    use chrono::{TimeZone, Utc};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn schema() -> FieldSchema {
        FieldSchema::new().with_field(CustomField::plain("Story Points"))
    }

    fn task(number: u64, points: f64, created: (u32, u32)) -> Task {
        let created = Utc.with_ymd_and_hms(2025, created.0, created.1, 12, 0, 0).unwrap();
        Task::new(number, format!("[Task] #{number}"), created)
            .with_field(FieldValue::number("Story Points", points))
    }

    fn closed(t: Task, on: (u32, u32)) -> Task {
        t.closed(Utc.with_ymd_and_hms(2025, on.0, on.1, 16, 30, 0).unwrap())
    }

    #[test]
    fn test_empty_tasks_carry_scope_labels() {
        let err = BurndownComputer::new(BurndownPolicy::ScopeAware)
            .for_scope("Milestone I", "Dashboard Project")
            .compute(&[], &schema(), d(2, 5), d(2, 25))
            .unwrap_err();
        assert_eq!(
            err,
            BurndownError::NoTasksFound {
                milestone: "Milestone I".into(),
                project: "Dashboard Project".into(),
            }
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let tasks = vec![task(1, 3.0, (2, 1))];
        let err = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 25), d(2, 5))
            .unwrap_err();
        assert!(matches!(err, BurndownError::InvalidRange { .. }));
    }

    #[test]
    fn test_single_day_sprint_keeps_full_ideal() {
        let tasks = vec![task(1, 8.0, (2, 1))];
        let chart = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 5), d(2, 5))
            .unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].ideal_remaining, 8.0);
        assert_eq!(chart[0].actual_remaining, 8);
    }

    #[test]
    fn test_ideal_rounds_to_two_decimals() {
        // 10 points over 4 days: 10, 6.67, 3.33, 0
        let tasks = vec![task(1, 10.0, (2, 1))];
        let chart = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 5), d(2, 8))
            .unwrap();
        let ideal: Vec<f64> = chart.iter().map(|p| p.ideal_remaining).collect();
        assert_eq!(ideal, vec![10.0, 6.67, 3.33, 0.0]);
    }

    #[test]
    fn test_round2_half_cent_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(6.666_666), 6.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_ideal_exact_half_cent_rounds_down_to_even() {
        // 1 point over 9 days: day 7 is exactly 0.125
        let tasks = vec![task(1, 1.0, (2, 1))];
        let chart = BurndownComputer::new(BurndownPolicy::Simple)
            .compute(&tasks, &schema(), d(2, 5), d(2, 13))
            .unwrap();
        assert_eq!(chart[7].ideal_remaining, 0.12);
    }

    #[test]
    fn test_simple_policy_counts_late_tasks_from_day_zero() {
        let tasks = vec![task(1, 10.0, (2, 1)), task(2, 5.0, (2, 15))];
        let chart = BurndownComputer::new(BurndownPolicy::Simple)
            .compute(&tasks, &schema(), d(2, 5), d(2, 25))
            .unwrap();
        assert_eq!(chart[0].ideal_remaining, 15.0);
        assert_eq!(chart[0].actual_remaining, 15);
        assert!(chart.iter().all(|p| p.scope_points == 15));
    }

    #[test]
    fn test_scope_aware_baseline_excludes_late_tasks() {
        let tasks = vec![task(1, 10.0, (2, 1)), task(2, 5.0, (2, 15))];
        let chart = BurndownComputer::new(BurndownPolicy::ScopeAware)
            .compute(&tasks, &schema(), d(2, 5), d(2, 25))
            .unwrap();
        assert_eq!(chart[0].ideal_remaining, 10.0);
        assert_eq!(chart[0].actual_remaining, 10);
        assert_eq!(chart[10].date, d(2, 15));
        assert_eq!(chart[10].actual_remaining, 15);
    }

    #[test]
    fn test_task_created_on_start_day_is_baseline() {
        let tasks = vec![task(1, 4.0, (2, 5))];
        let chart = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 5), d(2, 9))
            .unwrap();
        assert_eq!(chart[0].ideal_remaining, 4.0);
    }

    #[test]
    fn test_over_completion_clamps_to_zero() {
        // Closed before it was created on the board: completed > in scope on that day
        let tasks = vec![closed(task(1, 6.0, (2, 10)), (2, 6))];
        let chart = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 5), d(2, 12))
            .unwrap();
        assert!(chart.iter().all(|p| p.actual_remaining >= 0));
        assert_eq!(chart[1].actual_remaining, 0);
    }

    #[test]
    fn test_unestimated_tasks_weigh_nothing() {
        let mut t = task(1, 0.0, (2, 1));
        t.field_values.clear();
        let tasks = vec![t, task(2, 3.0, (2, 1))];
        let chart = BurndownComputer::default()
            .compute(&tasks, &schema(), d(2, 5), d(2, 7))
            .unwrap();
        assert_eq!(chart[0].actual_remaining, 3);
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("simple".parse::<BurndownPolicy>().unwrap(), BurndownPolicy::Simple);
        assert_eq!("Scope-Aware".parse::<BurndownPolicy>().unwrap(), BurndownPolicy::ScopeAware);
        assert!("linear".parse::<BurndownPolicy>().is_err());
        assert_eq!(BurndownPolicy::ScopeAware.to_string(), "scope-aware");
        assert_eq!(BurndownPolicy::default(), BurndownPolicy::ScopeAware);
    }
}
