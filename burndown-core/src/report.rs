//! Chart encoders for the presentation layer: JSON payload, CSV, text table.

use serde::{Deserialize, Serialize};

use crate::burndown::DailyBurndownPoint;
use crate::error::{BurndownError, Result};
use crate::time::format_date;

/// `{"chart": [...]}` payload served to dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownChart {
    pub chart: Vec<DailyBurndownPoint>,
}

impl BurndownChart {
    pub fn new(chart: Vec<DailyBurndownPoint>) -> Self {
        Self { chart }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BurndownError::encoding("chart json", e))
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let csv_err = |e: csv::Error| BurndownError::encoding("chart csv", e);

        wtr.write_record(["date", "ideal_remaining", "actual_remaining", "scope_points"])
            .map_err(csv_err)?;
        for p in &self.chart {
            wtr.write_record([
                format_date(p.date),
                format!("{:.2}", p.ideal_remaining),
                p.actual_remaining.to_string(),
                p.scope_points.to_string(),
            ])
            .map_err(csv_err)?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| BurndownError::encoding("chart csv", e))?;
        String::from_utf8(bytes).map_err(|e| BurndownError::encoding("chart csv", e))
    }

    pub fn to_table(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "{:<12} {:>8} {:>8} {:>8}\n",
            "date", "ideal", "actual", "scope"
        ));
        for p in &self.chart {
            let marker = if (p.actual_remaining as f64) > p.ideal_remaining {
                " ▲"
            } else {
                ""
            };
            s.push_str(&format!(
                "{:<12} {:>8.2} {:>8} {:>8}{}\n",
                format_date(p.date),
                p.ideal_remaining,
                p.actual_remaining,
                p.scope_points,
                marker
            ));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chart() -> BurndownChart {
        let d = |day| NaiveDate::from_ymd_opt(2025, 2, day).unwrap();
        BurndownChart::new(vec![
            DailyBurndownPoint {
                date: d(5),
                ideal_remaining: 25.0,
                actual_remaining: 25,
                scope_points: 25,
            },
            DailyBurndownPoint {
                date: d(6),
                ideal_remaining: 23.75,
                actual_remaining: 25,
                scope_points: 25,
            },
        ])
    }

    #[test]
    fn test_json_shape() {
        let v = serde_json::to_value(chart()).unwrap();
        let first = &v["chart"][0];
        assert_eq!(first["date"], "2025-02-05");
        assert_eq!(first["ideal_remaining"], 25.0);
        assert_eq!(first["actual_remaining"], 25);
        // Scope is an internal column only
        assert_eq!(first.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_csv_output() {
        let csv = chart().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,ideal_remaining,actual_remaining,scope_points");
        assert_eq!(lines[2], "2025-02-06,23.75,25,25");
    }

    #[test]
    fn test_table_flags_days_behind_ideal() {
        let table = chart().to_table();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(!rows[1].ends_with('▲'));
        assert!(rows[2].ends_with('▲'));
    }
}
