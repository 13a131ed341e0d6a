//! Story point extraction from a task's custom field values.
//!
//! The schema's declared type picks the parser, not the value variant that
//! actually arrived. A schema/value mismatch yields 0; unestimated work is
//! zero-weighted, never an error.

use regex::Regex;
use std::sync::LazyLock;

use crate::fields::{FieldKind, FieldSchema, FieldValue, FieldValueKind, STORY_POINTS_FIELD};

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)").expect("static regex"));

/// Story points of one task, looked up through the project schema.
pub fn story_points(field_values: &[FieldValue], schema: &FieldSchema) -> i64 {
    extract_story_points(field_values, schema.get(STORY_POINTS_FIELD).map(|f| f.kind))
}

/// Extract story points given the declared type of the "Story Points" field.
///
/// Values are scanned in order; the first one the declared type knows how to
/// read decides the result.
pub fn extract_story_points(field_values: &[FieldValue], declared: Option<FieldKind>) -> i64 {
    let Some(declared) = declared else {
        return 0;
    };

    for value in field_values.iter().filter(|v| v.field_name == STORY_POINTS_FIELD) {
        match (declared, &value.kind) {
            (FieldKind::Plain, FieldValueKind::Number { number }) => {
                return number.map(truncate).unwrap_or(0);
            }
            (FieldKind::SingleSelect, FieldValueKind::SingleSelect { name }) => {
                return parse_all_digits(name);
            }
            (FieldKind::Plain, FieldValueKind::Text { text }) => {
                return parse_leading_digits(text);
            }
            _ => continue,
        }
    }
    0
}

fn truncate(n: f64) -> i64 {
    if n.is_finite() { n.trunc() as i64 } else { 0 }
}

/// "3" -> 3, "3 pts" / "abc" / "" -> 0
fn parse_all_digits(s: &str) -> i64 {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    s.parse().unwrap_or(0)
}

/// "2 points" -> 2, "points: 2" -> 0
fn parse_leading_digits(s: &str) -> i64 {
    LEADING_DIGITS
        .captures(s)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CustomField;

    const SP: &str = STORY_POINTS_FIELD;

    #[test]
    fn test_plain_number() {
        let values = vec![FieldValue::number(SP, 5.0)];
        assert_eq!(extract_story_points(&values, Some(FieldKind::Plain)), 5);

        let fractional = vec![FieldValue::number(SP, 2.9)];
        assert_eq!(extract_story_points(&fractional, Some(FieldKind::Plain)), 2);
    }

    #[test]
    fn test_plain_null_or_zero_number() {
        let null = vec![FieldValue::new(SP, FieldValueKind::Number { number: None })];
        assert_eq!(extract_story_points(&null, Some(FieldKind::Plain)), 0);

        let zero = vec![FieldValue::number(SP, 0.0)];
        assert_eq!(extract_story_points(&zero, Some(FieldKind::Plain)), 0);
    }

    #[test]
    fn test_single_select_digits_only() {
        let three = vec![FieldValue::single_select(SP, "3")];
        assert_eq!(extract_story_points(&three, Some(FieldKind::SingleSelect)), 3);

        let abc = vec![FieldValue::single_select(SP, "abc")];
        assert_eq!(extract_story_points(&abc, Some(FieldKind::SingleSelect)), 0);

        let with_unit = vec![FieldValue::single_select(SP, "3 pts")];
        assert_eq!(extract_story_points(&with_unit, Some(FieldKind::SingleSelect)), 0);
    }

    #[test]
    fn test_plain_text_leading_digits() {
        let two = vec![FieldValue::text(SP, "2 points")];
        assert_eq!(extract_story_points(&two, Some(FieldKind::Plain)), 2);

        let trailing = vec![FieldValue::text(SP, "points: 2")];
        assert_eq!(extract_story_points(&trailing, Some(FieldKind::Plain)), 0);
    }

    #[test]
    fn test_no_matching_field() {
        let values = vec![FieldValue::number("Estimate", 8.0)];
        assert_eq!(extract_story_points(&values, Some(FieldKind::Plain)), 0);
        assert_eq!(extract_story_points(&[], Some(FieldKind::Plain)), 0);
    }

    #[test]
    fn test_schema_missing_field_is_zero() {
        let values = vec![FieldValue::number(SP, 5.0)];
        assert_eq!(extract_story_points(&values, None), 0);
        assert_eq!(story_points(&values, &FieldSchema::new()), 0);
    }

    #[test]
    fn test_declared_type_mismatch_is_zero() {
        // Schema says plain, value came through as a select option
        let values = vec![FieldValue::single_select(SP, "5")];
        assert_eq!(extract_story_points(&values, Some(FieldKind::Plain)), 0);

        // Schema says select, value is a number
        let values = vec![FieldValue::number(SP, 5.0)];
        assert_eq!(extract_story_points(&values, Some(FieldKind::SingleSelect)), 0);
    }

    #[test]
    fn test_lookup_through_schema() {
        let schema = FieldSchema::new().with_field(CustomField::single_select(
            SP,
            vec!["1".into(), "2".into(), "3".into()],
        ));
        let values = vec![
            FieldValue::single_select("Status", "Todo"),
            FieldValue::single_select(SP, "2"),
        ];
        assert_eq!(story_points(&values, &schema), 2);
    }

    #[test]
    fn test_unreadable_value_falls_through_to_next() {
        let values = vec![
            FieldValue::single_select(SP, "8"),
            FieldValue::number(SP, 3.0),
        ];
        assert_eq!(extract_story_points(&values, Some(FieldKind::Plain)), 3);
    }
}
