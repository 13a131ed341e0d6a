//! Project board custom fields: the schema side and the per-item values.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the field story points are read from.
pub const STORY_POINTS_FIELD: &str = "Story Points";

/// Declared type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Number, text, date and other unstructured fields.
    Plain,
    SingleSelect,
    Iteration,
}

/// A sprint definition as configured on an iteration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    pub title: String,
    pub start_date: NaiveDate,
    /// Days, >= 1.
    pub duration_days: u32,
}

impl Iteration {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, duration_days: u32) -> Self {
        Self {
            title: title.into(),
            start_date,
            duration_days,
        }
    }

    /// Last day of the iteration, inclusive. A zero duration ends on the
    /// start day; past the calendar's end it saturates at `NaiveDate::MAX`.
    pub fn end_date(&self) -> NaiveDate {
        let extra = u64::from(self.duration_days.saturating_sub(1));
        self.start_date
            .checked_add_days(Days::new(extra))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Project-level schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub kind: FieldKind,
    /// Option names, in board order (single-select only).
    #[serde(default)]
    pub options: Vec<String>,
    /// Active then completed iterations (iteration fields only).
    #[serde(default)]
    pub iterations: Vec<Iteration>,
}

impl CustomField {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Plain,
            options: Vec::new(),
            iterations: Vec::new(),
        }
    }

    pub fn single_select(name: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            options,
            kind: FieldKind::SingleSelect,
            ..Self::plain(name)
        }
    }

    pub fn iteration(name: impl Into<String>, iterations: Vec<Iteration>) -> Self {
        Self {
            iterations,
            kind: FieldKind::Iteration,
            ..Self::plain(name)
        }
    }
}

/// All custom fields of a project, keyed by their (unique) name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: BTreeMap<String, CustomField>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CustomField) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn with_field(mut self, field: CustomField) -> Self {
        self.insert(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CustomField> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomField> {
        self.fields.values()
    }

    /// Iterations of the sprint field: the named one if given, else the
    /// first iteration-typed field.
    pub fn sprint_iterations(&self, field_name: Option<&str>) -> Option<&[Iteration]> {
        let field = match field_name {
            Some(name) => self.get(name).filter(|f| f.kind == FieldKind::Iteration),
            None => self.iter().find(|f| f.kind == FieldKind::Iteration),
        }?;
        Some(field.iterations.as_slice())
    }
}

/// The concrete value an item carries for one field, resolved once at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValueKind {
    SingleSelect { name: String },
    Text { text: String },
    /// The tracker may send an explicit null number.
    Number { number: Option<f64> },
    Iteration {
        title: String,
        start_date: NaiveDate,
        duration_days: u32,
    },
}

/// A field value plus the name of the field that defines it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub field_name: String,
    pub kind: FieldValueKind,
}

impl FieldValue {
    pub fn new(field_name: impl Into<String>, kind: FieldValueKind) -> Self {
        Self {
            field_name: field_name.into(),
            kind,
        }
    }

    pub fn number(field_name: impl Into<String>, number: f64) -> Self {
        Self::new(field_name, FieldValueKind::Number { number: Some(number) })
    }

    pub fn text(field_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field_name, FieldValueKind::Text { text: text.into() })
    }

    pub fn single_select(field_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(field_name, FieldValueKind::SingleSelect { name: name.into() })
    }

    pub fn iteration(field_name: impl Into<String>, iteration: &Iteration) -> Self {
        Self::new(
            field_name,
            FieldValueKind::Iteration {
                title: iteration.title.clone(),
                start_date: iteration.start_date,
                duration_days: iteration.duration_days,
            },
        )
    }
}
