//! GraphQL (projects v2) payload decoding.
//!
//! Expected selections:
//!   repository.projectsV2.nodes { id title }
//!   node(id) ... on ProjectV2 { fields.nodes { __typename name options configuration } }
//!   node(id) ... on ProjectV2 { items { nodes { content fieldValues } pageInfo } }

use burndown_core::time::{parse_date, parse_timestamp};
use burndown_core::{
    BurndownError, CustomField, FieldKind, FieldSchema, FieldValue, FieldValueKind, IssueContent,
    Iteration, LookupKind, ProjectItem, Result,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{
    FieldsNode, GraphQlResponse, ItemsNode, ItemsPage, NodeData, RawContent, RawField, RawItem,
    RawIteration, RepositoryData,
};

/// Unwrap the `{data, errors}` envelope and decode `data` into `T`.
///
/// A non-empty error list wins over any partial data.
pub fn decode_data<T: DeserializeOwned>(context: &str, body: Value) -> Result<T> {
    let resp: GraphQlResponse = serde_json::from_value(body)
        .map_err(|e| BurndownError::malformed(format!("{context}: {e}")))?;

    if !resp.errors.is_empty() {
        let messages: Vec<&str> = resp.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(BurndownError::upstream(context, messages.join("; ")));
    }

    let data = resp
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| BurndownError::malformed(format!("{context}: response has no data")))?;

    serde_json::from_value(data).map_err(|e| BurndownError::malformed(format!("{context}: {e}")))
}

/// Find the project id whose title matches exactly.
pub fn decode_project_id(body: Value, title: &str) -> Result<String> {
    let data: RepositoryData = decode_data("projects", body)?;
    let repo = data
        .repository
        .ok_or_else(|| BurndownError::malformed("projects: repository is null"))?;

    repo.projects_v2
        .nodes
        .into_iter()
        .flatten()
        .find(|p| p.title == title)
        .map(|p| p.id)
        .ok_or_else(|| BurndownError::not_found(LookupKind::Project, title))
}

pub fn decode_field_schema(body: Value) -> Result<FieldSchema> {
    let data: NodeData<FieldsNode> = decode_data("custom fields", body)?;
    let node = data
        .node
        .ok_or_else(|| BurndownError::malformed("custom fields: node is null"))?;

    let mut schema = FieldSchema::new();
    for raw in node.fields.nodes.into_iter().flatten() {
        if let Some(field) = decode_field(raw)? {
            schema.insert(field);
        }
    }
    Ok(schema)
}

fn decode_field(raw: RawField) -> Result<Option<CustomField>> {
    let (Some(typename), Some(name)) = (raw.typename, raw.name) else {
        return Ok(None);
    };

    let field = match typename.as_str() {
        "ProjectV2Field" => CustomField::plain(name),
        "ProjectV2SingleSelectField" => {
            CustomField::single_select(name, raw.options.into_iter().map(|o| o.name).collect())
        }
        "ProjectV2IterationField" => {
            let mut iterations = Vec::new();
            if let Some(config) = raw.configuration {
                for it in config.iterations.into_iter().chain(config.completed_iterations) {
                    iterations.push(decode_iteration(it)?);
                }
            }
            CustomField::iteration(name, iterations)
        }
        _ => return Ok(None),
    };
    Ok(Some(field))
}

/// Longest sprint accepted from the tracker, in days.
pub const MAX_ITERATION_DAYS: u64 = 365;

fn decode_iteration(raw: RawIteration) -> Result<Iteration> {
    let duration = iteration_duration(&raw.title, raw.duration)?;
    Ok(Iteration::new(raw.title, parse_date(&raw.start_date)?, duration))
}

fn iteration_duration(title: &str, days: u64) -> Result<u32> {
    match u32::try_from(days) {
        Ok(d) if (1..=MAX_ITERATION_DAYS).contains(&days) => Ok(d),
        _ => Err(BurndownError::malformed(format!(
            "iteration '{title}': duration {days} outside 1..={MAX_ITERATION_DAYS} days"
        ))),
    }
}

pub fn decode_items_page(body: Value) -> Result<ItemsPage> {
    let data: NodeData<ItemsNode> = decode_data("project items", body)?;
    let node = data
        .node
        .ok_or_else(|| BurndownError::malformed("project items: node is null"))?;

    let items = node
        .items
        .nodes
        .into_iter()
        .flatten()
        .map(decode_item)
        .collect::<Result<Vec<_>>>()?;

    Ok(ItemsPage {
        items,
        has_next_page: node.items.page_info.has_next_page,
        end_cursor: node.items.page_info.end_cursor,
    })
}

fn decode_item(raw: RawItem) -> Result<ProjectItem> {
    let content = match raw.content {
        Some(c) => decode_content(c)?,
        None => None,
    };

    let mut field_values = Vec::new();
    for v in raw.field_values.into_iter().flat_map(|c| c.nodes).flatten() {
        if let Some(fv) = decode_field_value(&v)? {
            field_values.push(fv);
        }
    }

    Ok(ProjectItem {
        content,
        field_values,
    })
}

/// `None` for board items without an issue behind them.
fn decode_content(raw: RawContent) -> Result<Option<IssueContent>> {
    let Some(number) = raw.number else {
        return Ok(None);
    };

    let missing = |key: &str| BurndownError::malformed(format!("issue #{number}: missing {key}"));
    let created_at = raw.created_at.ok_or_else(|| missing("createdAt"))?;

    Ok(Some(IssueContent {
        id: raw.id.unwrap_or_else(|| format!("#{number}")),
        number,
        title: raw.title.ok_or_else(|| missing("title"))?,
        state: raw.state.ok_or_else(|| missing("state"))?.parse()?,
        created_at: parse_timestamp(&created_at)?,
        closed_at: raw.closed_at.as_deref().map(parse_timestamp).transpose()?,
    }))
}

/// Resolve one field value node into the tagged union by which keys it carries.
///
/// Nodes without a field reference, and value types we do not model (dates,
/// labels, assignees), are skipped.
pub fn decode_field_value(v: &Value) -> Result<Option<FieldValue>> {
    let Some(obj) = v.as_object() else {
        return Ok(None);
    };
    let Some(field_name) = obj
        .get("field")
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };

    let kind = if let Some(start) = obj.get("startDate").and_then(Value::as_str) {
        let title = obj.get("title").and_then(Value::as_str).unwrap_or_default();
        let days = obj.get("duration").and_then(Value::as_u64).ok_or_else(|| {
            BurndownError::malformed(format!("iteration value for '{field_name}' has no duration"))
        })?;
        FieldValueKind::Iteration {
            title: title.to_string(),
            start_date: parse_date(start)?,
            duration_days: iteration_duration(title, days)?,
        }
    } else if let Some(name) = obj.get("name").and_then(Value::as_str) {
        FieldValueKind::SingleSelect {
            name: name.to_string(),
        }
    } else if let Some(text) = obj.get("text").and_then(Value::as_str) {
        FieldValueKind::Text {
            text: text.to_string(),
        }
    } else if let Some(number) = obj.get("number") {
        FieldValueKind::Number {
            number: number.as_f64(),
        }
    } else {
        return Ok(None);
    };

    Ok(Some(FieldValue::new(field_name, kind)))
}

/// Kind a decoded field schema assigned to a typename; handy for logging.
pub fn field_kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Plain => "ProjectV2Field",
        FieldKind::SingleSelect => "ProjectV2SingleSelectField",
        FieldKind::Iteration => "ProjectV2IterationField",
    }
}
