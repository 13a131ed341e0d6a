use burndown_core::ProjectItem;
use serde::{Deserialize, Serialize};

/// One page of project board items plus the cursor to continue from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPage {
    pub items: Vec<ProjectItem>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A project as listed on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub title: String,
}

// Wire shapes below mirror the GraphQL selections sent by the tracker client.

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

/// GraphQL connections may contain null nodes.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Connection<T> {
    #[serde(default)]
    pub nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryNode {
    #[serde(rename = "projectsV2")]
    pub projects_v2: Connection<ProjectRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeData<T> {
    pub node: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldsNode {
    pub fields: Connection<RawField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawField {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub configuration: Option<RawIterationConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOption {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIterationConfig {
    #[serde(default)]
    pub iterations: Vec<RawIteration>,
    #[serde(default, rename = "completedIterations")]
    pub completed_iterations: Vec<RawIteration>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIteration {
    pub title: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    pub duration: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemsNode {
    pub items: ItemConnection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemConnection {
    #[serde(default)]
    pub nodes: Vec<Option<RawItem>>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawItem {
    pub content: Option<RawContent>,
    #[serde(rename = "fieldValues")]
    pub field_values: Option<Connection<serde_json::Value>>,
}

/// Draft issues and pull requests come back as `{}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawContent {
    pub id: Option<String>,
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "closedAt")]
    pub closed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestMilestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestIssue {
    pub number: u64,
}
