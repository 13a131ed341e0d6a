//! burndown-ingest: decoding of tracker API payloads (GraphQL + REST) into core types.

pub mod parsers;
pub mod types;

pub use parsers::graphql::{decode_field_schema, decode_items_page, decode_project_id};
pub use parsers::rest::{decode_milestone_issue_numbers, decode_milestone_number};
pub use types::{ItemsPage, ProjectRef};
