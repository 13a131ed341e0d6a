//! GraphQL documents sent to the projects v2 API.
//!
//! Values go through `variables`; nothing is spliced into the query text.

/// Page size for both the items connection and REST listings.
pub const PAGE_SIZE: usize = 100;

pub const PROJECTS_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    projectsV2(first: 100) {
      nodes {
        id
        title
      }
    }
  }
}
"#;

pub const FIELDS_QUERY: &str = r#"
query($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 100) {
        nodes {
          ... on ProjectV2Field {
            id
            name
            __typename
          }
          ... on ProjectV2SingleSelectField {
            id
            name
            __typename
            options {
              name
            }
          }
          ... on ProjectV2IterationField {
            id
            name
            __typename
            configuration {
              iterations {
                title
                startDate
                duration
              }
              completedIterations {
                title
                startDate
                duration
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const ITEMS_QUERY: &str = r#"
query($projectId: ID!, $first: Int!, $after: String) {
  node(id: $projectId) {
    ... on ProjectV2 {
      items(first: $first, after: $after) {
        nodes {
          content {
            ... on Issue {
              id
              number
              title
              state
              createdAt
              closedAt
            }
          }
          fieldValues(first: 20) {
            nodes {
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                field {
                  ... on ProjectV2SingleSelectField {
                    name
                  }
                }
              }
              ... on ProjectV2ItemFieldTextValue {
                text
                field {
                  ... on ProjectV2Field {
                    name
                  }
                }
              }
              ... on ProjectV2ItemFieldNumberValue {
                number
                field {
                  ... on ProjectV2Field {
                    name
                  }
                }
              }
              ... on ProjectV2ItemFieldIterationValue {
                iterationId
                title
                startDate
                duration
                field {
                  ... on ProjectV2IterationField {
                    name
                  }
                }
              }
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
}
"#;
