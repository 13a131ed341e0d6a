use burndown_core::{BurndownError, FieldSchema, RepoId, RequestConfig, Result};
use burndown_ingest::{
    ItemsPage, decode_field_schema, decode_items_page, decode_milestone_issue_numbers,
    decode_milestone_number, decode_project_id,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::future::Future;
use tracing::debug;

use crate::queries::{FIELDS_QUERY, ITEMS_QUERY, PAGE_SIZE, PROJECTS_QUERY};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// The three independent fetches the burndown joins, plus item paging.
///
/// Implementations return raw snapshots; joining happens in the service.
pub trait Tracker {
    fn milestone_number(&self, title: &str) -> impl Future<Output = Result<u64>> + Send;

    fn milestone_issue_numbers(
        &self,
        milestone_number: u64,
    ) -> impl Future<Output = Result<HashSet<u64>>> + Send;

    fn project_id(&self, title: &str) -> impl Future<Output = Result<String>> + Send;

    fn field_schema(&self, project_id: &str) -> impl Future<Output = Result<FieldSchema>> + Send;

    /// One page of board items starting after `after`.
    fn project_items_page(
        &self,
        project_id: &str,
        after: Option<&str>,
    ) -> impl Future<Output = Result<ItemsPage>> + Send;
}

/// GitHub REST + GraphQL client bound to one repository and token.
#[derive(Debug, Clone)]
pub struct GitHubTracker {
    client: reqwest::Client,
    headers: HeaderMap,
    repo: RepoId,
    api_base: String,
}

impl GitHubTracker {
    /// Fails with `AuthenticationMissing` before touching the network.
    pub fn new(cfg: &RequestConfig) -> Result<Self> {
        let token = cfg.token().ok_or(BurndownError::AuthenticationMissing)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| BurndownError::InvalidConfig("token is not a valid header value".into()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("burndown/", env!("CARGO_PKG_VERSION"))),
        );

        Ok(Self {
            client: reqwest::Client::new(),
            headers,
            repo: cfg.repo.clone(),
            api_base: GITHUB_API_URL.to_string(),
        })
    }

    /// Point at a GitHub Enterprise host or a local stub.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, context: &str, req: reqwest::RequestBuilder) -> Result<Value> {
        let resp = req
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| BurndownError::upstream(context, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(BurndownError::upstream(context, format!("{status} {txt}")));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| BurndownError::malformed(format!("{context}: {e}")))
    }

    async fn graphql(&self, context: &str, query: &str, variables: Value) -> Result<Value> {
        let url = format!("{}/graphql", self.api_base);
        let body = json!({ "query": query, "variables": variables });
        self.send(context, self.client.post(url).json(&body)).await
    }

    /// GET a repo-scoped REST listing, following `page=` until a short page.
    async fn rest_get_all(&self, context: &str, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.repo.owner, self.repo.name, path
        );

        let mut all = Vec::new();
        for page in 1u32.. {
            let req = self
                .client
                .get(&url)
                .query(query)
                .query(&[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())]);

            let Value::Array(items) = self.send(context, req).await? else {
                return Err(BurndownError::malformed(format!("{context}: expected a list")));
            };
            let n = items.len();
            all.extend(items);
            debug!(context, page, n, "rest page");
            if n < PAGE_SIZE {
                break;
            }
        }
        Ok(Value::Array(all))
    }
}

impl Tracker for GitHubTracker {
    async fn milestone_number(&self, title: &str) -> Result<u64> {
        let body = self
            .rest_get_all("milestones", "milestones", &[("state", "all".to_string())])
            .await?;
        decode_milestone_number(body, title)
    }

    async fn milestone_issue_numbers(&self, milestone_number: u64) -> Result<HashSet<u64>> {
        let body = self
            .rest_get_all(
                "milestone issues",
                "issues",
                &[
                    ("milestone", milestone_number.to_string()),
                    ("state", "all".to_string()),
                ],
            )
            .await?;
        Ok(decode_milestone_issue_numbers(body)?.into_iter().collect())
    }

    async fn project_id(&self, title: &str) -> Result<String> {
        let vars = json!({ "owner": self.repo.owner, "name": self.repo.name });
        let body = self.graphql("projects", PROJECTS_QUERY, vars).await?;
        decode_project_id(body, title)
    }

    async fn field_schema(&self, project_id: &str) -> Result<FieldSchema> {
        let body = self
            .graphql("custom fields", FIELDS_QUERY, json!({ "projectId": project_id }))
            .await?;
        decode_field_schema(body)
    }

    async fn project_items_page(&self, project_id: &str, after: Option<&str>) -> Result<ItemsPage> {
        let vars = json!({ "projectId": project_id, "first": PAGE_SIZE, "after": after });
        let body = self.graphql("project items", ITEMS_QUERY, vars).await?;
        decode_items_page(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn cfg() -> RequestConfig {
        RequestConfig::new(RepoId::parse("cosminmemetea/dashboards").unwrap())
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let err = GitHubTracker::new(&cfg()).unwrap_err();
        assert_eq!(err, BurndownError::AuthenticationMissing);

        let err = GitHubTracker::new(&cfg().with_token("  ")).unwrap_err();
        assert_eq!(err, BurndownError::AuthenticationMissing);
    }

    #[test]
    fn test_builds_with_token() {
        let tracker = GitHubTracker::new(&cfg().with_token("ghp_test"))
            .unwrap()
            .with_api_base("http://localhost:9999/");
        assert_eq!(tracker.api_base, "http://localhost:9999");
        assert_eq!(tracker.headers.get(AUTHORIZATION).unwrap(), "Bearer ghp_test");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_failure() {
        // Port 9 (discard) on localhost refuses connections in test sandboxes
        let tracker = GitHubTracker::new(&cfg().with_token("ghp_test"))
            .unwrap()
            .with_api_base("http://127.0.0.1:9");
        let err = tracker.project_id("Dashboard Project").await.unwrap_err();
        assert!(matches!(err, BurndownError::UpstreamFetchFailed { .. }));
    }

    /// Serves `total` milestone issues in `per_page` slices and records the pages asked for.
    async fn issues_stub(total: u64) -> (String, Arc<Mutex<Vec<u64>>>) {
        let pages = Arc::new(Mutex::new(Vec::new()));

        async fn issues(
            State((total, pages)): State<(u64, Arc<Mutex<Vec<u64>>>)>,
            Query(q): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            let page: u64 = q["page"].parse().unwrap();
            let per_page: u64 = q["per_page"].parse().unwrap();
            assert_eq!(q["milestone"], "4");
            pages.lock().unwrap().push(page);

            let start = (page - 1) * per_page + 1;
            let end = (start + per_page).min(total + 1);
            Json(Value::Array((start..end).map(|n| json!({ "number": n })).collect()))
        }

        let app = Router::new()
            .route("/repos/cosminmemetea/dashboards/issues", get(issues))
            .with_state((total, pages.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}"), pages)
    }

    #[tokio::test]
    async fn test_rest_listing_pages_until_short_page() {
        let (base, pages) = issues_stub(203).await;
        let tracker = GitHubTracker::new(&cfg().with_token("ghp_test"))
            .unwrap()
            .with_api_base(base);

        let numbers = tracker.milestone_issue_numbers(4).await.unwrap();
        assert_eq!(numbers.len(), 203);
        assert!(numbers.contains(&1) && numbers.contains(&203));
        assert_eq!(*pages.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_rest_listing_full_last_page_fetches_one_more() {
        let (base, pages) = issues_stub(200).await;
        let tracker = GitHubTracker::new(&cfg().with_token("ghp_test"))
            .unwrap()
            .with_api_base(base);

        let numbers = tracker.milestone_issue_numbers(4).await.unwrap();
        assert_eq!(numbers.len(), 200);
        assert_eq!(*pages.lock().unwrap(), vec![1, 2, 3]);
    }
}
