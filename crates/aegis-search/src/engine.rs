//! HTTP client for the external full-text search engine.
//!
//! The engine is an opaque collaborator: this client only translates a
//! normalized [`SearchQuery`] into the engine's JSON API and maps transport
//! or non-success responses to [`Error::EngineUnavailable`], which the
//! aggregator surfaces as a hard failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use aegis_core::{
    CallerIdentity, Error, FacetSearchResponse, Result, SearchEngine, SearchQuery,
    VisibilityScope,
};

/// Default engine endpoint.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8983";

/// Timeout for engine requests (seconds).
pub const ENGINE_TIMEOUT_SECS: u64 = 30;

/// HTTP-backed [`SearchEngine`] implementation.
pub struct HttpSearchEngine {
    client: Client,
    base_url: String,
}

impl HttpSearchEngine {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(ENGINE_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Create from the `AEGIS_ENGINE_URL` environment variable.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("AEGIS_ENGINE_URL").unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string());
        Self::new(base_url)
    }
}

/// Wire shape of one filter clause sent to the engine. Valueless filters
/// are pruned during query normalization and never reach this point.
#[derive(Debug, Serialize)]
struct FilterClause<'a> {
    field: &'a str,
    operator: &'a str,
    negate: bool,
    value_ids: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct FacetSearchBody<'a> {
    term: &'a str,
    sort: &'a str,
    page: u32,
    page_size: u32,
    facet_limit: u32,
    filters: Vec<FilterClause<'a>>,
    /// Visibility groups the result set is restricted to.
    visibility_groups: &'a [Uuid],
    /// Requesting user, for the engine's own request logging.
    on_behalf_of: &'a str,
}

fn build_body<'a>(
    caller: &'a CallerIdentity,
    query: &'a SearchQuery,
    scope: &'a VisibilityScope,
) -> FacetSearchBody<'a> {
    FacetSearchBody {
        term: &query.term,
        sort: query.sort.as_str(),
        page: query.page,
        page_size: query.page_size,
        facet_limit: query.facet_limit,
        filters: query
            .filters
            .iter()
            .map(|f| FilterClause {
                field: &f.field,
                operator: f.operator.as_str(),
                negate: f.negate,
                value_ids: f.values.iter().map(|v| v.id.as_str()).collect(),
            })
            .collect(),
        visibility_groups: &scope.group_ids,
        on_behalf_of: &caller.username,
    }
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    suggestions: Vec<String>,
}

#[async_trait]
impl SearchEngine for HttpSearchEngine {
    async fn facet_search(
        &self,
        caller: &CallerIdentity,
        query: &SearchQuery,
        scope: &VisibilityScope,
    ) -> Result<FacetSearchResponse> {
        let url = format!("{}/api/v1/search", self.base_url);
        let body = build_body(caller, query, scope);

        debug!(
            subsystem = "engine",
            component = "http_client",
            op = "facet_search",
            query = %query.term,
            filter_count = body.filters.len(),
            "Submitting faceted query"
        );

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Error::EngineUnavailable(format!(
                "engine returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.json::<FacetSearchResponse>().await?)
    }

    async fn suggest_similar(
        &self,
        term: &str,
        accuracy: f32,
        fuzzy: bool,
    ) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/suggest", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("term", term),
                ("accuracy", &accuracy.to_string()),
                ("fuzzy", &fuzzy.to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::EngineUnavailable(format!(
                "engine returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.json::<SuggestResponse>().await?.suggestions)
    }
}
