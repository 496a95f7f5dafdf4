//! TheMealDB HTTP client

use std::time::Duration;

use async_trait::async_trait;
use larder_core::Recipe;
use reqwest::Client;
use tracing::debug;

use super::types::MealEnvelope;
use crate::providers::{invalid_response, remote_unavailable, request_failed};
use crate::{RemoteSource, SourceResult};

/// Public v1 endpoint with the shared test key.
pub const MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1/";

const PROVIDER: &str = "themealdb";

/// TheMealDB API client.
#[derive(Clone)]
pub struct MealDbClient {
    client: Client,
    base_url: String,
}

impl MealDbClient {
    /// Create a client against the public endpoint.
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout applied by the HTTP client
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        Self::with_base_url(MEALDB_BASE_URL, timeout)
    }

    /// Create a client against a custom endpoint (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| remote_unavailable(PROVIDER, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET an endpoint and decode the meal envelope.
    async fn get_envelope(&self, endpoint: &str, query: &[(&str, &str)]) -> SourceResult<MealEnvelope> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| remote_unavailable(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| remote_unavailable(PROVIDER, format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            };
            return Err(request_failed(PROVIDER, status.as_u16(), message));
        }

        serde_json::from_str(&body)
            .map_err(|e| invalid_response(PROVIDER, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl RemoteSource for MealDbClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_by_id(&self, id: &str) -> SourceResult<Option<Recipe>> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        let envelope = self.get_envelope("lookup.php", &[("i", id)]).await?;
        Ok(envelope.into_first())
    }

    async fn search(&self, term: &str) -> SourceResult<Vec<Recipe>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let envelope = self.get_envelope("search.php", &[("s", term)]).await?;
        Ok(envelope.into_recipes())
    }

    async fn fetch_random(&self) -> SourceResult<Option<Recipe>> {
        let envelope = self.get_envelope("random.php", &[]).await?;
        Ok(envelope.into_first())
    }
}

impl std::fmt::Debug for MealDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealDbClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
