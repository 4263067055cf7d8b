//! HTTP client for the Attune journaling REST API

use crate::error::{ApiError, Result};
use crate::types::{ApiConfig, CreateJournalRequest, ListEntriesOptions};
use attune_types::{
    AnalyticsOverview, Catalog, DateRange, Distribution, DistributionParams, DistributionScope,
    EntryWindow, GrowthIndicators, JournalEntry, NewJournalEntry, StrategyUsage, TemporalPatterns,
};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

/// HTTP client for the Attune REST API
///
/// # Example
///
/// ```rust,no_run
/// use attune_api_client::{ApiClient, ApiConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(ApiConfig {
///     base_url: "http://localhost:8000".into(),
///     user_id: 1,
///     ..Default::default()
/// });
///
/// // Fetch the session catalog
/// let catalog = client.get_catalog().await?;
///
/// // List recent journal entries
/// let entries = client.list_entries(Default::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        if let Some(ref api_key) = config.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                    .expect("Invalid API key"),
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    /// Client configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ==================== Catalog API ====================

    /// Fetch the full catalog (phase order plus layers)
    pub async fn get_catalog(&self) -> Result<Catalog> {
        let url = format!("{}/catalog", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    // ==================== Journal API ====================

    /// Create a new journal entry
    pub async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry> {
        let url = format!("{}/journal", self.config.base_url);
        let body = CreateJournalRequest::from_entry(entry, self.config.user_id);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List journal entries with optional filters, newest first
    pub async fn list_entries(&self, options: ListEntriesOptions) -> Result<Vec<JournalEntry>> {
        let mut url = format!("{}/journal", self.config.base_url);

        let mut params = vec![format!("user_id={}", self.config.user_id)];
        if let Some(from) = options.from {
            params.push(format!("from={}", urlencoding::encode(&from.to_rfc3339())));
        }
        if let Some(to) = options.to {
            params.push(format!("to={}", urlencoding::encode(&to.to_rfc3339())));
        }
        if let Some(strategy_id) = options.strategy_id {
            params.push(format!("strategy_id={}", strategy_id));
        }
        if let Some(limit) = options.limit {
            params.push(format!("limit={}", limit));
        }
        if let Some(offset) = options.offset {
            params.push(format!("offset={}", offset));
        }
        url.push('?');
        url.push_str(&params.join("&"));

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Get a single journal entry by id
    pub async fn get_entry(&self, id: i64) -> Result<JournalEntry> {
        let url = format!("{}/journal/{}", self.config.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("journal entry {}", id)));
        }
        self.handle_response(response).await
    }

    // ==================== Analytics API ====================

    /// Strategy usage over the most recent `limit` entries
    pub async fn strategy_usage(&self, limit: usize) -> Result<StrategyUsage> {
        let url = format!(
            "{}/analytics/strategy-usage?user_id={}&limit={}",
            self.config.base_url, self.config.user_id, limit
        );
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Hourly journaling patterns over a date range
    pub async fn temporal_patterns(&self, range: &DateRange) -> Result<TemporalPatterns> {
        let url = self.range_url("analytics/temporal-patterns", range);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Growth indicators over a date range
    pub async fn growth_indicators(&self, range: &DateRange) -> Result<GrowthIndicators> {
        let url = self.range_url("analytics/growth-indicators", range);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Phase or layer distribution
    pub async fn distribution(&self, params: &DistributionParams) -> Result<Distribution> {
        let scope = match params.scope {
            DistributionScope::Phase => "phase",
            DistributionScope::Layer => "layer",
        };
        let mut url = format!(
            "{}/analytics/distribution/{}?user_id={}",
            self.config.base_url, scope, self.config.user_id
        );
        match params.window {
            EntryWindow::Range(range) => {
                url.push_str(&format!(
                    "&start_date={}&end_date={}",
                    urlencoding::encode(&range.start.to_rfc3339()),
                    urlencoding::encode(&range.end.to_rfc3339()),
                ));
            }
            EntryWindow::Recent { limit } => {
                url.push_str(&format!("&limit={}", limit));
            }
        }

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Aggregate usage overview over a date range
    pub async fn overview(&self, range: &DateRange) -> Result<AnalyticsOverview> {
        let url = self.range_url("analytics/overview", range);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    // ==================== Helper Methods ====================

    fn range_url(&self, path: &str, range: &DateRange) -> String {
        format!(
            "{}/{}?user_id={}&start_date={}&end_date={}",
            self.config.base_url,
            path,
            self.config.user_id,
            urlencoding::encode(&range.start.to_rfc3339()),
            urlencoding::encode(&range.end.to_rfc3339()),
        )
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound("Resource not found".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status,
                message: body,
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}
