//! Steam storefront adapter.
//!
//! One fetch combines three lookups issued concurrently:
//! - `/api/appdetails` for name, header image and price overview
//! - `/appreviews/{id}` for the aggregate review summary
//! - the localized store page, scraped for the recent-review row
//!
//! Only the app details lookup is required. Either review lookup failing
//! falls back to "no data".

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use steamwatch_core::{FetchedState, NO_REVIEW_DATA, ReviewSummary, format_review};
use tracing::{debug, warn};

use crate::scrape::extract_recent_review;
use crate::{Provider, ProviderError};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const AGE_GATE_COOKIE: &str = "birthtime=631152000; lastagecheckage=18; mature_content=1";

/// Steam endpoint and locale settings.
#[derive(Debug, Clone)]
pub struct SteamConfig {
    /// Store root, without trailing slash.
    pub base_url: String,
    /// Country code for pricing (`cc`).
    pub country: String,
    /// Store language (`l`).
    pub language: String,
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://store.steampowered.com".into(),
            country: "jp".into(),
            language: "japanese".into(),
        }
    }
}

/// [`Provider`] backed by the public Steam store endpoints.
pub struct SteamProvider {
    client: reqwest::Client,
    config: SteamConfig,
}

#[derive(Deserialize)]
struct AppDetailsEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct AppData {
    name: String,
    header_image: Option<String>,
    price_overview: Option<PriceOverview>,
}

/// Amounts are integer minor currency units.
#[derive(Deserialize)]
struct PriceOverview {
    #[serde(rename = "final")]
    final_price: u64,
    initial: u64,
    discount_percent: u8,
}

#[derive(Deserialize)]
struct ReviewsResponse {
    success: i64,
    query_summary: Option<QuerySummary>,
}

#[derive(Deserialize)]
struct QuerySummary {
    #[serde(default)]
    review_score_desc: String,
    #[serde(default)]
    total_positive: u64,
    #[serde(default)]
    total_reviews: u64,
}

impl SteamProvider {
    pub fn new(mut config: SteamConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }

    async fn app_details(&self, app_id: &str) -> Result<AppData, ProviderError> {
        let url = format!("{}/api/appdetails", self.config.base_url);
        let request = self.client.get(&url).query(&[
            ("appids", app_id),
            ("cc", self.config.country.as_str()),
            ("l", self.config.language.as_str()),
        ]);
        let body = self.get_text(request).await?;
        let mut envelopes: HashMap<String, AppDetailsEnvelope> = serde_json::from_str(&body)?;
        match envelopes.remove(app_id) {
            Some(AppDetailsEnvelope {
                success: true,
                data: Some(data),
            }) => Ok(serde_json::from_value(data)?),
            _ => Err(ProviderError::ItemNotFound(app_id.to_string())),
        }
    }

    async fn overall_review(&self, app_id: &str) -> Result<Option<ReviewSummary>, ProviderError> {
        let url = format!("{}/appreviews/{app_id}", self.config.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("json", "1"), ("language", "all")]);
        let body = self.get_text(request).await?;
        let parsed: ReviewsResponse = serde_json::from_str(&body)?;
        if parsed.success != 1 {
            return Ok(None);
        }
        Ok(parsed.query_summary.and_then(|q| {
            ReviewSummary::from_counts(&q.review_score_desc, q.total_positive, q.total_reviews)
        }))
    }

    async fn recent_review(&self, app_id: &str) -> Result<Option<ReviewSummary>, ProviderError> {
        let url = format!("{}/app/{app_id}/", self.config.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("l", self.config.language.as_str()), ("agecheck", "1")])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(reqwest::header::COOKIE, AGE_GATE_COOKIE);
        let html = self.get_text(request).await?;
        Ok(extract_recent_review(&html))
    }
}

#[async_trait]
impl Provider for SteamProvider {
    async fn fetch_state(&self, app_id: &str) -> Result<FetchedState, ProviderError> {
        let (details, overall, recent) = tokio::join!(
            self.app_details(app_id),
            self.overall_review(app_id),
            self.recent_review(app_id),
        );
        let details = details?;

        let overall = overall.unwrap_or_else(|e| {
            warn!(app_id, error = %e, "overall review lookup failed");
            None
        });
        let recent = recent.unwrap_or_else(|e| {
            warn!(app_id, error = %e, "store page lookup failed");
            None
        });

        let (price, original_price, sale_percent) = match &details.price_overview {
            Some(p) => (
                Some(minor_to_major(p.final_price)),
                Some(minor_to_major(p.initial)),
                Some(p.discount_percent),
            ),
            None => (None, None, None),
        };

        let state = FetchedState {
            title: details.name,
            price,
            original_price,
            sale_percent,
            overall_review: format_review(overall.as_ref(), NO_REVIEW_DATA),
            recent_review: recent
                .as_ref()
                .filter(|r| !r.summary.is_empty())
                .map(|r| format_review(Some(r), "")),
            cover_image: details.header_image.as_deref().map(strip_query),
        };
        debug!(app_id, title = %state.title, price = ?state.price, "fetched Steam state");
        Ok(state)
    }
}

fn minor_to_major(amount: u64) -> f64 {
    amount as f64 / 100.0
}

fn strip_query(url: &str) -> String {
    url.split(['?', '#']).next().unwrap_or(url).to_string()
}
