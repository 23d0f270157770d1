//! Marketplace API clients (Ozon Seller API, Yandex Market Partner API)

mod ozon;
mod yandex_market;

pub use ozon::{OzonClient, OZON_API_URL};
pub use yandex_market::{CampaignType, YandexMarketClient, MARKET_API_URL};

use marketplace_common::{CatalogEntry, ReconciledUpdate, Result, SyncError};
use std::time::Duration;

/// A store on a marketplace that accepts stock and price updates
///
/// Implementations issue exactly one HTTP call per `push_*` invocation;
/// batching is the caller's job.
#[allow(async_fn_in_trait)]
pub trait Marketplace {
    /// Human-readable label used in logs and batch reports
    fn name(&self) -> &str;

    /// Every SKU currently registered in the store, all pages
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;

    /// Resolves to the SKUs the marketplace refused to update
    async fn push_stocks(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>>;

    /// Updates without a price must be filtered out by the caller
    async fn push_prices(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>>;
}

/// Build the shared HTTP client with a per-request timeout
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("stock_sync/1.0")
        .build()?;
    Ok(client)
}

/// Map non-success responses onto `SyncError`
pub(crate) async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(SyncError::RateLimited { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("Error response body: {}", body);
    Err(SyncError::HttpStatus { status, body })
}
