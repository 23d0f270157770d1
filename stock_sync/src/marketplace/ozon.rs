//! Ozon Seller API client

use marketplace_common::{CatalogEntry, ReconciledUpdate, Result};
use serde::{Deserialize, Serialize};

use super::{check_response, Marketplace};

pub const OZON_API_URL: &str = "https://api-seller.ozon.ru";

/// Products per catalog page (API maximum)
const PRODUCT_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Serialize)]
struct ProductListRequest<'a> {
    filter: ProductFilter,
    last_id: &'a str,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ProductFilter {
    visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    result: ProductListPage,
}

#[derive(Debug, Deserialize)]
struct ProductListPage {
    #[serde(default)]
    items: Vec<ProductItem>,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    last_id: String,
}

#[derive(Debug, Deserialize)]
struct ProductItem {
    offer_id: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    stocks: Vec<StockItem<'a>>,
}

#[derive(Debug, Serialize)]
struct StockItem<'a> {
    offer_id: &'a str,
    stock: u32,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    prices: Vec<PriceItem<'a>>,
}

#[derive(Debug, Serialize)]
struct PriceItem<'a> {
    auto_action_enabled: &'static str,
    currency_code: &'static str,
    offer_id: &'a str,
    old_price: &'static str,
    price: String,
}

/// Per-offer outcome of an import call
#[derive(Debug, Default, Deserialize)]
struct ImportResponse {
    #[serde(default)]
    result: Vec<ImportResult>,
}

#[derive(Debug, Deserialize)]
struct ImportResult {
    offer_id: String,
    #[serde(default)]
    updated: bool,
    #[serde(default)]
    errors: Vec<ImportError>,
}

#[derive(Debug, Deserialize)]
struct ImportError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Ozon Seller API client for one seller account
pub struct OzonClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    client_id: String,
    api_key: String,
}

impl OzonClient {
    pub fn new(client: reqwest::Client, client_id: String, api_key: String) -> Self {
        log::info!("Creating Ozon API client for client id {}", client_id);
        Self {
            client,
            base_url: OZON_API_URL.to_string(),
            client_id,
            api_key,
        }
    }

    /// Point the client at another host (staging, mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post<T: Serialize>(&self, route: &str, body: &T) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, route);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        check_response(response).await
    }

    /// Offers Ozon accepted the call for but refused to update
    async fn rejected_offers(
        &self,
        kind: &str,
        response: reqwest::Response,
    ) -> Result<Vec<String>> {
        let body = response.text().await?;
        let parsed: ImportResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            log::debug!("Unrecognised {} import response ({}): {}", kind, e, body);
            ImportResponse::default()
        });

        let mut rejected = Vec::new();
        for item in parsed.result.into_iter().filter(|r| !r.updated) {
            let reasons: Vec<String> = item
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            log::warn!(
                "Ozon rejected {} update for {}: {}",
                kind,
                item.offer_id,
                reasons.join("; ")
            );
            rejected.push(item.offer_id);
        }
        Ok(rejected)
    }
}

impl Marketplace for OzonClient {
    fn name(&self) -> &str {
        "ozon"
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        log::info!("Fetching Ozon product list...");

        let mut entries = Vec::new();
        let mut last_id = String::new();
        loop {
            let request = ProductListRequest {
                filter: ProductFilter { visibility: "ALL" },
                last_id: &last_id,
                limit: PRODUCT_PAGE_LIMIT,
            };
            let page: ProductListResponse = self
                .post("/v2/product/list", &request)
                .await?
                .json()
                .await?;

            let fetched = page.result.items.len();
            entries.extend(
                page.result
                    .items
                    .into_iter()
                    .map(|item| CatalogEntry::new(item.offer_id)),
            );
            log::debug!(
                "Fetched {} products ({} of {})",
                fetched,
                entries.len(),
                page.result.total
            );

            if fetched == 0 || entries.len() >= page.result.total {
                break;
            }
            last_id = page.result.last_id;
        }

        log::info!("Fetched {} Ozon products", entries.len());
        Ok(entries)
    }

    async fn push_stocks(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>> {
        let request = StocksRequest {
            stocks: updates
                .iter()
                .map(|u| StockItem {
                    offer_id: &u.sku,
                    stock: u.quantity,
                })
                .collect(),
        };
        let response = self.post("/v1/product/import/stocks", &request).await?;
        self.rejected_offers("stock", response).await
    }

    async fn push_prices(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>> {
        let request = PricesRequest {
            prices: updates
                .iter()
                .filter_map(|u| {
                    u.price.map(|price| PriceItem {
                        auto_action_enabled: "UNKNOWN",
                        currency_code: "RUB",
                        offer_id: &u.sku,
                        old_price: "0",
                        price: price.to_string(),
                    })
                })
                .collect(),
        };
        let response = self.post("/v1/product/import/prices", &request).await?;
        self.rejected_offers("price", response).await
    }
}

#[cfg(test)]
#[path = "ozon_tests.rs"]
mod tests;
