//! Yandex Market Partner API client

use chrono::{DateTime, SecondsFormat, Utc};
use marketplace_common::{CatalogEntry, ReconciledUpdate, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{check_response, Marketplace};

pub const MARKET_API_URL: &str = "https://api.partner.market.yandex.ru";

/// Offers per catalog page
const OFFER_PAGE_LIMIT: u32 = 200;

/// Fulfillment model of a Market campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CampaignType {
    /// Fulfillment by seller
    Fbs,
    /// Delivery by seller
    Dbs,
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignType::Fbs => write!(f, "FBS"),
            CampaignType::Dbs => write!(f, "DBS"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OfferMappingResponse {
    result: OfferMappingPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferMappingPage {
    #[serde(default)]
    offer_mapping_entries: Vec<OfferMappingEntry>,
    #[serde(default)]
    paging: Paging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OfferMappingEntry {
    offer: Offer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Offer {
    shop_sku: String,
}

#[derive(Debug, Serialize)]
struct StocksRequest<'a> {
    skus: Vec<SkuStock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkuStock<'a> {
    sku: &'a str,
    warehouse_id: u64,
    items: [StockCount<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockCount<'a> {
    count: u32,
    #[serde(rename = "type")]
    kind: &'static str,
    updated_at: &'a str,
}

#[derive(Debug, Serialize)]
struct PricesRequest<'a> {
    offers: Vec<OfferPrice<'a>>,
}

#[derive(Debug, Serialize)]
struct OfferPrice<'a> {
    id: &'a str,
    price: PriceValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceValue {
    value: u64,
    currency_id: &'static str,
}

/// Yandex Market client bound to a single campaign and its warehouse
pub struct YandexMarketClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    token: String,
    campaign_id: String,
    campaign_type: CampaignType,
    warehouse_id: u64,
    /// Stock timestamp shared by every batch of a run
    updated_at: String,
    label: String,
}

impl YandexMarketClient {
    pub fn new(
        client: reqwest::Client,
        token: String,
        campaign_id: String,
        campaign_type: CampaignType,
        warehouse_id: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        log::info!(
            "Creating Yandex Market client for {} campaign {} (warehouse {})",
            campaign_type,
            campaign_id,
            warehouse_id
        );
        let label = format!("market {} {}", campaign_type, campaign_id);
        Self {
            client,
            base_url: MARKET_API_URL.to_string(),
            token,
            campaign_id,
            campaign_type,
            warehouse_id,
            updated_at: updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            label,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn campaign_type(&self) -> CampaignType {
        self.campaign_type
    }

    fn campaign_url(&self, route: &str) -> String {
        format!("{}/campaigns/{}/{}", self.base_url, self.campaign_id, route)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        log::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

impl Marketplace for YandexMarketClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        log::info!("Fetching offers for campaign {}...", self.campaign_id);

        let url = self.campaign_url("offer-mapping-entries");
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .request(reqwest::Method::GET, &url)
                .query(&[("limit", OFFER_PAGE_LIMIT.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("page_token", token)]);
            }

            let page: OfferMappingResponse = check_response(request.send().await?)
                .await?
                .json()
                .await?;

            entries.extend(
                page.result
                    .offer_mapping_entries
                    .into_iter()
                    .map(|e| CatalogEntry::new(e.offer.shop_sku)),
            );
            log::debug!("Fetched {} offers so far", entries.len());

            match page.result.paging.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::info!(
            "Fetched {} offers for campaign {}",
            entries.len(),
            self.campaign_id
        );
        Ok(entries)
    }

    async fn push_stocks(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>> {
        let request = StocksRequest {
            skus: updates
                .iter()
                .map(|u| SkuStock {
                    sku: &u.sku,
                    warehouse_id: self.warehouse_id,
                    items: [StockCount {
                        count: u.quantity,
                        kind: "FIT",
                        updated_at: &self.updated_at,
                    }],
                })
                .collect(),
        };

        let url = self.campaign_url("offers/stocks");
        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&request)
            .send()
            .await?;
        check_response(response).await?;
        Ok(Vec::new())
    }

    async fn push_prices(&self, updates: &[ReconciledUpdate]) -> Result<Vec<String>> {
        let request = PricesRequest {
            offers: updates
                .iter()
                .filter_map(|u| {
                    u.price.map(|value| OfferPrice {
                        id: &u.sku,
                        price: PriceValue {
                            value,
                            currency_id: "RUR",
                        },
                    })
                })
                .collect(),
        };

        let url = self.campaign_url("offer-prices/updates");
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&request)
            .send()
            .await?;
        check_response(response).await?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "yandex_market_tests.rs"]
mod tests;
