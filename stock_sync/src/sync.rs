//! Sync pipelines
//!
//! Catalog fetch, feed load, reconciliation and batched upload, strictly in
//! that order. Nothing is kept between runs.

use chrono::Utc;
use marketplace_common::{ReconciledUpdate, Result};

use crate::batch::{upload_in_batches, BatchReport};
use crate::config::{BatchSizes, MarketCampaign, MarketConfig, OzonConfig};
use crate::feed::{FeedLayout, FeedSource};
use crate::marketplace::{Marketplace, OzonClient, YandexMarketClient};
use crate::reconcile::reconcile;

/// What one pipeline run did
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub marketplace: String,
    pub catalog_size: usize,
    pub feed_size: usize,
    pub updates: usize,
    /// Updates with a positive quantity
    pub in_stock: usize,
    pub reports: Vec<BatchReport>,
}

impl SyncSummary {
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|r| !r.is_complete())
    }

    pub fn log(&self) {
        log::info!(
            "{}: {} catalog SKUs, {} feed rows, {} updates ({} in stock)",
            self.marketplace,
            self.catalog_size,
            self.feed_size,
            self.updates,
            self.in_stock
        );
        for report in &self.reports {
            if report.is_complete() {
                log::info!(
                    "  {}: {}/{} batch(es) sent",
                    report.endpoint,
                    report.sent_chunks,
                    report.total_chunks
                );
                continue;
            }
            log::error!(
                "  {}: {}/{} batch(es) sent{}",
                report.endpoint,
                report.sent_chunks,
                report.total_chunks,
                if report.rate_limited {
                    ", rate limited"
                } else {
                    ""
                }
            );
            for failure in &report.failures {
                log::error!(
                    "    batch {} ({} SKUs: {}): {}",
                    failure.index,
                    failure.skus.len(),
                    failure.skus.join(","),
                    failure.error
                );
            }
            if !report.rejected_skus.is_empty() {
                log::error!(
                    "    rejected by marketplace ({} SKUs: {})",
                    report.rejected_skus.len(),
                    report.rejected_skus.join(",")
                );
            }
        }
    }
}

/// Push stocks for every update and prices for the priced ones
pub async fn push_updates<M: Marketplace>(
    market: &M,
    updates: &[ReconciledUpdate],
    sizes: BatchSizes,
) -> Result<Vec<BatchReport>> {
    let stocks = upload_in_batches(
        &format!("{} stocks", market.name()),
        updates,
        sizes.stocks,
        move |chunk| market.push_stocks(chunk),
    )
    .await?;

    let priced: Vec<ReconciledUpdate> = updates
        .iter()
        .filter(|u| u.price.is_some())
        .cloned()
        .collect();
    let prices = upload_in_batches(
        &format!("{} prices", market.name()),
        &priced,
        sizes.prices,
        move |chunk| market.push_prices(chunk),
    )
    .await?;

    Ok(vec![stocks, prices])
}

/// Fetch catalog and feed, reconcile, and push the result to `market`.
///
/// Returns the summary together with the updates so callers can mirror them
/// elsewhere.
pub async fn sync_marketplace<M: Marketplace>(
    market: &M,
    http: &reqwest::Client,
    feed: &FeedSource,
    layout: &FeedLayout,
    sizes: BatchSizes,
) -> Result<(SyncSummary, Vec<ReconciledUpdate>)> {
    log::info!("Starting {} sync...", market.name());

    let catalog = market.fetch_catalog().await?;
    let records = feed.load(http, layout).await?;
    let updates = reconcile(&catalog, &records)?;

    let reports = push_updates(market, &updates, sizes).await?;

    let summary = SyncSummary {
        marketplace: market.name().to_string(),
        catalog_size: catalog.len(),
        feed_size: records.len(),
        updates: updates.len(),
        in_stock: updates.iter().filter(|u| u.in_stock()).count(),
        reports,
    };
    Ok((summary, updates))
}

pub async fn run_ozon(config: &OzonConfig, http: &reqwest::Client) -> Result<SyncSummary> {
    let ozon = OzonClient::new(
        http.clone(),
        config.client_id.clone(),
        config.seller_token.clone(),
    )
    .with_base_url(&config.api_url);

    let (summary, _) = sync_marketplace(
        &ozon,
        http,
        &config.feed,
        &config.layout,
        config.batch_sizes,
    )
    .await?;
    Ok(summary)
}

/// Sync the primary campaign, then copy the same updates to the DBS mirror
pub async fn run_market(config: &MarketConfig, http: &reqwest::Client) -> Result<SyncSummary> {
    let updated_at = Utc::now();
    let client_for = |campaign: &MarketCampaign| {
        YandexMarketClient::new(
            http.clone(),
            config.token.clone(),
            campaign.id.clone(),
            campaign.kind,
            campaign.warehouse_id,
            updated_at,
        )
        .with_base_url(&config.api_url)
    };

    let primary = client_for(&config.campaign);
    let (mut summary, updates) = sync_marketplace(
        &primary,
        http,
        &config.feed,
        &config.layout,
        config.batch_sizes,
    )
    .await?;

    if let Some(dbs) = &config.dbs_mirror {
        let mirror = client_for(dbs);
        log::info!(
            "Mirroring {} updates from {} to {}",
            updates.len(),
            primary.name(),
            mirror.name()
        );
        let reports = push_updates(&mirror, &updates, config.batch_sizes).await?;
        summary.reports.extend(reports);
    }

    Ok(summary)
}
