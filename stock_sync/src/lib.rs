//! Stock Sync - vendor stock to marketplace
//!
//! This application reads the vendor's stock feed, reconciles it against the
//! Ozon and Yandex Market catalogs and pushes stock and price updates in
//! bounded batches.

pub mod batch;
pub mod cli;
pub mod config;
pub mod feed;
pub mod marketplace;
pub mod reconcile;
pub mod sync;

pub use batch::{split_batches, upload_in_batches, BatchReport, FailedBatch};
pub use config::{BatchSizes, MarketCampaign, MarketConfig, OzonConfig};
pub use feed::{FeedLayout, FeedSource};
pub use marketplace::{build_http_client, CampaignType, Marketplace, OzonClient, YandexMarketClient};
pub use marketplace_common::{
    CatalogEntry, FeedRecord, RawQuantity, ReconciledUpdate, Result, SyncError,
};
pub use reconcile::{clean_price, normalize_quantity, reconcile};
pub use sync::{push_updates, run_market, run_ozon, sync_marketplace, SyncSummary};
