//! Typed run configuration built from the command line

use marketplace_common::{Result, SyncError};

use crate::feed::{FeedLayout, FeedSource};
use crate::marketplace::CampaignType;

/// Vendor archive with current stock and prices
pub const DEFAULT_FEED_URL: &str = "https://timeworld.ru/upload/files/ostatki.zip";

pub const OZON_STOCK_BATCH: usize = 100;
pub const OZON_PRICE_BATCH: usize = 1000;
pub const MARKET_STOCK_BATCH: usize = 2000;
pub const MARKET_PRICE_BATCH: usize = 500;

/// Maximum records per update call, per endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSizes {
    pub stocks: usize,
    pub prices: usize,
}

impl BatchSizes {
    pub fn validate(&self) -> Result<()> {
        if self.stocks == 0 || self.prices == 0 {
            return Err(SyncError::Config(format!(
                "batch sizes must be at least 1 (stocks: {}, prices: {})",
                self.stocks, self.prices
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OzonConfig {
    pub client_id: String,
    pub seller_token: String,
    pub api_url: String,
    pub feed: FeedSource,
    pub layout: FeedLayout,
    pub batch_sizes: BatchSizes,
}

/// A Market campaign together with the warehouse its stock belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCampaign {
    pub id: String,
    pub kind: CampaignType,
    pub warehouse_id: u64,
}

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub token: String,
    pub api_url: String,
    pub campaign: MarketCampaign,
    /// DBS campaign receiving a copy of the FBS updates
    pub dbs_mirror: Option<MarketCampaign>,
    pub feed: FeedSource,
    pub layout: FeedLayout,
    pub batch_sizes: BatchSizes,
}

impl MarketConfig {
    /// Pair the primary campaign with an optional DBS mirror.
    ///
    /// Mirroring only exists for an FBS primary; asking for a DBS copy of a DBS
    /// campaign is a configuration error, as is a DBS id without a warehouse.
    pub fn mirror_target(
        campaign: &MarketCampaign,
        dbs_id: Option<String>,
        dbs_warehouse_id: Option<u64>,
    ) -> Result<Option<MarketCampaign>> {
        match (dbs_id, dbs_warehouse_id) {
            (None, None) => Ok(None),
            (Some(_), _) | (_, Some(_)) if campaign.kind != CampaignType::Fbs => {
                Err(SyncError::Config(
                    "DBS mirroring requires an FBS primary campaign".to_string(),
                ))
            }
            (Some(id), Some(warehouse_id)) => Ok(Some(MarketCampaign {
                id,
                kind: CampaignType::Dbs,
                warehouse_id,
            })),
            (Some(_), None) => Err(SyncError::Config(
                "DBS campaign id given without a DBS warehouse id".to_string(),
            )),
            (None, Some(_)) => Err(SyncError::Config(
                "DBS warehouse id given without a DBS campaign id".to_string(),
            )),
        }
    }
}
