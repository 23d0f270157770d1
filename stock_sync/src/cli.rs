//! Command line interface
//!
//! Every credential can come from the environment (or a `.env` file) so the
//! tool runs unchanged from cron.

use clap::{Args as ClapArgs, Parser, Subcommand};
use marketplace_common::{Result, SyncError};

use crate::config::{
    BatchSizes, MarketCampaign, MarketConfig, OzonConfig, DEFAULT_FEED_URL, MARKET_PRICE_BATCH,
    MARKET_STOCK_BATCH, OZON_PRICE_BATCH, OZON_STOCK_BATCH,
};
use crate::feed::{FeedLayout, FeedSource};
use crate::marketplace::{CampaignType, MARKET_API_URL, OZON_API_URL};

/// Push vendor stock and prices to Ozon and Yandex Market
#[derive(Parser, Debug)]
#[command(name = "stock_sync")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync the Ozon store from the vendor stock archive
    Ozon(OzonArgs),
    /// Sync a Yandex Market campaign (and its DBS pair) from a warehouse listing
    Market(MarketArgs),
}

/// Layout of the delimited stock file
#[derive(ClapArgs, Debug)]
pub struct FeedArgs {
    /// File inside the archive holding the stock table (default: first .csv/.txt)
    #[arg(long)]
    pub feed_entry: Option<String>,

    /// Column delimiter
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Banner lines before the header row
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    #[arg(long, default_value = "Код")]
    pub sku_column: String,

    #[arg(long, default_value = "Количество")]
    pub quantity_column: String,

    #[arg(long, default_value = "Цена")]
    pub price_column: String,
}

impl FeedArgs {
    fn layout(&self) -> Result<FeedLayout> {
        if !self.delimiter.is_ascii() {
            return Err(SyncError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        Ok(FeedLayout {
            delimiter: self.delimiter as u8,
            skip_rows: self.skip_rows,
            sku_column: self.sku_column.clone(),
            quantity_column: self.quantity_column.clone(),
            price_column: self.price_column.clone(),
        })
    }
}

#[derive(ClapArgs, Debug)]
pub struct OzonArgs {
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "SELLER_TOKEN", hide_env_values = true)]
    pub seller_token: String,

    /// Stock archive URL or local path
    #[arg(long, env = "STOCK_FEED", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    #[arg(long, default_value = OZON_API_URL)]
    pub api_url: String,

    #[arg(long, default_value_t = OZON_STOCK_BATCH)]
    pub stock_batch_size: usize,

    #[arg(long, default_value_t = OZON_PRICE_BATCH)]
    pub price_batch_size: usize,

    #[command(flatten)]
    pub feed_layout: FeedArgs,
}

impl OzonArgs {
    pub fn into_config(self) -> Result<OzonConfig> {
        let batch_sizes = BatchSizes {
            stocks: self.stock_batch_size,
            prices: self.price_batch_size,
        };
        batch_sizes.validate()?;

        Ok(OzonConfig {
            layout: self.feed_layout.layout()?,
            feed: FeedSource::from_location(&self.feed_url, self.feed_layout.feed_entry),
            client_id: self.client_id,
            seller_token: self.seller_token,
            api_url: self.api_url,
            batch_sizes,
        })
    }
}

#[derive(ClapArgs, Debug)]
pub struct MarketArgs {
    #[arg(long, env = "MARKET_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Primary campaign id (FBS unless --campaign-type says otherwise)
    #[arg(long, env = "FBS_ID")]
    pub fbs_id: String,

    #[arg(long, value_enum, default_value_t = CampaignType::Fbs)]
    pub campaign_type: CampaignType,

    /// Warehouse of the primary campaign
    #[arg(long, env = "WAREHOUSE_FBS_ID")]
    pub warehouse_fbs_id: u64,

    /// DBS campaign mirroring the FBS updates
    #[arg(long, env = "DBS_ID")]
    pub dbs_id: Option<String>,

    #[arg(long, env = "WAREHOUSE_DBS_ID")]
    pub warehouse_dbs_id: Option<u64>,

    /// Warehouse listing: local path (plain or .zip) or archive URL
    #[arg(long, env = "STOCK_FEED")]
    pub feed: String,

    #[arg(long, default_value = MARKET_API_URL)]
    pub api_url: String,

    #[arg(long, default_value_t = MARKET_STOCK_BATCH)]
    pub stock_batch_size: usize,

    #[arg(long, default_value_t = MARKET_PRICE_BATCH)]
    pub price_batch_size: usize,

    #[command(flatten)]
    pub feed_layout: FeedArgs,
}

impl MarketArgs {
    pub fn into_config(self) -> Result<MarketConfig> {
        let batch_sizes = BatchSizes {
            stocks: self.stock_batch_size,
            prices: self.price_batch_size,
        };
        batch_sizes.validate()?;

        let campaign = MarketCampaign {
            id: self.fbs_id,
            kind: self.campaign_type,
            warehouse_id: self.warehouse_fbs_id,
        };
        let dbs_mirror =
            MarketConfig::mirror_target(&campaign, self.dbs_id, self.warehouse_dbs_id)?;

        Ok(MarketConfig {
            layout: self.feed_layout.layout()?,
            feed: FeedSource::from_location(&self.feed, self.feed_layout.feed_entry),
            token: self.token,
            api_url: self.api_url,
            campaign,
            dbs_mirror,
            batch_sizes,
        })
    }
}
