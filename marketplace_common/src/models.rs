//! Data model shared between the feed loader, reconciler and uploaders

use serde::{Deserialize, Serialize};
use std::fmt;

/// A product registered in the marketplace store. Identity only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub sku: String,
}

impl CatalogEntry {
    pub fn new(sku: impl Into<String>) -> Self {
        Self { sku: sku.into() }
    }
}

/// Quantity cell as it appears in the vendor feed, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Count(i64),
    Text(String),
}

impl fmt::Display for RawQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawQuantity::Count(n) => write!(f, "{}", n),
            RawQuantity::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RawQuantity {
    fn from(value: &str) -> Self {
        RawQuantity::Text(value.to_string())
    }
}

impl From<i64> for RawQuantity {
    fn from(value: i64) -> Self {
        RawQuantity::Count(value)
    }
}

/// One stock row extracted from the external feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub sku: String,
    pub raw_quantity: RawQuantity,
    pub raw_price: String,
}

impl FeedRecord {
    pub fn new(
        sku: impl Into<String>,
        raw_quantity: impl Into<RawQuantity>,
        raw_price: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            raw_quantity: raw_quantity.into(),
            raw_price: raw_price.into(),
        }
    }
}

/// The unit pushed to a marketplace
///
/// `price` is `None` for catalog products missing from the feed: their stock
/// is zeroed but their price is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledUpdate {
    pub sku: String,
    pub quantity: u32,
    pub price: Option<u64>,
}

impl ReconciledUpdate {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}
