//! Feed/catalog reconciliation
//!
//! Joins the vendor feed against the marketplace catalog and turns raw feed
//! cells into the quantities and prices the marketplaces accept.

use marketplace_common::{
    CatalogEntry, FeedRecord, RawQuantity, ReconciledUpdate, Result, SyncError,
};
use std::collections::HashSet;

/// Displayed stock for anything above `STOCK_CAP_THRESHOLD` units
pub const STOCK_CAP: u32 = 100;
pub const STOCK_CAP_THRESHOLD: u64 = 10;

/// Build one update per catalog SKU.
///
/// Matched SKUs keep feed order and carry a cleaned price; catalog SKUs
/// missing from the feed follow in catalog order with zero stock and no
/// price. Feed rows for SKUs outside the catalog are dropped. When the feed
/// lists a SKU twice the first row wins.
pub fn reconcile(catalog: &[CatalogEntry], feed: &[FeedRecord]) -> Result<Vec<ReconciledUpdate>> {
    let known: HashSet<&str> = catalog.iter().map(|e| e.sku.as_str()).collect();
    let mut emitted: HashSet<&str> = HashSet::with_capacity(known.len());
    let mut updates = Vec::with_capacity(known.len());
    let mut ignored = 0usize;

    for record in feed {
        let sku = record.sku.as_str();
        if !known.contains(sku) {
            ignored += 1;
            continue;
        }
        if !emitted.insert(sku) {
            log::debug!("Duplicate feed row for {} ignored", sku);
            continue;
        }

        updates.push(ReconciledUpdate {
            sku: record.sku.clone(),
            quantity: normalize_quantity(sku, &record.raw_quantity)?,
            price: Some(clean_price(sku, &record.raw_price)?),
        });
    }

    let matched = updates.len();
    for entry in catalog {
        if emitted.insert(entry.sku.as_str()) {
            updates.push(ReconciledUpdate {
                sku: entry.sku.clone(),
                quantity: 0,
                price: None,
            });
        }
    }

    log::info!(
        "Reconciled {} SKUs ({} from feed, {} missing from feed, {} feed rows not in catalog)",
        updates.len(),
        matched,
        updates.len() - matched,
        ignored
    );

    Ok(updates)
}

/// Map a raw feed quantity onto the stock shown on the marketplace.
///
/// - more than 10 units (including the vendor's `>10` marker) shows as 100
/// - a single unit is unreliable and shows as 0
/// - 0 and 2..=10 pass through
pub fn normalize_quantity(sku: &str, raw: &RawQuantity) -> Result<u32> {
    let count = match raw {
        RawQuantity::Count(n) => u64::try_from(*n).ok(),
        RawQuantity::Text(text) => parse_count(text.trim()),
    };

    let Some(count) = count else {
        return Err(SyncError::FeedParse {
            location: format!("SKU {}", sku),
            reason: format!("invalid quantity {:?}", raw.to_string()),
        });
    };

    Ok(match count {
        1 => 0,
        n if n > STOCK_CAP_THRESHOLD => STOCK_CAP,
        // 0 and 2..=10
        n => n as u32,
    })
}

/// `>N` reads as "at least N + 1". Only the over-threshold marker is known;
/// a smaller bound like `>1` says nothing about the real count.
fn parse_count(text: &str) -> Option<u64> {
    match text.strip_prefix('>') {
        Some(rest) => {
            let bound = rest.trim().parse::<u64>().ok()?;
            if bound < STOCK_CAP_THRESHOLD {
                return None;
            }
            bound.checked_add(1)
        }
        None => text.parse::<u64>().ok(),
    }
}

/// Turn a vendor price label into an integer amount.
///
/// Currency symbols, whitespace and apostrophes are dropped. The last `.` or
/// `,` is the decimal point when one or two digits follow it; every other
/// separator must group exactly three digits. Fractions are truncated, and a
/// separator right before the first digit (`.50`) leaves an integer part of
/// zero. A price that cleans to nothing, or to zero, is an error.
pub fn clean_price(sku: &str, raw: &str) -> Result<u64> {
    let invalid = || SyncError::PriceFormat {
        sku: sku.to_string(),
        raw: raw.to_string(),
    };

    let start = raw.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
    let end = raw.rfind(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;

    // bare fraction, integer part is 0
    if raw[..start].ends_with(['.', ',']) {
        return Err(invalid());
    }

    let kept: String = raw[start..=end]
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let mut groups: Vec<&str> = kept.split(['.', ',']).collect();
    if groups.len() > 1 {
        let last = groups.len() - 1;
        if (1..=2).contains(&groups[last].len()) {
            // fractional part, truncated
            groups.truncate(last);
        }
    }

    let (first, thousands) = groups.split_first().ok_or_else(invalid)?;
    if first.is_empty() || thousands.iter().any(|g| g.len() != 3) {
        return Err(invalid());
    }

    let value = groups
        .concat()
        .parse::<u64>()
        .map_err(|_| invalid())?;

    if value == 0 {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
