//! Delimited stock file parsing

use marketplace_common::{FeedRecord, RawQuantity, Result, SyncError};

/// Shape of the vendor's stock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLayout {
    pub delimiter: u8,
    /// Banner lines before the header row
    pub skip_rows: usize,
    pub sku_column: String,
    pub quantity_column: String,
    pub price_column: String,
}

impl Default for FeedLayout {
    fn default() -> Self {
        Self {
            delimiter: b';',
            skip_rows: 0,
            sku_column: "Код".to_string(),
            quantity_column: "Количество".to_string(),
            price_column: "Цена".to_string(),
        }
    }
}

/// Parse a stock file into feed records.
///
/// Rows with an empty SKU cell are skipped. Quantity and price cells are kept
/// verbatim; normalization happens during reconciliation.
pub fn parse_feed(data: &[u8], layout: &FeedLayout) -> Result<Vec<FeedRecord>> {
    let body = skip_lines(data, layout.skip_rows);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let header_line = layout.skip_rows + 1;
    let headers = reader
        .headers()
        .map_err(|e| csv_error(e, layout.skip_rows))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SyncError::FeedParse {
                location: format!("line {}", header_line),
                reason: format!("missing column '{}'", name),
            })
    };
    let sku_idx = column(&layout.sku_column)?;
    let quantity_idx = column(&layout.quantity_column)?;
    let price_idx = column(&layout.price_column)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| csv_error(e, layout.skip_rows))?;
        let sku = row.get(sku_idx).unwrap_or_default();
        if sku.is_empty() {
            continue;
        }

        let line = row
            .position()
            .map(|p| p.line() as usize + layout.skip_rows)
            .unwrap_or(0);
        let cell = |idx: usize, name: &str| {
            row.get(idx).ok_or_else(|| SyncError::FeedParse {
                location: format!("line {}", line),
                reason: format!("row for SKU {} has no '{}' cell", sku, name),
            })
        };

        let quantity = cell(quantity_idx, &layout.quantity_column)?;
        let price = cell(price_idx, &layout.price_column)?;

        records.push(FeedRecord {
            sku: sku.to_string(),
            raw_quantity: RawQuantity::Text(quantity.to_string()),
            raw_price: price.to_string(),
        });
    }

    log::debug!("Parsed {} feed rows", records.len());
    Ok(records)
}

/// Drop the first `count` lines of the input
fn skip_lines(data: &[u8], count: usize) -> &[u8] {
    let mut rest = data;
    for _ in 0..count {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &[],
        }
    }
    rest
}

fn csv_error(err: csv::Error, skipped: usize) -> SyncError {
    let location = match err.position() {
        Some(pos) => format!("line {}", pos.line() as usize + skipped),
        None => "feed".to_string(),
    };
    SyncError::FeedParse {
        location,
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
