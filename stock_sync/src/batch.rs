//! Bounded-size batch uploads
//!
//! Updates are idempotent per SKU, so a failed chunk never rolls back the
//! ones already sent. Failures are collected with the SKUs they carried so
//! they can be retried by hand or by an outer scheduler.

use marketplace_common::{ReconciledUpdate, Result, SyncError};
use std::future::Future;

/// A chunk that did not reach the marketplace
#[derive(Debug, Clone)]
pub struct FailedBatch {
    /// Zero-based chunk index within the upload
    pub index: usize,
    pub skus: Vec<String>,
    pub error: String,
    /// Resending the same chunk later may succeed
    pub retryable: bool,
}

/// Outcome of one batched upload against one endpoint
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub endpoint: String,
    pub total_chunks: usize,
    pub sent_chunks: usize,
    pub failures: Vec<FailedBatch>,
    /// The marketplace throttled us and the remaining chunks were held back
    pub rate_limited: bool,
    /// SKUs the marketplace accepted the call for but refused to update
    pub rejected_skus: Vec<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.rejected_skus.is_empty()
    }

    /// SKUs from every failed or held-back chunk, then rejected offers
    pub fn failed_skus(&self) -> impl Iterator<Item = &str> {
        self.failures
            .iter()
            .flat_map(|f| f.skus.iter().map(String::as_str))
            .chain(self.rejected_skus.iter().map(String::as_str))
    }
}

/// Split `items` into contiguous chunks of at most `batch_size`
pub fn split_batches<T>(items: &[T], batch_size: usize) -> Result<Vec<&[T]>> {
    if batch_size == 0 {
        return Err(SyncError::Config("batch size must be at least 1".to_string()));
    }
    Ok(items.chunks(batch_size).collect())
}

/// Send `updates` chunk by chunk through `send`.
///
/// Chunks go out strictly one after another. `send` resolves to the SKUs the
/// marketplace rejected inside an otherwise accepted chunk. A failed chunk is
/// recorded and the next one is still sent; a rate-limit response stops the
/// upload and the remaining chunks are recorded as not sent.
pub async fn upload_in_batches<'a, F, Fut>(
    endpoint: &str,
    updates: &'a [ReconciledUpdate],
    batch_size: usize,
    mut send: F,
) -> Result<BatchReport>
where
    F: FnMut(&'a [ReconciledUpdate]) -> Fut,
    Fut: Future<Output = Result<Vec<String>>>,
{
    let chunks = split_batches(updates, batch_size)?;
    let mut report = BatchReport {
        endpoint: endpoint.to_string(),
        total_chunks: chunks.len(),
        sent_chunks: 0,
        failures: Vec::new(),
        rate_limited: false,
        rejected_skus: Vec::new(),
    };

    log::info!(
        "Uploading {} updates to {} in {} batch(es) of up to {}",
        updates.len(),
        endpoint,
        chunks.len(),
        batch_size
    );

    for (index, chunk) in chunks.iter().copied().enumerate() {
        if report.rate_limited {
            report.failures.push(FailedBatch {
                index,
                skus: skus_of(chunk),
                error: "not sent: marketplace rate limit hit earlier".to_string(),
                retryable: true,
            });
            continue;
        }

        log::debug!(
            "{}: sending batch {}/{} ({} items)",
            endpoint,
            index + 1,
            chunks.len(),
            chunk.len()
        );

        match send(chunk).await {
            Ok(rejected) => {
                report.sent_chunks += 1;
                report.rejected_skus.extend(rejected);
            }
            Err(e) => {
                log::error!(
                    "{}: batch {} failed ({} SKUs, first {}): {}",
                    endpoint,
                    index,
                    chunk.len(),
                    chunk.first().map(|u| u.sku.as_str()).unwrap_or("-"),
                    e
                );
                if matches!(e, SyncError::RateLimited { .. }) {
                    log::warn!(
                        "{}: rate limited, holding back remaining batches; lower the batch size or retry later",
                        endpoint
                    );
                    report.rate_limited = true;
                }
                report.failures.push(FailedBatch {
                    index,
                    skus: skus_of(chunk),
                    retryable: e.is_transient(),
                    error: e.to_string(),
                });
            }
        }
    }

    if report.is_complete() {
        log::info!("{}: all {} batch(es) sent", endpoint, report.total_chunks);
    } else {
        log::warn!(
            "{}: {} of {} batch(es) sent, {} failed, {} SKU(s) rejected",
            endpoint,
            report.sent_chunks,
            report.total_chunks,
            report.failures.len(),
            report.rejected_skus.len()
        );
    }

    Ok(report)
}

fn skus_of(chunk: &[ReconciledUpdate]) -> Vec<String> {
    chunk.iter().map(|u| u.sku.clone()).collect()
}
