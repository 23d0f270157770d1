//! Vendor stock feed loading
//!
//! A feed is either a zip archive downloaded over HTTP or a warehouse listing
//! on disk. Both end up as a delimited stock file parsed into `FeedRecord`s.

mod archive;
mod parser;

pub use archive::{download_archive, extract_stock_file};
pub use parser::{parse_feed, FeedLayout};

use marketplace_common::{FeedRecord, Result};
use std::path::{Path, PathBuf};

/// Where the stock feed comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Zip archive published by the vendor
    Archive { url: String, entry: Option<String> },
    /// Local warehouse listing, plain delimited file or zip archive
    LocalFile { path: PathBuf, entry: Option<String> },
}

impl FeedSource {
    /// Pick the source kind from a location string: http(s) URLs are
    /// downloaded, anything else is read from disk.
    pub fn from_location(location: &str, entry: Option<String>) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            FeedSource::Archive {
                url: location.to_string(),
                entry,
            }
        } else {
            FeedSource::LocalFile {
                path: PathBuf::from(location),
                entry,
            }
        }
    }

    /// Fetch and parse the feed
    pub async fn load(
        &self,
        client: &reqwest::Client,
        layout: &FeedLayout,
    ) -> Result<Vec<FeedRecord>> {
        let stock_file = match self {
            FeedSource::Archive { url, entry } => {
                let bytes = download_archive(client, url).await?;
                extract_stock_file(&bytes, entry.as_deref())?
            }
            FeedSource::LocalFile { path, entry } => {
                log::info!("Reading warehouse listing from {}", path.display());
                let bytes = tokio::fs::read(path).await?;
                if is_zip(path) {
                    extract_stock_file(&bytes, entry.as_deref())?
                } else {
                    bytes
                }
            }
        };

        let records = parse_feed(&stock_file, layout)?;
        log::info!("Loaded {} feed records", records.len());
        Ok(records)
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn location_with_scheme_is_downloaded() {
        let source = FeedSource::from_location("https://example.com/ostatki.zip", None);
        assert_eq!(
            source,
            FeedSource::Archive {
                url: "https://example.com/ostatki.zip".to_string(),
                entry: None
            }
        );
    }

    #[test]
    fn plain_location_is_read_from_disk() {
        let source = FeedSource::from_location("/srv/stock/warehouse.csv", Some("x.csv".into()));
        assert_eq!(
            source,
            FeedSource::LocalFile {
                path: PathBuf::from("/srv/stock/warehouse.csv"),
                entry: Some("x.csv".to_string())
            }
        );
    }

    #[test]
    fn zip_extension_is_case_insensitive() {
        assert!(is_zip(Path::new("OSTATKI.ZIP")));
        assert!(is_zip(Path::new("/tmp/ostatki.zip")));
        assert!(!is_zip(Path::new("/tmp/ostatki.csv")));
        assert!(!is_zip(Path::new("/tmp/ostatki")));
    }

    #[tokio::test]
    async fn loads_plain_local_listing() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(tmp, "Код;Количество;Цена\nW-1;>10;5'990.00 руб.\nW-2;3;1490\n").unwrap();

        let source = FeedSource::from_location(tmp.path().to_str().unwrap(), None);
        let records = source
            .load(&reqwest::Client::new(), &FeedLayout::default())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], FeedRecord::new("W-1", ">10", "5'990.00 руб."));
        assert_eq!(records[1], FeedRecord::new("W-2", "3", "1490"));
    }

    #[tokio::test]
    async fn missing_local_listing_is_io_error() {
        let source = FeedSource::from_location("/nonexistent/warehouse.csv", None);
        let result = source
            .load(&reqwest::Client::new(), &FeedLayout::default())
            .await;
        assert!(matches!(
            result,
            Err(marketplace_common::SyncError::Io(_))
        ));
    }
}
