//! Vendor archive download and extraction

use marketplace_common::{Result, SyncError};
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::marketplace::check_response;

/// Download the stock archive into memory
pub async fn download_archive(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading stock archive from {}", url);

    let response = check_response(client.get(url).send().await?).await?;

    let bytes = response.bytes().await?;
    log::info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Pull the stock file out of a zip archive.
///
/// With `entry` set, that exact file is read. Otherwise the first `.csv` or
/// `.txt` file in the archive is used.
pub fn extract_stock_file(archive_bytes: &[u8], entry: Option<&str>) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;

    let name = match entry {
        Some(name) => name.to_string(),
        None => find_stock_entry(&mut archive)?,
    };

    let mut file = archive.by_name(&name)?;
    let mut contents = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut contents)?;

    log::debug!("Extracted {} ({} bytes)", name, contents.len());
    Ok(contents)
}

fn find_stock_entry<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_ascii_lowercase();
        if name.ends_with(".csv") || name.ends_with(".txt") {
            return Ok(file.name().to_string());
        }
    }
    Err(SyncError::Archive(ZipError::FileNotFound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn picks_first_delimited_file() {
        let archive = build_archive(&[
            ("readme.pdf", "not a stock file"),
            ("export/OSTATKI.CSV", "Код;Количество;Цена\n"),
            ("other.csv", "ignored"),
        ]);

        let contents = extract_stock_file(&archive, None).unwrap();
        assert_eq!(contents, "Код;Количество;Цена\n".as_bytes());
    }

    #[test]
    fn named_entry_wins() {
        let archive = build_archive(&[("a.csv", "first"), ("b.csv", "second")]);

        let contents = extract_stock_file(&archive, Some("b.csv")).unwrap();
        assert_eq!(contents, b"second");
    }

    #[test]
    fn missing_named_entry_is_archive_error() {
        let archive = build_archive(&[("a.csv", "first")]);

        let result = extract_stock_file(&archive, Some("ostatki.csv"));
        assert!(matches!(
            result,
            Err(SyncError::Archive(ZipError::FileNotFound))
        ));
    }

    #[test]
    fn archive_without_stock_file_is_rejected() {
        let archive = build_archive(&[("price.xls", "binary")]);

        let result = extract_stock_file(&archive, None);
        assert!(matches!(result, Err(SyncError::Archive(_))));
    }

    #[tokio::test]
    async fn throttled_download_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/upload/files/ostatki.zip"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
            .mount(&server)
            .await;

        let url = format!("{}/upload/files/ostatki.zip", server.uri());
        let result = download_archive(&reqwest::Client::new(), &url).await;
        assert!(matches!(
            result,
            Err(SyncError::RateLimited {
                retry_after: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn missing_archive_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let url = format!("{}/upload/files/ostatki.zip", server.uri());
        match download_archive(&reqwest::Client::new(), &url).await.unwrap_err() {
            SyncError::HttpStatus { status, body } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(body, "not found");
            }
            other => panic!("Expected SyncError::HttpStatus, got: {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_are_not_an_archive() {
        let result = extract_stock_file(b"definitely not a zip", None);
        assert!(matches!(result, Err(SyncError::Archive(_))));
    }
}
