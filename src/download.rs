//! HTTP access to the GHCN-Daily archive.

use crate::config::GhcndConfig;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Covers errors during body streaming and decompression
    #[error("Download or decompression failed for {0}")]
    DownloadIo(String, #[source] io::Error),

    #[error("Response from {0} is not valid UTF-8")]
    Encoding(String, #[source] FromUtf8Error),
}

/// Fetches archive resources as text, with the configured timeout applied to
/// every request.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    base_url: String,
}

impl Downloader {
    pub fn new(config: &GhcndConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.normalized_base_url(),
        })
    }

    /// Absolute URL of a resource path relative to the archive root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Downloads `url` and returns its body as text.
    ///
    /// Non-success statuses are errors. Gzip payloads (served as `.gz` files
    /// rather than with a `Content-Encoding` header) are decompressed.
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        info!("Downloading data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {}", url, e);
                return Err(match e.status() {
                    Some(status) => DownloadError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => DownloadError::NetworkRequest(url.to_string(), e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(io::Error::other);
        let mut reader = BufReader::new(StreamReader::new(stream));
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .await
            .map_err(|e| DownloadError::DownloadIo(url.to_string(), e))?;

        if body.starts_with(&GZIP_MAGIC) {
            let decompressed = gunzip(&body)
                .await
                .map_err(|e| DownloadError::DownloadIo(url.to_string(), e))?;
            body = decompressed;
        }

        info!("Downloaded {} bytes from {}", body.len(), url);
        String::from_utf8(body).map_err(|e| DownloadError::Encoding(url.to_string(), e))
    }
}

async fn gunzip(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzipDecoder::new(BufReader::new(bytes));
    let mut decompressed = Vec::with_capacity(bytes.len() * 4);
    decoder.read_to_end(&mut decompressed).await?;
    Ok(decompressed)
}
