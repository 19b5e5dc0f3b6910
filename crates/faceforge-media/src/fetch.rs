//! Downloading remote media assets.
//!
//! This module provides [`MediaFetcher`], a thin wrapper over a shared
//! `reqwest` client that retrieves raw asset bytes with a bounded timeout and
//! rejects payloads that cannot possibly be real media (tiny bodies, storage
//! error pages served with a 200).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, ClientBuilder};
use url::Url;

use crate::asset::AssetKind;
use crate::error::{Error, Result};
use crate::TRACING_TARGET_FETCH;

/// Minimum credible size for a downloaded media payload.
///
/// Bodies below this are near-certainly error pages from expired or
/// inaccessible storage links rather than actual media.
pub const MIN_ASSET_BYTES: usize = 100;

/// How much of a suspicious body is kept for diagnostics.
const BODY_PREVIEW_BYTES: usize = 200;

/// Error markers that storage services embed in XML error bodies.
const STORAGE_ERROR_MARKERS: &[&str] = &["AccessDenied", "NoSuchKey", "ExpiredToken"];

/// Configuration for the media fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout duration
    timeout: Duration,
    /// Connection timeout duration
    connect_timeout: Duration,
    /// User agent string for download requests
    user_agent: String,
}

impl FetchConfig {
    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            // Some storage frontends reject clients without a browser-like UA
            user_agent: "Mozilla/5.0 (compatible; FaceForge-AI/1.0)".to_owned(),
        }
    }
}

/// A successfully downloaded payload, before format resolution.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Raw payload bytes
    pub bytes: Bytes,
    /// `Content-Type` the source server declared, if any
    pub declared_content_type: Option<String>,
}

/// Downloader for remote media assets.
///
/// Follows redirects, enforces the configured timeouts, and validates that
/// the body it hands back is plausibly media rather than an error page.
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    http_client: HttpClient,
    config: FetchConfig,
}

impl MediaFetcher {
    /// Create a new fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let http_client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a new fetcher with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(FetchConfig::default())
    }

    /// Get the fetcher configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download the asset at `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Download`] on network failure, a non-2xx response, or a
    ///   storage error body served with a 200
    /// - [`Error::SizeValidation`] when the body is below [`MIN_ASSET_BYTES`]
    pub async fn fetch(&self, url: &Url, kind: AssetKind) -> Result<FetchedMedia> {
        tracing::debug!(
            target: TRACING_TARGET_FETCH,
            url = %url,
            kind = %kind,
            "downloading media asset"
        );

        let response = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, kind.accept_header())
            .send()
            .await
            .map_err(|e| Error::download(url.as_str(), None, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                target: TRACING_TARGET_FETCH,
                url = %url,
                status = status.as_u16(),
                "download failed"
            );
            return Err(Error::download(
                url.as_str(),
                Some(status.as_u16()),
                truncate_body(body.as_bytes()),
            ));
        }

        let declared_content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(Error::Http)?;

        validate_size(url.as_str(), &bytes)?;
        if is_storage_host(url) {
            scan_storage_body(url.as_str(), &bytes)?;
        }

        tracing::info!(
            target: TRACING_TARGET_FETCH,
            url = %url,
            size = bytes.len(),
            content_type = declared_content_type.as_deref().unwrap_or("<none>"),
            "downloaded media asset"
        );

        Ok(FetchedMedia {
            bytes,
            declared_content_type,
        })
    }
}

/// Reject payloads too small to be real media.
fn validate_size(url: &str, bytes: &[u8]) -> Result<()> {
    if bytes.len() < MIN_ASSET_BYTES {
        return Err(Error::size_validation(
            url,
            bytes.len(),
            truncate_body(bytes),
        ));
    }
    Ok(())
}

/// Check whether a URL points at an object-storage service whose error
/// bodies warrant inspection.
fn is_storage_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    host.contains("amazonaws.com") || host.starts_with("s3.")
}

/// Fail fast on storage error bodies served with a success status.
///
/// Pre-signed links that have expired or lack permissions come back as small
/// XML documents; forwarding those to the remote service produces a confusing
/// rejection much later in the pipeline.
fn scan_storage_body(url: &str, bytes: &[u8]) -> Result<()> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    for marker in STORAGE_ERROR_MARKERS {
        if head.contains(marker) {
            return Err(Error::download(
                url,
                None,
                format!("storage service returned an error body ({marker})"),
            ));
        }
    }
    Ok(())
}

fn truncate_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&bytes[..bytes.len().min(BODY_PREVIEW_BYTES)]).into_owned()
}
