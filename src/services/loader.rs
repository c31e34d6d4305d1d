//! Playlist loading from a URL, a local file or inline text

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::errors::LoadError;
use crate::metrics;
use crate::models::{ClassifiedPlaylist, ParseOptions, PlaylistStats};
use crate::services::m3u_parser;

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct LoadedPlaylist {
    pub playlist: ClassifiedPlaylist,
    pub stats: PlaylistStats,
    /// SHA1 of the raw playlist text
    pub fingerprint: String,
}

/// SHA1 fingerprint of playlist text
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Build the fallback proxy URL for a target
pub fn fallback_url(prefix: &str, url: &str) -> String {
    format!("{}{}", prefix, urlencoding::encode(url))
}

fn friendly_reason(status: StatusCode) -> String {
    match status {
        StatusCode::NOT_FOUND => "Playlist not found. Check the URL.".to_string(),
        StatusCode::FORBIDDEN => "Access denied. The playlist may require authentication.".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests. The playlist server is rate limiting.".to_string(),
        _ => status
            .canonical_reason()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Error".to_string()),
    }
}

/// Playlist loader service
pub struct PlaylistLoader {
    client: Client,
    max_m3u_size_mb: usize,
    fallback_proxy_url: Option<String>,
}

impl PlaylistLoader {
    pub fn new(config: &Config) -> Result<Self, LoadError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            max_m3u_size_mb: config.max_m3u_size_mb,
            fallback_proxy_url: config.fallback_proxy().map(str::to_string),
        })
    }

    fn max_bytes(&self) -> u64 {
        (self.max_m3u_size_mb as u64) * 1024 * 1024
    }

    fn too_large(&self, bytes: u64) -> LoadError {
        LoadError::TooLarge {
            size_mb: bytes as f64 / 1024f64 / 1024f64,
            limit_mb: self.max_m3u_size_mb,
        }
    }

    /// Fetch a playlist over HTTP and parse it.
    ///
    /// A failed direct fetch is retried once through the fallback proxy when
    /// one is configured.
    pub async fn load_from_url(
        &self,
        url: &str,
        options: &ParseOptions,
    ) -> Result<LoadedPlaylist, LoadError> {
        let result = match self.fetch_with_fallback(url).await {
            Ok(text) => self.finish(&text, options, "url"),
            Err(err) => Err(err),
        };
        record_failure(result)
    }

    /// Read a playlist from disk and parse it
    pub async fn load_from_file(
        &self,
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> Result<LoadedPlaylist, LoadError> {
        let path = path.as_ref();
        let result = match tokio::fs::read(path).await {
            Ok(bytes) if bytes.len() as u64 > self.max_bytes() => {
                Err(self.too_large(bytes.len() as u64))
            }
            Ok(bytes) => {
                tracing::info!("Reading playlist file {}", path.display());
                self.finish(&String::from_utf8_lossy(&bytes), options, "file")
            }
            Err(err) => Err(LoadError::Io(err)),
        };
        record_failure(result)
    }

    /// Validate and parse playlist text that is already in memory
    pub fn load_from_text(
        &self,
        text: &str,
        options: &ParseOptions,
    ) -> Result<LoadedPlaylist, LoadError> {
        record_failure(self.finish(text, options, "text"))
    }

    fn finish(
        &self,
        text: &str,
        options: &ParseOptions,
        source: &str,
    ) -> Result<LoadedPlaylist, LoadError> {
        if !m3u_parser::looks_like_playlist(text) {
            return Err(LoadError::UnrecognizedFormat);
        }

        let playlist = m3u_parser::parse_with_options(text, options);
        if playlist.is_empty() {
            return Err(LoadError::NoPlayableContent);
        }

        let stats = playlist.stats();
        metrics::record_load(source, &stats);
        tracing::info!(source, "Playlist loaded: {}", stats);

        Ok(LoadedPlaylist {
            playlist,
            stats,
            fingerprint: fingerprint(text),
        })
    }

    async fn fetch_with_fallback(&self, url: &str) -> Result<String, LoadError> {
        let parsed = Url::parse(url.trim()).map_err(|_| LoadError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoadError::InvalidUrl(url.to_string()));
        }

        match self.fetch(parsed.as_str()).await {
            Ok(text) => Ok(text),
            Err(err @ LoadError::TooLarge { .. }) => Err(err),
            Err(err) => match &self.fallback_proxy_url {
                Some(prefix) => {
                    tracing::warn!("fetch_fallback" = 1, "reason" = %err, "Retrying through fallback proxy");
                    self.fetch(&fallback_url(prefix, parsed.as_str())).await
                }
                None => Err(err),
            },
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
                reason: friendly_reason(status),
            });
        }

        let max_bytes = self.max_bytes();
        if let Some(len) = response.content_length() {
            tracing::info!("Playlist size: {:.2} MB", len as f64 / 1024.0 / 1024.0);
            if len > max_bytes {
                return Err(self.too_large(len));
            }
        }

        // Servers may omit or understate Content-Length
        let mut body: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            body.extend_from_slice(&chunk);
            if body.len() as u64 > max_bytes {
                return Err(self.too_large(body.len() as u64));
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn record_failure<T>(result: Result<T, LoadError>) -> Result<T, LoadError> {
    if let Err(err) = &result {
        tracing::warn!(reason = err.reason(), "Playlist load failed: {}", err);
        metrics::record_failure(err.reason());
    }
    result
}
