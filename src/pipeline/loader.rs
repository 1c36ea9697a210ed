//! Fetch, decode, and normalize one image from a URL.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fetch::{self, DynTransport, HttpRequest, ProxyConfig, ReqwestTransport};
use crate::image::{self, LoadedBatch};

/// Smallest accepted request timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Largest accepted request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Configuration for loading an image from a URL.
#[derive(Debug, Clone)]
pub struct Config {
    /// Request timeout in seconds (1-120).
    pub timeout_secs: u64,

    /// Proxy applied to both HTTP and HTTPS. Blank means none.
    pub proxy: Option<String>,

    /// User-Agent header sent with the request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            proxy: None,
            user_agent: fetch::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(Error::InvalidParameter {
                name: "timeout".to_string(),
                reason: format!(
                    "must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS} seconds"
                ),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidParameter {
                name: "user_agent".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Build the GET request for `url` under this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` is not an HTTP(S) URL.
    pub fn request(&self, url: &str) -> Result<HttpRequest> {
        Ok(HttpRequest {
            url: fetch::parse_http_url(url)?,
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            proxies: ProxyConfig::uniform(self.proxy.as_deref()),
        })
    }
}

/// Loads images from URLs into image and mask batches.
pub struct Loader {
    config: Config,
    transport: DynTransport,
}

impl Loader {
    /// Create a loader backed by the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport))
    }

    /// Create a loader that issues requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(config: Config, transport: DynTransport) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Initializing loader with config: {config:?}");
        Ok(Self { config, transport })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch `url`, decode it, and normalize every frame.
    ///
    /// The call either fully succeeds or fails with a fetch or decode error;
    /// no partial batch is returned.
    ///
    /// # Errors
    ///
    /// Returns a fetch-kind error for invalid URLs, transport failures, and
    /// non-success statuses, and a decode-kind error for unreadable images.
    pub fn load(&self, url: &str) -> Result<LoadedBatch> {
        let request = self
            .config
            .request(url)
            .inspect_err(|err| tracing::error!("Request failed: {err}"))?;

        let bytes = fetch::fetch_bytes(self.transport.as_ref(), &request)?;

        let batch = image::decode_container(&bytes)
            .and_then(|container| image::normalize_container(&container))
            .inspect_err(|err| tracing::error!("Error while processing image: {err}"))?;

        tracing::info!(
            "Loaded {} frame(s): image {:?}, mask {:?}",
            batch.len(),
            batch.image.shape(),
            batch.mask.shape()
        );
        Ok(batch)
    }
}

/// Load `url` with the given timeout and optional proxy.
///
/// # Errors
///
/// See [`Loader::load`]; an out-of-range timeout is also rejected.
pub fn fetch_and_normalize(
    url: &str,
    timeout_secs: u64,
    proxy: Option<&str>,
) -> Result<LoadedBatch> {
    let config = Config {
        timeout_secs,
        proxy: proxy.map(str::to_string),
        ..Config::default()
    };
    Loader::new(config)?.load(url)
}
