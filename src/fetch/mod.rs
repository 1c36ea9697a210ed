//! Image retrieval over HTTP(S).

mod transport;

pub use transport::{DynTransport, HttpRequest, ProxyConfig, ReqwestTransport, Transport};

use url::Url;

use crate::error::{Error, Result};

/// Desktop browser User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Parse `url` and require an `http` or `https` scheme.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the string is not an absolute HTTP(S) URL.
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|err| Error::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Fetch the body of `request` through `transport`, logging progress.
///
/// # Errors
///
/// Propagates the transport's fetch error unchanged.
pub fn fetch_bytes(transport: &dyn Transport, request: &HttpRequest) -> Result<Vec<u8>> {
    tracing::info!("Loading image from URL: {}", request.url);
    if !request.proxies.is_empty() {
        tracing::debug!("Using proxies: {:?}", request.proxies);
    }

    match transport.get(request) {
        Ok(body) => {
            tracing::info!("Image fetched successfully ({} bytes)", body.len());
            Ok(body)
        }
        Err(err) => {
            tracing::error!("Request failed: {err}");
            Err(err)
        }
    }
}
