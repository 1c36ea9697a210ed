//! HTTP transports used to retrieve image bytes.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Proxy settings applied to an outbound request, one entry per scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy for `http://` targets.
    pub http: Option<String>,
    /// Proxy for `https://` targets.
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Use the same proxy for both schemes. Blank values mean "no proxy".
    #[must_use]
    pub fn uniform(proxy: Option<&str>) -> Self {
        let proxy = proxy
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            http: proxy.clone(),
            https: proxy,
        }
    }

    /// Whether any proxy is configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// A fully resolved GET request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub user_agent: String,
    pub timeout: Duration,
    pub proxies: ProxyConfig,
}

/// Something that can perform a blocking HTTP GET and return the body.
///
/// Implementations must treat any non-2xx status as an error.
pub trait Transport: Send + Sync {
    /// Perform the request and return the full response body.
    ///
    /// # Errors
    ///
    /// Returns a fetch-kind error on transport failure or non-success status.
    fn get(&self, request: &HttpRequest) -> Result<Vec<u8>>;
}

/// Shared handle to a transport.
pub type DynTransport = Arc<dyn Transport>;

/// Transport backed by `reqwest`'s blocking client.
///
/// A client is built per request so that timeout and proxy settings always
/// match the request. System proxy variables are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl Transport for ReqwestTransport {
    fn get(&self, request: &HttpRequest) -> Result<Vec<u8>> {
        let fetch_error = |source| Error::Fetch {
            url: request.url.to_string(),
            source,
        };

        let mut builder = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(request.timeout)
            .user_agent(request.user_agent.as_str());

        if let Some(proxy) = &request.proxies.http {
            builder = builder.proxy(reqwest::Proxy::http(proxy.as_str()).map_err(fetch_error)?);
        }
        if let Some(proxy) = &request.proxies.https {
            builder = builder.proxy(reqwest::Proxy::https(proxy.as_str()).map_err(fetch_error)?);
        }

        let client = builder.build().map_err(fetch_error)?;
        let response = client
            .get(request.url.clone())
            .send()
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: request.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(fetch_error)?;
        Ok(body.to_vec())
    }
}
