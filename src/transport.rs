//! HTTP transport built on `reqwest`.

use crate::error::{DriverError, Result};
use crate::Transport;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

const LOG_TARGET: &str = "webdriver_cache::transport";

/// Some vendor APIs (GitHub) reject requests without a user agent.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Single-attempt HTTP GET client.
///
/// TLS verification and the timeout belong to this instance only; turning
/// verification off here never affects other clients in the process.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    ssl_verify: bool,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(ssl_verify: bool, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .danger_accept_invalid_certs(!ssl_verify)
            .build()
            .map_err(DriverError::HttpClient)?;

        if !ssl_verify {
            warn!(
                target: LOG_TARGET,
                "TLS certificate verification is disabled for this driver manager"
            );
        }

        Ok(Self {
            client,
            ssl_verify,
            timeout,
        })
    }

    pub fn ssl_verify(&self) -> bool {
        self.ssl_verify
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        debug!(target: LOG_TARGET, url, ssl_verify = self.ssl_verify, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DriverError::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(target: LOG_TARGET, url, status = status.as_u16(), "non-success response");
            return Err(DriverError::Download {
                url: url.to_string(),
                status_code: Some(status.as_u16()),
                timeout: false,
                reason: format!("server responded with {status}"),
                source: None,
            });
        }

        let body = response.bytes().await.map_err(|e| DriverError::download(url, e))?;
        debug!(target: LOG_TARGET, url, bytes = body.len(), "response received");
        Ok(body)
    }
}
