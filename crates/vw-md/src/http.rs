//! REST transport used by the exchange adapters.
//!
//! Adapters only need "GET this URL, give me the body", so the transport is a
//! one-method trait. [`ReqwestHttp`] is the production implementation; tests
//! substitute canned responses.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use vw_core::VwError;

/// Minimal async HTTP GET.
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// Non-success statuses map to [`VwError::HttpStatus`]; connection, timeout
    /// and body-read failures map to [`VwError::Transport`].
    async fn get(&self, url: &str) -> Result<Vec<u8>, VwError>;
}

/// [`HttpGet`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    http: reqwest::Client,
}

impl ReqwestHttp {
    /// Build a client whose every request times out after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpGet for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>, VwError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VwError::Transport(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VwError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| VwError::Transport(format!("{url}: {e}")))?;
        Ok(body.to_vec())
    }
}
