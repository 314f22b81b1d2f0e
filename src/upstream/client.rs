use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{UpstreamCall, UpstreamReply};
use crate::error::ProxyError;

pub const DEFAULT_API_BASE: &str = "https://api.imagekit.io";

/// Thin wrapper over one shared `reqwest::Client` pointed at the ImageKit API.
#[derive(Debug, Clone)]
pub struct ImageKitClient {
    base_url: Url,
    http_client: Client,
}

impl ImageKitClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("parsing ImageKit API base URL {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("ImageKit API base URL {} cannot carry a path", base_url);
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("creating HTTP client")?;

        debug!("ImageKit client initialized with base_url={}", base_url);

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url_for(&self, call: &UpstreamCall) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(call.segments.iter());
        }
        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(call.query.iter());
        }
        url
    }

    /// Send `call` once. Any status comes back as a reply; only transport
    /// failures are errors here.
    pub async fn send(&self, authorization: &str, call: &UpstreamCall) -> Result<UpstreamReply, ProxyError> {
        let url = self.url_for(call);
        debug!(method = %call.method, path = %call.path(), "calling ImageKit");

        let mut request = self
            .http_client
            .request(call.method.clone(), url)
            .header(AUTHORIZATION, authorization);
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(method = %call.method, path = %call.path(), status = status.as_u16(), "ImageKit replied");
        Ok(UpstreamReply { status, text })
    }
}
