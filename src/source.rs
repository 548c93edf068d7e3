use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Menu;
use crate::error::TransportError;

/// A remote origin for raw menu payloads.
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// Perform a single fetch and return the parsed JSON body.
    async fn fetch(&self) -> Result<Value, TransportError>;
}

#[derive(Clone)]
pub struct HttpMenuSource {
    http: Client,
    url: Url,
}

impl fmt::Debug for HttpMenuSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMenuSource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpMenuSource {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;
        let mut builder = Client::builder().user_agent("menu-board/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, url })
    }

    /// Build a source from configuration; `MissingEndpoint` when no URL is set.
    pub fn from_config(menu: &Menu) -> Result<Self, TransportError> {
        let url = menu.api_url().ok_or(TransportError::MissingEndpoint)?;
        Self::new(url, menu.request_timeout())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn build_request(&self) -> Result<reqwest::Request, TransportError> {
        let request = self
            .http
            .get(self.url.clone())
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::ACCEPT, "application/json")
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl MenuSource for HttpMenuSource {
    async fn fetch(&self) -> Result<Value, TransportError> {
        let request = self.build_request()?;
        info!(url = %request.url(), "fetching menu");

        let res = self.http.execute(request).await?;
        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = res.text().await?;
        debug!(bytes = body.len(), "menu response received");
        serde_json::from_str(&body).map_err(|_| TransportError::NotJson)
    }
}
