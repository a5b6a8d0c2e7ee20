//! HTTP gateway to the remote product store.
//!
//! Surface: `GET/POST {api}/api/products`, `PUT/DELETE {api}/api/products/{id}`.
//! Any transport error or non-2xx status is a `GatewayError`; nothing is retried.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use invoicepad_core::LineItemId;
use invoicepad_invoicing::{GatewayError, LineItem, RemoteLedgerGateway};

use crate::config::ClientConfig;

/// reqwest-backed [`RemoteLedgerGateway`].
#[derive(Debug, Clone)]
pub struct HttpLedgerGateway {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl HttpLedgerGateway {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.auth_token.clone(),
        })
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        let url = self.endpoint(&["health"]);
        match self.authorize(self.client.get(url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// `{api}/a/b/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // ClientConfig only admits http(s) URLs, which always have a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn products_url(&self) -> Url {
        self.endpoint(&["api", "products"])
    }

    fn product_url(&self, id: &LineItemId) -> Url {
        self.endpoint(&["api", "products", id.as_str()])
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, GatewayError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(GatewayError::Api(status, resp.text().await.unwrap_or_default()));
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, GatewayError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RemoteLedgerGateway for HttpLedgerGateway {
    async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError> {
        let url = self.products_url();
        tracing::debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError> {
        let url = self.products_url();
        tracing::debug!("POST {} ({})", url, item.id);
        self.send_json(self.client.post(url).json(item)).await
    }

    async fn update(&self, id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError> {
        let url = self.product_url(id);
        tracing::debug!("PUT {}", url);
        self.send_json(self.client.put(url).json(item)).await
    }

    async fn delete(&self, id: &LineItemId) -> Result<(), GatewayError> {
        let url = self.product_url(id);
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}
