//! HTTP client for the remote cart resource.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  cart`        -> JSON list of cart lines
//! - `POST cart/add`    -> `{productId, quantity}`
//! - `POST cart/update` -> `{productId, quantity}`
//! - `POST cart/remove` -> `{productId}`
//! - `POST cart/clear`  -> empty body
//!
//! Mutation responses carry no schema guarantees; only the status matters.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use rindhouse_core::ProductId;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::config::RemoteCartConfig;
use crate::error::RemoteCartError;
use crate::remote::{RemoteCart, RemoteCartLine};

/// Client for the remote cart REST resource.
#[derive(Clone)]
pub struct HttpCartClient {
    inner: Arc<HttpCartClientInner>,
}

struct HttpCartClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveBody<'a> {
    product_id: &'a ProductId,
}

impl HttpCartClient {
    /// Create a new remote cart client.
    #[must_use]
    pub fn new(config: &RemoteCartConfig) -> Self {
        Self {
            inner: Arc::new(HttpCartClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_token: config.api_token.expose_secret().to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteCartError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        operation: &'static str,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), RemoteCartError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .inner
            .client
            .post(url)
            .bearer_auth(&self.inner.api_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            debug!(
                operation,
                status = status.as_u16(),
                body = %body_text.chars().take(500).collect::<String>(),
                "remote cart mutation returned non-success status"
            );
            return Err(RemoteCartError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCart for HttpCartClient {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<RemoteCartLine>, RemoteCartError> {
        let url = self.endpoint("cart")?;
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(&self.inner.api_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // No server-side cart yet: an empty cart, not a failure.
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(RemoteCartError::Status {
                operation: "fetch",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let lines: Vec<RemoteCartLine> = serde_json::from_str(&body)?;
        debug!(lines = lines.len(), "fetched remote cart");
        Ok(lines)
    }

    #[instrument(skip(self), fields(product = %product_id))]
    async fn add(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError> {
        self.post(
            "add",
            "cart/add",
            Some(&LineBody {
                product_id,
                quantity,
            }),
        )
        .await
    }

    #[instrument(skip(self), fields(product = %product_id))]
    async fn update(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError> {
        self.post(
            "update",
            "cart/update",
            Some(&LineBody {
                product_id,
                quantity,
            }),
        )
        .await
    }

    #[instrument(skip(self), fields(product = %product_id))]
    async fn remove(&self, product_id: &ProductId) -> Result<(), RemoteCartError> {
        self.post("remove", "cart/remove", Some(&RemoveBody { product_id }))
            .await
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), RemoteCartError> {
        self.post::<()>("clear", "cart/clear", None).await
    }
}
