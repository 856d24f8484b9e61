use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use holdersync_core::errors::Result;
use holdersync_core::watchlist::{same_addresses, WatchlistError, WatchlistProviderTrait};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest response body excerpt carried in an error.
const ERROR_BODY_LIMIT: usize = 200;

pub const DEFAULT_PROVIDER_API_URL: &str = "https://api.helius.xyz";

/// Webhook definition as returned and accepted by the provider.
///
/// Only fields that are sent back on update are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookConfig {
    #[serde(rename = "webhookURL")]
    webhook_url: String,
    #[serde(default)]
    transaction_types: Vec<String>,
    #[serde(default)]
    account_addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webhook_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_header: Option<String>,
}

/// Reads and replaces the address list of one provider webhook.
pub struct WebhookApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    webhook_id: String,
    auth_header: Option<String>,
}

impl WebhookApiClient {
    /// `auth_header` is the shared secret the provider sends with each
    /// delivery; it is re-sent on every update so edits do not clear it.
    pub fn new(
        base_url: &str,
        api_key: &str,
        webhook_id: &str,
        auth_header: Option<String>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WatchlistError::NotConfigured("missing API key".to_string()).into());
        }
        if webhook_id.trim().is_empty() {
            return Err(WatchlistError::NotConfigured("missing webhook id".to_string()).into());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| WatchlistError::Request(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            webhook_id: webhook_id.to_string(),
            auth_header: auth_header.filter(|h| !h.is_empty()),
        })
    }

    fn webhook_url(&self) -> String {
        format!("{}/v0/webhooks/{}", self.base_url, self.webhook_id)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn fetch_webhook(&self) -> Result<WebhookConfig> {
        let url = self.webhook_url();
        debug!("[WebhookApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WatchlistError::Request(e.to_string()))?;

        parse_response(response).await
    }

    async fn update_webhook(&self, config: &WebhookConfig) -> Result<()> {
        let url = self.webhook_url();
        debug!(
            "[WebhookApi] PUT {} ({} address(es))",
            url,
            config.account_addresses.len()
        );

        let response = self
            .client
            .put(&url)
            .headers(self.headers())
            .query(&[("api-key", self.api_key.as_str())])
            .json(config)
            .send()
            .await
            .map_err(|e| WatchlistError::Request(e.to_string()))?;

        let _: serde_json::Value = parse_response(response).await?;
        Ok(())
    }

    async fn put_addresses(&self, current: WebhookConfig, addresses: &[String]) -> Result<()> {
        let config = WebhookConfig {
            account_addresses: addresses.to_vec(),
            auth_header: self.auth_header.clone().or(current.auth_header.clone()),
            ..current
        };

        self.update_webhook(&config).await?;
        info!(
            "Webhook {} now watches {} address(es)",
            self.webhook_id,
            addresses.len()
        );
        Ok(())
    }
}

/// Reads the body, turning non-2xx statuses into [`WatchlistError::Status`].
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WatchlistError::Request(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(WatchlistError::Status {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        }
        .into());
    }

    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    Ok(serde_json::from_str(body).map_err(|e| WatchlistError::Decode(e.to_string()))?)
}

#[async_trait]
impl WatchlistProviderTrait for WebhookApiClient {
    async fn list_watched_addresses(&self) -> Result<Vec<String>> {
        Ok(self.fetch_webhook().await?.account_addresses)
    }

    async fn replace_watched_addresses(&self, addresses: &[String]) -> Result<()> {
        // The update endpoint replaces the whole definition, so start from the
        // current one to keep URL and event filters intact.
        let current = self.fetch_webhook().await?;
        self.put_addresses(current, addresses).await
    }

    async fn sync_watched_addresses(&self, addresses: &[String]) -> Result<bool> {
        let current = self.fetch_webhook().await?;
        if same_addresses(&current.account_addresses, addresses) {
            debug!("[WebhookApi] watch-list unchanged, skipping update");
            return Ok(false);
        }
        self.put_addresses(current, addresses).await?;
        Ok(true)
    }
}
