use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use crate::config::{ApiKey, Config};
use crate::error::{AppError, MISSING_API_KEY_MESSAGE};
use crate::proxy::UpstreamSource;

/// HTTP client for the CoinGecko REST API.
///
/// The API key travels only in the configured request header. It is never
/// appended to the URL and the header value is marked sensitive so it is
/// redacted from `Debug` output.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    auth: Option<(HeaderName, HeaderValue)>,
    http: Client,
}

impl CoinGeckoClient {
    pub fn new(
        base_url: String,
        api_key_header: &str,
        api_key: Option<&ApiKey>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let header_name = HeaderName::from_bytes(api_key_header.as_bytes()).map_err(|_| {
            AppError::Config(format!("Invalid API key header name: {}", api_key_header))
        })?;

        let auth = api_key
            .map(|key| {
                let mut value = HeaderValue::from_str(key.expose()).map_err(|_| {
                    AppError::Config("API key contains invalid header characters".to_string())
                })?;
                value.set_sensitive(true);
                Ok::<_, AppError>((header_name, value))
            })
            .transpose()?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.base_url.clone(),
            &config.api_key_header,
            config.api_key.as_ref(),
            config.upstream_timeout_seconds.map(Duration::from_secs),
        )
    }

    /// Full upstream URL for an endpoint: plain concatenation onto the base.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl UpstreamSource for CoinGeckoClient {
    async fn fetch_json(&self, endpoint: &str) -> Result<Value, AppError> {
        let (header_name, header_value) = self
            .auth
            .clone()
            .ok_or_else(|| AppError::Config(MISSING_API_KEY_MESSAGE.to_string()))?;

        let url = self.url_for(endpoint);

        let response = self
            .http
            .get(&url)
            .header(header_name, header_value)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(AppError::upstream(status.as_u16(), &body));
        }

        serde_json::from_slice(&body).map_err(|err| AppError::Parse(err.to_string()))
    }

    fn is_configured(&self) -> bool {
        self.auth.is_some()
    }
}
