use std::env;
use std::fmt;
use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_API_KEY_HEADER: &str = "x-cg-demo-api-key";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;
pub const DEFAULT_COMPARISON_COINS: [&str; 4] = ["bitcoin", "ethereum", "solana", "avalanche-2"];

/// Upstream API secret. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key is not fatal at startup; `/proxy` answers 500 instead.
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub api_key_header: String,
    pub port: u16,
    pub cache_ttl_seconds: u64,
    pub sweep_interval_seconds: Option<u64>,
    pub upstream_timeout_seconds: Option<u64>,
    pub comparison_coins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("COINGECKO_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(ApiKey::new);

        let base_url = lookup("COINGECKO_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key_header = lookup("COINGECKO_API_KEY_HEADER")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            Some(raw) => parse_seconds("CACHE_TTL_SECONDS", &raw)?,
            None => DEFAULT_CACHE_TTL_SECONDS,
        };
        if cache_ttl_seconds == 0 {
            return Err("CACHE_TTL_SECONDS must be greater than zero".to_string());
        }

        let sweep_interval_seconds = lookup("CACHE_SWEEP_INTERVAL_SECONDS")
            .map(|raw| parse_seconds("CACHE_SWEEP_INTERVAL_SECONDS", &raw))
            .transpose()?
            .filter(|secs| *secs > 0);

        let upstream_timeout_seconds = lookup("UPSTREAM_TIMEOUT_SECONDS")
            .map(|raw| parse_seconds("UPSTREAM_TIMEOUT_SECONDS", &raw))
            .transpose()?
            .filter(|secs| *secs > 0);

        let comparison_coins = lookup("COMPARISON_COINS")
            .map(|raw| split_coin_list(&raw))
            .filter(|coins| !coins.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_COMPARISON_COINS
                    .iter()
                    .map(|coin| coin.to_string())
                    .collect()
            });

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key_header,
            port,
            cache_ttl_seconds,
            sweep_interval_seconds,
            upstream_timeout_seconds,
            comparison_coins,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self, String> {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ttl) = cli.cache_ttl {
            if ttl == 0 {
                return Err("--cache-ttl must be greater than zero".to_string());
            }
            self.cache_ttl_seconds = ttl;
        }
        if let Some(interval) = cli.sweep_interval {
            self.sweep_interval_seconds = Some(interval).filter(|secs| *secs > 0);
        }
        Ok(self)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn parse_seconds(name: &str, raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("{} must be a valid number", name))
}

/// Split a comma-separated coin list, dropping blanks.
pub fn split_coin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|coin| coin.trim().to_lowercase())
        .filter(|coin| !coin.is_empty())
        .collect()
}
