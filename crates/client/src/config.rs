//! Client configuration.

use std::time::Duration;

use anyhow::Context;
use reqwest::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the remote store lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Url,
    pub auth_token: Option<String>,
    /// Transport timeout; the ledger itself never times out a call.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Parse `api_url`, failing with context on malformed input.
    pub fn for_url(api_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(api_url).with_context(|| format!("invalid API URL {api_url:?}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("API URL must be http or https, got {api_url:?}");
        }
        Ok(Self::new(url))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `INVOICEPAD_API_URL`, `INVOICEPAD_AUTH_TOKEN` and
    /// `INVOICEPAD_HTTP_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("INVOICEPAD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::for_url(&api_url)?;

        if let Some(token) = lookup("INVOICEPAD_AUTH_TOKEN").filter(|t| !t.trim().is_empty()) {
            tracing::info!("Using bearer token for remote store");
            config = config.with_token(token.trim());
        }

        if let Some(secs) = lookup("INVOICEPAD_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("INVOICEPAD_HTTP_TIMEOUT_SECS must be whole seconds, got {secs:?}"))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
