//! Server configuration (environment driven).

use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Start with the sample product in the store.
    pub seed: bool,
    /// When set, `/api/*` requires `Authorization: Bearer <token>`.
    pub auth_token: Option<String>,
}

impl ServerConfig {
    /// Read `INVOICEPAD_BIND_ADDR`, `INVOICEPAD_SEED` and `INVOICEPAD_AUTH_TOKEN`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("INVOICEPAD_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .trim()
            .parse()
            .with_context(|| format!("INVOICEPAD_BIND_ADDR is not a socket address: {bind:?}"))?;

        let seed = match lookup("INVOICEPAD_SEED").as_deref().map(str::trim) {
            None | Some("") | Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => anyhow::bail!("INVOICEPAD_SEED must be true or false, got {other:?}"),
        };

        let auth_token = lookup("INVOICEPAD_AUTH_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            bind_addr,
            seed,
            auth_token,
        })
    }
}
