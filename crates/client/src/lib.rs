//! `invoicepad-client`
//!
//! **Responsibility:** talk to the remote product store over HTTP.
//!
//! This crate provides:
//! - Environment-driven client configuration
//! - `HttpLedgerGateway`, the reqwest implementation of `RemoteLedgerGateway`
//!
//! The ledger itself stays usable when the store is down; this crate only
//! reports failures, it never retries them.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::HttpLedgerGateway;

use invoicepad_invoicing::LineItemLedger;

/// Build an empty ledger wired to the remote store described by `config`.
pub fn connect(config: &ClientConfig) -> anyhow::Result<LineItemLedger<HttpLedgerGateway>> {
    Ok(LineItemLedger::new(HttpLedgerGateway::new(config)?))
}
