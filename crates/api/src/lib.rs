//! Development remote store: the HTTP surface the invoice ledger mirrors to.

pub mod app;
pub mod config;
pub mod middleware;

pub use app::build_app;
pub use app::store::ProductStore;
pub use config::ServerConfig;
