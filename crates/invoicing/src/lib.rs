//! Invoicing domain module.
//!
//! This crate contains the invoice line-item ledger: the typed line item and
//! header models, the ordered ledger with its derived total, the edit session,
//! the remote gateway capability, and [`LineItemLedger`], which mirrors every
//! intent to the gateway and falls back to a local commit when that fails.

pub mod connectivity;
pub mod edit_session;
pub mod gateway;
pub mod header;
pub mod ledger;
pub mod line_item;
pub mod line_item_ledger;

pub use connectivity::{Connectivity, ConnectivityState};
pub use edit_session::EditSession;
pub use gateway::{GatewayError, InMemoryLedgerGateway, RemoteLedgerGateway};
pub use header::HeaderInfo;
pub use ledger::{Ledger, LedgerSnapshot};
pub use line_item::{LineItem, LineItemFields, RawLineItemFields};
pub use line_item_ledger::{IntentKind, LedgerError, LineItemLedger, Outcome, SubmitOutcome};
