//! Remote persistence capability for line items.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use invoicepad_core::entity::position_of;
use invoicepad_core::LineItemId;

use crate::line_item::LineItem;

/// Remote call failure.
///
/// Every variant is a network-class failure from the ledger's point of view:
/// the mutation is committed locally anyway and the error is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("remote store unavailable")]
    Unavailable,
}

/// Remote store for line items.
///
/// Implementations perform the network call only; they never touch the local
/// ledger.
#[async_trait]
pub trait RemoteLedgerGateway: Send + Sync {
    /// Fetch every stored item, in store order.
    async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError>;

    /// Store a new item. The returned item is canonical and may carry a
    /// server-assigned id.
    async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError>;

    /// Fully replace the item with identity `id`.
    async fn update(&self, id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError>;

    /// Remove the item with identity `id`.
    async fn delete(&self, id: &LineItemId) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G> RemoteLedgerGateway for Arc<G>
where
    G: RemoteLedgerGateway + ?Sized,
{
    async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError> {
        (**self).fetch_all().await
    }

    async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError> {
        (**self).create(item).await
    }

    async fn update(&self, id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError> {
        (**self).update(id, item).await
    }

    async fn delete(&self, id: &LineItemId) -> Result<(), GatewayError> {
        (**self).delete(id).await
    }
}

/// In-memory gateway for tests/dev.
///
/// - No IO
/// - Can be switched into a failing mode to exercise fallback commits
/// - Optionally assigns its own ids (`srv-1`, `srv-2`, ...) on create
#[derive(Debug, Default)]
pub struct InMemoryLedgerGateway {
    items: Mutex<Vec<LineItem>>,
    failing: AtomicBool,
    assign_ids: bool,
    next_id: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryLedgerGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that replaces the client's provisional id with its own.
    pub fn assigning_ids() -> Self {
        Self {
            assign_ids: true,
            ..Self::default()
        }
    }

    /// Gateway pre-populated with stored items.
    pub fn with_items(items: Vec<LineItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Items as currently stored remotely.
    pub fn stored(&self) -> Vec<LineItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn begin_call(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteLedgerGateway for InMemoryLedgerGateway {
    async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError> {
        self.begin_call()?;
        Ok(self.stored())
    }

    async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError> {
        self.begin_call()?;
        let mut stored = item.clone();
        if self.assign_ids || stored.id.is_empty() {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            stored.id = LineItemId::from(format!("srv-{n}"));
        }
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError> {
        self.begin_call()?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let idx = position_of(items.as_slice(), id)
            .ok_or_else(|| GatewayError::Api(404, format!("product {id} not found")))?;
        let mut stored = item.clone();
        stored.id = id.clone();
        items[idx] = stored.clone();
        Ok(stored)
    }

    async fn delete(&self, id: &LineItemId) -> Result<(), GatewayError> {
        self.begin_call()?;
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let idx = position_of(items.as_slice(), id)
            .ok_or_else(|| GatewayError::Api(404, format!("product {id} not found")))?;
        items.remove(idx);
        Ok(())
    }
}
