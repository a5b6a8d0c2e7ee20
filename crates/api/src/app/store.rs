//! In-memory storage behind the dev server.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use invoicepad_core::entity::position_of;
use invoicepad_core::{DomainError, LineItemId};
use invoicepad_invoicing::LineItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(LineItemId),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Validation(#[from] DomainError),
}

/// Products (line items) plus every invoice payload received.
///
/// State lives for the process only.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: Mutex<Vec<LineItem>>,
    invoices: Mutex<Vec<serde_json::Value>>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the single sample product.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.lock_products().push(sample_product());
        store
    }

    pub fn list(&self) -> Vec<LineItem> {
        self.lock_products().clone()
    }

    /// Store a new product, keeping a client-supplied id or assigning one.
    pub fn create(&self, mut item: LineItem) -> Result<LineItem, StoreError> {
        item.fields().validate()?;
        if item.id.is_empty() {
            item.id = LineItemId::provisional();
        }

        let mut products = self.lock_products();
        if position_of(products.as_slice(), &item.id).is_some() {
            return Err(StoreError::Conflict(format!("product {} already exists", item.id)));
        }
        products.push(item.clone());
        Ok(item)
    }

    /// Replace the product with identity `id`; the body's id is ignored.
    pub fn update(&self, id: &LineItemId, mut item: LineItem) -> Result<LineItem, StoreError> {
        item.fields().validate()?;
        item.id = id.clone();

        let mut products = self.lock_products();
        let idx = position_of(products.as_slice(), id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        products[idx] = item.clone();
        Ok(item)
    }

    pub fn delete(&self, id: &LineItemId) -> Result<LineItem, StoreError> {
        let mut products = self.lock_products();
        let idx = position_of(products.as_slice(), id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(products.remove(idx))
    }

    pub fn record_invoice(&self, payload: serde_json::Value) {
        self.invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
    }

    pub fn invoices(&self) -> Vec<serde_json::Value> {
        self.invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_products(&self) -> std::sync::MutexGuard<'_, Vec<LineItem>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn sample_product() -> LineItem {
    LineItem {
        id: LineItemId::from("1"),
        product_name: "Example".to_string(),
        quantity: 1,
        unit_price: 1000,
        detail: Some("Sample product".to_string()),
    }
}
