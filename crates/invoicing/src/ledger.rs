use serde::{Deserialize, Serialize};

use invoicepad_core::entity::position_of;
use invoicepad_core::{DomainError, DomainResult, LineItemId};

use crate::line_item::LineItem;

/// Ordered line items plus their derived total.
///
/// Invariants:
/// - insertion order is display order
/// - ids are unique and non-empty
/// - `total` equals the sum of `quantity × unit_price` over `items`; every
///   mutation recomputes it from scratch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    items: Vec<LineItem>,
    total: u128,
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub items: Vec<LineItem>,
    pub total: u128,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from items fetched remotely, validating each one.
    pub fn from_items(items: Vec<LineItem>) -> DomainResult<Self> {
        let mut ledger = Self::new();
        for item in items {
            ledger.admit(&item)?;
            ledger.items.push(item);
        }
        ledger.recompute();
        Ok(ledger)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &LineItemId) -> Option<&LineItem> {
        position_of(&self.items, id).map(|idx| &self.items[idx])
    }

    pub fn contains(&self, id: &LineItemId) -> bool {
        position_of(&self.items, id).is_some()
    }

    /// Append a new item at the end.
    pub fn append(&mut self, item: LineItem) -> DomainResult<()> {
        self.admit(&item)?;
        self.items.push(item);
        self.recompute();
        Ok(())
    }

    /// Replace the item with identity `id` in place, keeping its position.
    ///
    /// The replacement must carry the same id.
    pub fn replace(&mut self, id: &LineItemId, item: LineItem) -> DomainResult<()> {
        if &item.id != id {
            return Err(DomainError::invariant(format!(
                "line item id cannot change ({id} -> {})",
                item.id
            )));
        }
        item.fields().validate()?;

        let idx = position_of(&self.items, id).ok_or_else(DomainError::not_found)?;
        self.items[idx] = item;
        self.recompute();
        Ok(())
    }

    /// Remove the item with identity `id`, returning it.
    pub fn remove(&mut self, id: &LineItemId) -> Option<LineItem> {
        let idx = position_of(&self.items, id)?;
        let removed = self.items.remove(idx);
        self.recompute();
        Some(removed)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            items: self.items.clone(),
            total: self.total,
        }
    }

    /// Checks a new item may join the ledger.
    fn admit(&self, item: &LineItem) -> DomainResult<()> {
        if item.id.is_empty() {
            return Err(DomainError::invalid_id("line item has no id"));
        }
        if self.contains(&item.id) {
            return Err(DomainError::invariant(format!(
                "duplicate line item id {}",
                item.id
            )));
        }
        item.fields().validate()
    }

    // Each amount fits in u64 (checked on admission), so the u128 sum cannot
    // overflow for any realistic item count.
    fn recompute(&mut self) {
        self.total = self.items.iter().map(LineItem::amount).sum();
    }
}
