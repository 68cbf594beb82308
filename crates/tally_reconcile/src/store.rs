//! External inventory store interface.
//!
//! The subsystem only reads items and requests mutations; applying them (and
//! guaranteeing uniqueness/transactionality) is the store's job.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tally_protocol::types::{InventoryItem, ItemId, ReasonCode};
use thiserror::Error;

/// Store-side failures. No partial mutation is assumed applied on error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no inventory item with id {id}")]
    NotFound { id: ItemId },

    /// Constraint violations, e.g. a SKU uniqueness conflict.
    #[error("store conflict: {message}")]
    Conflict { message: String },

    /// Network or backend failure; the request may be retried.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// The two external operations consumed by the reconciliation workflow, plus
/// the read path used for lookups.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// The full recorded item list.
    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// Post a stock addition with its audit reason and note.
    async fn add_stock(
        &self,
        id: &ItemId,
        quantity: u32,
        reason: ReasonCode,
        note: &str,
    ) -> Result<(), StoreError>;

    /// Post a deduct-style adjustment with its audit reason and note.
    async fn adjust_stock(
        &self,
        id: &ItemId,
        quantity: u32,
        reason: ReasonCode,
        note: &str,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// In-memory reference store
// ============================================================================

/// In-memory store used by the CLI driver and tests.
///
/// `set_fail_dispatches(true)` makes every mutation fail with `Unavailable`,
/// for exercising the retry path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<ItemId, InventoryItem>>,
    fail_dispatches: AtomicBool,
}

impl MemoryStore {
    pub fn new(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        Self {
            items: Mutex::new(
                items
                    .into_iter()
                    .map(|item| (item.id.clone(), item))
                    .collect(),
            ),
            fail_dispatches: AtomicBool::new(false),
        }
    }

    pub fn set_fail_dispatches(&self, fail: bool) {
        self.fail_dispatches.store(fail, Ordering::SeqCst);
    }

    /// Current recorded quantity, if the item exists.
    pub fn quantity(&self, id: &ItemId) -> Option<u32> {
        self.items
            .lock()
            .ok()
            .and_then(|items| items.get(id).map(|item| item.quantity))
    }

    /// Existence probe for SKU generation (`generate_unique_with`).
    pub fn sku_taken(&self, sku: &str) -> bool {
        self.items
            .lock()
            .map(|items| items.values().any(|item| item.sku.eq_ignore_ascii_case(sku)))
            .unwrap_or(false)
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<ItemId, InventoryItem>>, StoreError> {
        self.items.lock().map_err(|_| StoreError::Unavailable {
            message: "inventory map poisoned".to_string(),
        })
    }

    fn check_dispatch_gate(&self) -> Result<(), StoreError> {
        if self.fail_dispatches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "injected dispatch failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let items = self.guard()?;
        let mut listed: Vec<InventoryItem> = items.values().cloned().collect();
        listed.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(listed)
    }

    async fn add_stock(
        &self,
        id: &ItemId,
        quantity: u32,
        _reason: ReasonCode,
        _note: &str,
    ) -> Result<(), StoreError> {
        self.check_dispatch_gate()?;
        let mut items = self.guard()?;
        match items.get_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.clone() }),
        }
    }

    async fn adjust_stock(
        &self,
        id: &ItemId,
        quantity: u32,
        _reason: ReasonCode,
        _note: &str,
    ) -> Result<(), StoreError> {
        self.check_dispatch_gate()?;
        let mut items = self.guard()?;
        match items.get_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_sub(quantity);
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.clone() }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
