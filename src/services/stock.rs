//! Stock ledger
//!
//! The single mutation path for inventory quantities. Every movement -
//! manual adjustments and reconciler deltas alike - goes through here, so
//! the `stock >= 0` invariant is enforced in exactly one place. Batches are
//! validated in full against current levels before anything is applied:
//! either every delta lands or none does.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::audit::EntityType;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{InventoryItem, ItemId, StockDelta};
use crate::storage::Storage;

/// Serializes check-then-apply sections across ledger instances.
///
/// Per-item locking is not available over the file-backed store, so the
/// whole apply path takes one process-wide lock.
static APPLY_LOCK: Mutex<()> = Mutex::new(());

/// Service owning all stock movements
pub struct StockLedger<'a> {
    storage: &'a Storage,
}

impl<'a> StockLedger<'a> {
    /// Create a new stock ledger over the given storage
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Current stock level of an item
    pub fn level(&self, item_id: ItemId) -> WorkshopResult<i64> {
        let item = self
            .storage
            .items
            .get(item_id)?
            .ok_or_else(|| WorkshopError::item_not_found(item_id.to_string()))?;
        Ok(item.stock)
    }

    /// Whether an item is below its configured minimum
    ///
    /// Always computed from the current level; low-stock state is never
    /// stored.
    pub fn is_low(&self, item_id: ItemId) -> WorkshopResult<bool> {
        let item = self
            .storage
            .items
            .get(item_id)?
            .ok_or_else(|| WorkshopError::item_not_found(item_id.to_string()))?;
        Ok(item.is_low())
    }

    /// All items currently below their minimum, sorted by name
    ///
    /// An explicit `threshold` overrides every item's own minimum.
    pub fn low_stock_items(&self, threshold: Option<i64>) -> WorkshopResult<Vec<InventoryItem>> {
        let mut items = self.storage.items.get_all()?;
        items.retain(|item| match threshold {
            Some(t) => item.stock < t,
            None => item.is_low(),
        });
        Ok(items)
    }

    /// Apply a single stock movement, returning the new level
    ///
    /// A zero delta succeeds without touching storage. A movement that would
    /// drive stock negative fails with `InsufficientStock` and changes
    /// nothing.
    pub fn apply_delta(&self, item_id: ItemId, delta: i64) -> WorkshopResult<i64> {
        let _guard = APPLY_LOCK
            .lock()
            .map_err(|e| WorkshopError::Storage(format!("Ledger lock poisoned: {}", e)))?;

        let item = self
            .storage
            .items
            .get(item_id)?
            .ok_or_else(|| WorkshopError::item_not_found(item_id.to_string()))?;

        if delta == 0 {
            return Ok(item.stock);
        }

        let new_stock = item.stock + delta;
        if new_stock < 0 {
            return Err(WorkshopError::InsufficientStock {
                item: item.name.clone(),
                requested: -delta,
                available: item.stock,
            });
        }

        let before = item.clone();
        let mut updated = item;
        updated.stock = new_stock;
        updated.updated_at = chrono::Utc::now();

        self.storage.items.upsert(updated.clone())?;
        self.storage.items.save()?;

        self.storage.log_update(
            EntityType::Item,
            updated.id.to_string(),
            Some(updated.name.clone()),
            &before,
            &updated,
            Some(format!("stock: {} -> {}", before.stock, updated.stock)),
        )?;

        Ok(new_stock)
    }

    /// Apply a batch of stock movements, all or nothing
    ///
    /// Deltas for the same item are coalesced first, then every resulting
    /// level is validated against current stock before any write happens. A
    /// document that references one item on several lines therefore cannot
    /// oversubscribe it through the batch.
    pub fn apply_deltas(&self, deltas: &[StockDelta]) -> WorkshopResult<()> {
        let _guard = APPLY_LOCK
            .lock()
            .map_err(|e| WorkshopError::Storage(format!("Ledger lock poisoned: {}", e)))?;

        let mut net: HashMap<ItemId, i64> = HashMap::new();
        for delta in deltas {
            *net.entry(delta.item_id).or_insert(0) += delta.delta;
        }
        net.retain(|_, d| *d != 0);

        if net.is_empty() {
            return Ok(());
        }

        // Dry run: resolve every item and check every resulting level
        let mut updates: Vec<(InventoryItem, InventoryItem)> = Vec::new();
        for (&item_id, &delta) in &net {
            let item = self
                .storage
                .items
                .get(item_id)?
                .ok_or_else(|| WorkshopError::item_not_found(item_id.to_string()))?;

            let new_stock = item.stock + delta;
            if new_stock < 0 {
                return Err(WorkshopError::InsufficientStock {
                    item: item.name.clone(),
                    requested: -delta,
                    available: item.stock,
                });
            }

            let before = item.clone();
            let mut after = item;
            after.stock = new_stock;
            after.updated_at = chrono::Utc::now();
            updates.push((before, after));
        }

        // Apply all
        for (_, after) in &updates {
            self.storage.items.upsert(after.clone())?;
        }

        if let Err(err) = self.storage.items.save() {
            // Disk write failed: roll the in-memory cache back so it keeps
            // matching what is persisted
            for (before, _) in &updates {
                let _ = self.storage.items.upsert(before.clone());
            }
            return Err(err);
        }

        for (before, after) in &updates {
            self.storage.log_update(
                EntityType::Item,
                after.id.to_string(),
                Some(after.name.clone()),
                before,
                after,
                Some(format!("stock: {} -> {}", before.stock, after.stock)),
            )?;
        }

        Ok(())
    }
}
