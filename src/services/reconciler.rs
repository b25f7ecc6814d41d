//! Document reconciliation
//!
//! A document's line items are edited as a whole: the caller hands in the
//! complete new set and the reconciler diffs it against what is persisted,
//! moves stock for the difference (work orders only), swaps the stored set,
//! and recomputes totals. The operation is transactional from the caller's
//! perspective even though the store has no native transactions: writes are
//! ordered, and a failure after stock has moved triggers compensating
//! writes.

use crate::audit::EntityType;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{
    BudgetId, DocumentKind, DocumentRef, ItemId, LineItemSet, Money, StockDelta, WorkOrderId,
};
use crate::storage::{LineItemRepository, Storage};

use super::aggregator::{Aggregator, Totals};
use super::stock::StockLedger;

/// One requested line in a commit: what the caller wants the document to
/// contain after the edit
#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub item_id: ItemId,
    pub quantity: i64,
    /// Explicit price for this line; when absent the reconciler resolves one
    /// (frozen or live depending on the document)
    pub unit_price_override: Option<Money>,
}

/// Compute the stock movements implied by replacing `old` with `new`
///
/// For every item referenced in either set, `delta = old_quantity -
/// new_quantity`: consuming more stock yields a negative delta, removing or
/// reducing a line returns stock as a positive one. Items with no net change
/// are omitted. The result is sorted for deterministic application order.
pub fn compute_stock_deltas(old: &LineItemSet, new: &LineItemSet) -> Vec<StockDelta> {
    let old_quantities = old.quantities_by_item();
    let new_quantities = new.quantities_by_item();

    let mut deltas: Vec<StockDelta> = old_quantities
        .keys()
        .chain(new_quantities.keys())
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .filter_map(|item_id| {
            let old_qty = old_quantities.get(item_id).copied().unwrap_or(0);
            let new_qty = new_quantities.get(item_id).copied().unwrap_or(0);
            let delta = old_qty - new_qty;
            (delta != 0).then_some(StockDelta {
                item_id: *item_id,
                delta,
            })
        })
        .collect();

    deltas.sort_by_key(|d| *d.item_id.as_uuid());
    deltas
}

/// Service committing line-item edits against documents
pub struct DocumentReconciler<'a> {
    storage: &'a Storage,
}

impl<'a> DocumentReconciler<'a> {
    /// Create a new reconciler over the given storage
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Replace a document's line items and recompute its totals
    ///
    /// `expected_version` must match the stored document version; a mismatch
    /// means someone else committed in between and the edit is rejected with
    /// `Conflict` rather than silently clobbering their stock movements.
    ///
    /// Work orders move stock for the diff; an `InsufficientStock` result
    /// aborts the whole commit with nothing changed. Budgets never touch the
    /// ledger.
    pub fn commit(
        &self,
        doc: DocumentRef,
        expected_version: u64,
        inputs: &[LineItemInput],
    ) -> WorkshopResult<Totals> {
        match doc {
            DocumentRef::WorkOrder(id) => self.commit_work_order(id, expected_version, inputs),
            DocumentRef::Budget(id) => self.commit_budget(id, expected_version, inputs),
        }
    }

    fn commit_work_order(
        &self,
        order_id: WorkOrderId,
        expected_version: u64,
        inputs: &[LineItemInput],
    ) -> WorkshopResult<Totals> {
        let doc = DocumentRef::WorkOrder(order_id);

        let order = self
            .storage
            .work_orders
            .get(order_id)?
            .ok_or_else(|| WorkshopError::order_not_found(order_id.to_string()))?;
        check_version(&doc, order.version, expected_version)?;

        let repo = &self.storage.order_lines;
        let old_lines = LineItemSet::from_items(repo.get_for(doc.uuid())?);

        // Work orders always freeze prices at insertion time
        let new_lines = self.build_line_set(inputs, true, &old_lines)?;

        let deltas = compute_stock_deltas(&old_lines, &new_lines);
        StockLedger::new(self.storage).apply_deltas(&deltas)?;

        // Stock has moved; from here on every failure must compensate
        if let Err(err) = self.swap_lines(repo, &doc, &old_lines, &new_lines) {
            self.compensate_stock(&doc, &deltas);
            return Err(err);
        }

        let totals = match Aggregator::new(self.storage).compute_for_order(&order, &new_lines) {
            Ok(totals) => totals,
            Err(err) => {
                self.restore_lines(repo, &doc, &old_lines);
                self.compensate_stock(&doc, &deltas);
                return Err(err);
            }
        };

        let before = order.clone();
        let mut updated = order;
        updated.total = totals.grand;
        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        if let Err(err) = self
            .storage
            .work_orders
            .upsert(updated.clone())
            .and_then(|_| self.storage.work_orders.save())
        {
            let _ = self.storage.work_orders.upsert(before);
            self.restore_lines(repo, &doc, &old_lines);
            self.compensate_stock(&doc, &deltas);
            return Err(err);
        }

        self.storage.log_update(
            EntityType::WorkOrder,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            Some(format!(
                "lines: {} -> {}, total: {} -> {}",
                old_lines.len(),
                new_lines.len(),
                before.total,
                updated.total
            )),
        )?;

        Ok(totals)
    }

    fn commit_budget(
        &self,
        budget_id: BudgetId,
        expected_version: u64,
        inputs: &[LineItemInput],
    ) -> WorkshopResult<Totals> {
        let doc = DocumentRef::Budget(budget_id);

        let budget = self
            .storage
            .budgets
            .get(budget_id)?
            .ok_or_else(|| WorkshopError::budget_not_found(budget_id.to_string()))?;
        check_version(&doc, budget.version, expected_version)?;

        let repo = &self.storage.budget_lines;
        let old_lines = LineItemSet::from_items(repo.get_for(doc.uuid())?);

        // Estimates track the catalog until the budget is approved
        let freeze = budget.status.freezes_prices();
        let new_lines = self.build_line_set(inputs, freeze, &old_lines)?;

        // Budgets are non-binding: no stock ledger involvement at all
        self.swap_lines(repo, &doc, &old_lines, &new_lines)?;

        let totals = match Aggregator::new(self.storage).compute_for_budget(&budget, &new_lines) {
            Ok(totals) => totals,
            Err(err) => {
                self.restore_lines(repo, &doc, &old_lines);
                return Err(err);
            }
        };

        let before = budget.clone();
        let mut updated = budget;
        updated.parts_total_estimate = totals.parts;
        updated.grand_total_estimate = totals.grand;
        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        if let Err(err) = self
            .storage
            .budgets
            .upsert(updated.clone())
            .and_then(|_| self.storage.budgets.save())
        {
            let _ = self.storage.budgets.upsert(before);
            self.restore_lines(repo, &doc, &old_lines);
            return Err(err);
        }

        self.storage.log_update(
            EntityType::Budget,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            Some(format!(
                "lines: {} -> {}, grand estimate: {} -> {}",
                old_lines.len(),
                new_lines.len(),
                before.grand_total_estimate,
                updated.grand_total_estimate
            )),
        )?;

        Ok(totals)
    }

    /// Build the replacement set from the caller's inputs
    ///
    /// Every referenced item must resolve. With `freeze` set, each line gets
    /// a definite price: an explicit override wins, then the price the item
    /// already carried in the old set (insertion-time snapshots survive
    /// edits), then the current catalog price.
    fn build_line_set(
        &self,
        inputs: &[LineItemInput],
        freeze: bool,
        old_lines: &LineItemSet,
    ) -> WorkshopResult<LineItemSet> {
        let mut set = LineItemSet::new();
        for input in inputs {
            let item = self
                .storage
                .items
                .get(input.item_id)?
                .ok_or_else(|| WorkshopError::item_not_found(input.item_id.to_string()))?;

            let price = if freeze {
                input
                    .unit_price_override
                    .or_else(|| previous_override(old_lines, input.item_id))
                    .or(Some(item.unit_price))
            } else {
                input.unit_price_override
            };

            set.add_with_price(input.item_id, input.quantity, price)
                .map_err(|e| WorkshopError::Validation(e.to_string()))?;
        }
        Ok(set)
    }

    /// Swap the stored line set: in-memory replace, then one atomic file
    /// write. A failed write rolls the in-memory state back so no reader
    /// ever observes the half-committed set.
    fn swap_lines(
        &self,
        repo: &LineItemRepository,
        doc: &DocumentRef,
        old_lines: &LineItemSet,
        new_lines: &LineItemSet,
    ) -> WorkshopResult<()> {
        repo.replace_for(doc.uuid(), new_lines.clone().into_items())?;
        if let Err(err) = repo.save() {
            let _ = repo.replace_for(doc.uuid(), old_lines.clone().into_items());
            return Err(err);
        }
        Ok(())
    }

    /// Put the previous line set back after a later step failed
    fn restore_lines(&self, repo: &LineItemRepository, doc: &DocumentRef, old_lines: &LineItemSet) {
        let restored = repo
            .replace_for(doc.uuid(), old_lines.clone().into_items())
            .and_then(|_| repo.save());
        if let Err(err) = restored {
            self.storage.log_recovery(
                entity_type_of(doc.kind()),
                doc.to_string(),
                format!(
                    "PartialCommitRecovered: failed to restore previous line items: {}",
                    err
                ),
            );
        }
    }

    /// Return the stock consumed by an aborted commit
    fn compensate_stock(&self, doc: &DocumentRef, deltas: &[StockDelta]) {
        if deltas.is_empty() {
            return;
        }
        let inverse: Vec<StockDelta> = deltas
            .iter()
            .map(|d| StockDelta {
                item_id: d.item_id,
                delta: -d.delta,
            })
            .collect();

        match StockLedger::new(self.storage).apply_deltas(&inverse) {
            Ok(()) => self.storage.log_recovery(
                entity_type_of(doc.kind()),
                doc.to_string(),
                "PartialCommitRecovered: stock deltas rolled back after aborted commit".to_string(),
            ),
            Err(err) => self.storage.log_recovery(
                entity_type_of(doc.kind()),
                doc.to_string(),
                format!(
                    "PartialCommitRecovered: failed to roll back stock deltas, manual correction required: {}",
                    err
                ),
            ),
        }
    }
}

fn check_version(doc: &DocumentRef, stored: u64, expected: u64) -> WorkshopResult<()> {
    if stored != expected {
        return Err(WorkshopError::Conflict {
            entity_type: doc.kind().entity_type(),
            identifier: doc.to_string(),
        });
    }
    Ok(())
}

fn entity_type_of(kind: DocumentKind) -> EntityType {
    match kind {
        DocumentKind::WorkOrder => EntityType::WorkOrder,
        DocumentKind::Budget => EntityType::Budget,
    }
}

/// The price an item already carried in the previous set, if any
fn previous_override(old_lines: &LineItemSet, item_id: ItemId) -> Option<Money> {
    old_lines
        .iter()
        .find(|l| l.item_id == item_id)
        .and_then(|l| l.unit_price_override)
}
