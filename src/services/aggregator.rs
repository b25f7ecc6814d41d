//! Totals aggregation
//!
//! Computes the canonical monetary totals of a document from its line items
//! and its negotiated labor/services amounts. Totals are recomputed on every
//! commit and every header edit; a stored total is never trusted without
//! recomputation.

use std::collections::HashMap;

use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{Budget, ItemId, LineItemSet, Money, WorkOrder};
use crate::storage::Storage;

/// The monetary breakdown of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Subtotal of the line items
    pub parts: Money,
    /// Negotiated labor amount, read straight from the document
    pub labor: Money,
    /// Negotiated services amount, read straight from the document
    pub services: Money,
    /// parts + labor + services, exact
    pub grand: Money,
}

impl Totals {
    fn new(parts: Money, labor: Money, services: Money) -> Self {
        Self {
            parts,
            labor,
            services,
            grand: parts + labor + services,
        }
    }
}

/// Service computing document totals
pub struct Aggregator<'a> {
    storage: &'a Storage,
}

impl<'a> Aggregator<'a> {
    /// Create a new aggregator over the given storage
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Totals for a work order and its line items
    pub fn compute_for_order(
        &self,
        order: &WorkOrder,
        lines: &LineItemSet,
    ) -> WorkshopResult<Totals> {
        let parts = self.parts_subtotal(lines)?;
        Ok(Totals::new(parts, order.labor_price, order.service_price))
    }

    /// Totals for a budget and its line items
    pub fn compute_for_budget(
        &self,
        budget: &Budget,
        lines: &LineItemSet,
    ) -> WorkshopResult<Totals> {
        let parts = self.parts_subtotal(lines)?;
        Ok(Totals::new(
            parts,
            budget.labor_estimate,
            budget.services_total_estimate,
        ))
    }

    /// Line-item subtotal, resolving catalog prices for unfrozen lines
    fn parts_subtotal(&self, lines: &LineItemSet) -> WorkshopResult<Money> {
        let prices = self.catalog_prices(lines)?;
        lines
            .subtotal(|id| prices.get(&id).copied())
            .map_err(|unresolved| WorkshopError::item_not_found(unresolved.0.to_string()))
    }

    /// Current catalog prices for every line still priced live
    fn catalog_prices(&self, lines: &LineItemSet) -> WorkshopResult<HashMap<ItemId, Money>> {
        let mut prices = HashMap::new();
        for line in lines.iter() {
            if line.unit_price_override.is_some() || prices.contains_key(&line.item_id) {
                continue;
            }
            let item = self
                .storage
                .items
                .get(line.item_id)?
                .ok_or_else(|| WorkshopError::item_not_found(line.item_id.to_string()))?;
            prices.insert(line.item_id, item.unit_price);
        }
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::WorkshopPaths;
    use crate::models::{InventoryItem, ItemCategory};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed_item(storage: &Storage, name: &str, price_cents: i64) -> ItemId {
        let mut item = InventoryItem::new(name, ItemCategory::Part);
        item.unit_price = Money::from_cents(price_cents);
        item.stock = 100;
        let id = item.id;
        storage.items.upsert(item).unwrap();
        id
    }

    #[test]
    fn test_order_totals_combine_parts_labor_services() {
        let (_temp_dir, storage) = create_test_storage();
        let item = seed_item(&storage, "Oil filter", 1500);
        let aggregator = Aggregator::new(&storage);

        let mut order = WorkOrder::new("Alice");
        order.labor_price = Money::from_cents(10_000);
        order.service_price = Money::from_cents(2_500);

        let mut lines = LineItemSet::new();
        lines.add(item, 2).unwrap();

        let totals = aggregator.compute_for_order(&order, &lines).unwrap();
        assert_eq!(totals.parts.cents(), 3_000);
        assert_eq!(totals.labor.cents(), 10_000);
        assert_eq!(totals.services.cents(), 2_500);
        assert_eq!(totals.grand.cents(), 15_500);
    }

    #[test]
    fn test_budget_totals_use_estimates_and_never_derive_them() {
        let (_temp_dir, storage) = create_test_storage();
        let item = seed_item(&storage, "Brake pads", 9_999);
        let aggregator = Aggregator::new(&storage);

        let mut budget = Budget::new("Bob");
        budget.labor_estimate = Money::from_cents(30_000);

        // The line carries a frozen price; the catalog price must not apply
        let mut lines = LineItemSet::new();
        lines
            .add_with_price(item, 2, Some(Money::from_cents(5_000)))
            .unwrap();

        let totals = aggregator.compute_for_budget(&budget, &lines).unwrap();
        assert_eq!(totals.parts.cents(), 10_000);
        assert_eq!(totals.labor.cents(), 30_000);
        assert_eq!(totals.services.cents(), 0);
        assert_eq!(totals.grand.cents(), 40_000);
    }

    #[test]
    fn test_totals_invariant_under_line_permutation() {
        let (_temp_dir, storage) = create_test_storage();
        let a = seed_item(&storage, "A", 100);
        let b = seed_item(&storage, "B", 250);
        let c = seed_item(&storage, "C", 40);
        let aggregator = Aggregator::new(&storage);

        let order = WorkOrder::new("Carol");

        let mut lines = LineItemSet::new();
        lines.add(a, 1).unwrap();
        lines.add(b, 2).unwrap();
        lines.add(c, 5).unwrap();
        let expected = aggregator.compute_for_order(&order, &lines).unwrap();

        let mut shuffled = lines.into_items();
        shuffled.rotate_left(1);
        shuffled.swap(0, 1);
        let permuted = LineItemSet::from_items(shuffled);

        let actual = aggregator.compute_for_order(&order, &permuted).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_unresolved_live_priced_line_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let aggregator = Aggregator::new(&storage);

        let order = WorkOrder::new("Dave");
        let mut lines = LineItemSet::new();
        lines.add(ItemId::new(), 1).unwrap();

        let err = aggregator.compute_for_order(&order, &lines).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_frozen_lines_do_not_need_the_catalog() {
        let (_temp_dir, storage) = create_test_storage();
        let aggregator = Aggregator::new(&storage);

        // Item no longer in the catalog, but the price was frozen on commit
        let order = WorkOrder::new("Erin");
        let mut lines = LineItemSet::new();
        lines
            .add_with_price(ItemId::new(), 3, Some(Money::from_cents(700)))
            .unwrap();

        let totals = aggregator.compute_for_order(&order, &lines).unwrap();
        assert_eq!(totals.parts.cents(), 2_100);
    }
}
