//! Line items attached to work orders and budgets
//!
//! A [`LineItemSet`] is the ordered, editable list of parts on a document.
//! Edits are pure in-memory operations; persistence and stock movement happen
//! in the reconciler when the set is committed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{ItemId, LineItemId};
use super::money::Money;

/// One part entry on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier
    pub id: LineItemId,

    /// The referenced inventory item (weak reference; the item must outlive
    /// every line that points at it)
    pub item_id: ItemId,

    /// Units of the item on this document; always at least 1
    pub quantity: i64,

    /// Price frozen for this line. When absent the item's current catalog
    /// price applies; commits on binding documents fill this in so history
    /// is never repriced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_override: Option<Money>,

    /// Display ordering; collection order is never relied on
    pub position: u32,
}

impl LineItem {
    /// Create a line item at the given position
    pub fn new(item_id: ItemId, quantity: i64, position: u32) -> Self {
        Self {
            id: LineItemId::new(),
            item_id,
            quantity,
            unit_price_override: None,
            position,
        }
    }

    /// The effective unit price: the override when present, else the
    /// supplied catalog price
    pub fn resolved_unit_price(&self, catalog_price: Money) -> Money {
        self.unit_price_override.unwrap_or(catalog_price)
    }
}

/// The ordered set of line items belonging to one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemSet {
    items: Vec<LineItem>,
}

impl LineItemSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a set from stored line items, restoring display order
    pub fn from_items(mut items: Vec<LineItem>) -> Self {
        items.sort_by_key(|l| l.position);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Append a line for `item_id`
    pub fn add(&mut self, item_id: ItemId, quantity: i64) -> Result<(), LineItemValidationError> {
        self.add_with_price(item_id, quantity, None)
    }

    /// Append a line with an explicit price override
    pub fn add_with_price(
        &mut self,
        item_id: ItemId,
        quantity: i64,
        unit_price_override: Option<Money>,
    ) -> Result<(), LineItemValidationError> {
        if quantity < 1 {
            return Err(LineItemValidationError::NonPositiveQuantity(quantity));
        }
        if let Some(price) = unit_price_override {
            if price.is_negative() {
                return Err(LineItemValidationError::NegativePrice);
            }
        }
        let mut line = LineItem::new(item_id, quantity, self.items.len() as u32);
        line.unit_price_override = unit_price_override;
        self.items.push(line);
        Ok(())
    }

    /// Remove the line at `index`, re-numbering the lines after it
    pub fn remove(&mut self, index: usize) -> Result<LineItem, LineItemValidationError> {
        if index >= self.items.len() {
            return Err(LineItemValidationError::IndexOutOfBounds(index));
        }
        let removed = self.items.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Change the quantity of the line at `index`
    pub fn update_quantity(
        &mut self,
        index: usize,
        quantity: i64,
    ) -> Result<(), LineItemValidationError> {
        if quantity < 1 {
            return Err(LineItemValidationError::NonPositiveQuantity(quantity));
        }
        let line = self
            .items
            .get_mut(index)
            .ok_or(LineItemValidationError::IndexOutOfBounds(index))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Swap the line at `index` to reference a different item
    ///
    /// The price override is cleared: a frozen price belongs to the item it
    /// was resolved from.
    pub fn update_item_ref(
        &mut self,
        index: usize,
        item_id: ItemId,
    ) -> Result<(), LineItemValidationError> {
        let line = self
            .items
            .get_mut(index)
            .ok_or(LineItemValidationError::IndexOutOfBounds(index))?;
        line.item_id = item_id;
        line.unit_price_override = None;
        Ok(())
    }

    /// Effective unit price of the line at `index`
    pub fn unit_price_at<F>(&self, index: usize, price_of: F) -> Option<Money>
    where
        F: Fn(ItemId) -> Option<Money>,
    {
        let line = self.items.get(index)?;
        match line.unit_price_override {
            Some(price) => Some(price),
            None => price_of(line.item_id),
        }
    }

    /// Total quantity per referenced item
    ///
    /// A document may list the same item on several lines; stock movement is
    /// computed from the aggregate.
    pub fn quantities_by_item(&self) -> HashMap<ItemId, i64> {
        let mut quantities = HashMap::new();
        for line in &self.items {
            *quantities.entry(line.item_id).or_insert(0) += line.quantity;
        }
        quantities
    }

    /// Sum of `quantity x unit price` across all lines, exact Money arithmetic
    ///
    /// `price_of` resolves the current catalog price for lines without an
    /// override; an unresolvable reference fails the whole computation.
    pub fn subtotal<F>(&self, price_of: F) -> Result<Money, UnresolvedItemRef>
    where
        F: Fn(ItemId) -> Option<Money>,
    {
        let mut total = Money::zero();
        for line in &self.items {
            let unit = match line.unit_price_override {
                Some(price) => price,
                None => price_of(line.item_id).ok_or(UnresolvedItemRef(line.item_id))?,
            };
            total += unit * line.quantity;
        }
        Ok(total)
    }

    fn renumber(&mut self) {
        for (i, line) in self.items.iter_mut().enumerate() {
            line.position = i as u32;
        }
    }
}

/// A pending stock movement for one item
///
/// Produced when a line-item set is diffed against its previous snapshot.
/// Never persisted; applied to inventory only through the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub item_id: ItemId,
    pub delta: i64,
}

/// Validation errors for line-item edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemValidationError {
    NonPositiveQuantity(i64),
    NegativePrice,
    IndexOutOfBounds(usize),
}

impl fmt::Display for LineItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveQuantity(q) => {
                write!(f, "Quantity must be at least 1 (got {})", q)
            }
            Self::NegativePrice => write!(f, "Unit price cannot be negative"),
            Self::IndexOutOfBounds(i) => write!(f, "No line item at index {}", i),
        }
    }
}

impl std::error::Error for LineItemValidationError {}

/// A line item referenced an inventory item that could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedItemRef(pub ItemId);

impl fmt::Display for UnresolvedItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line item references unknown inventory item {}", self.0)
    }
}

impl std::error::Error for UnresolvedItemRef {}

#[cfg(test)]
mod tests {
    use super::*;

    fn price_table(pairs: &[(ItemId, i64)]) -> HashMap<ItemId, Money> {
        pairs
            .iter()
            .map(|(id, cents)| (*id, Money::from_cents(*cents)))
            .collect()
    }

    #[test]
    fn test_add_and_positions() {
        let a = ItemId::new();
        let b = ItemId::new();
        let mut set = LineItemSet::new();
        set.add(a, 2).unwrap();
        set.add(b, 1).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].position, 0);
        assert_eq!(set.as_slice()[1].position, 1);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut set = LineItemSet::new();
        assert_eq!(
            set.add(ItemId::new(), 0),
            Err(LineItemValidationError::NonPositiveQuantity(0))
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_renumbers() {
        let mut set = LineItemSet::new();
        for _ in 0..3 {
            set.add(ItemId::new(), 1).unwrap();
        }
        set.remove(0).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].position, 0);
        assert_eq!(set.as_slice()[1].position, 1);

        assert_eq!(
            set.remove(5),
            Err(LineItemValidationError::IndexOutOfBounds(5))
        );
    }

    #[test]
    fn test_update_quantity() {
        let mut set = LineItemSet::new();
        set.add(ItemId::new(), 1).unwrap();

        set.update_quantity(0, 4).unwrap();
        assert_eq!(set.as_slice()[0].quantity, 4);

        assert_eq!(
            set.update_quantity(0, 0),
            Err(LineItemValidationError::NonPositiveQuantity(0))
        );
    }

    #[test]
    fn test_update_item_ref_clears_override() {
        let a = ItemId::new();
        let b = ItemId::new();
        let mut set = LineItemSet::new();
        set.add_with_price(a, 1, Some(Money::from_cents(500))).unwrap();

        set.update_item_ref(0, b).unwrap();
        assert_eq!(set.as_slice()[0].item_id, b);
        assert!(set.as_slice()[0].unit_price_override.is_none());
    }

    #[test]
    fn test_quantities_by_item_aggregates_duplicates() {
        let a = ItemId::new();
        let b = ItemId::new();
        let mut set = LineItemSet::new();
        set.add(a, 2).unwrap();
        set.add(b, 1).unwrap();
        set.add(a, 3).unwrap();

        let quantities = set.quantities_by_item();
        assert_eq!(quantities[&a], 5);
        assert_eq!(quantities[&b], 1);
    }

    #[test]
    fn test_subtotal_uses_override_then_catalog() {
        let a = ItemId::new();
        let b = ItemId::new();
        let prices = price_table(&[(a, 1000), (b, 2000)]);

        let mut set = LineItemSet::new();
        set.add(a, 2).unwrap(); // catalog: 2 x 10.00
        set.add_with_price(b, 1, Some(Money::from_cents(1500))).unwrap(); // frozen: 15.00

        let subtotal = set.subtotal(|id| prices.get(&id).copied()).unwrap();
        assert_eq!(subtotal.cents(), 3500);
    }

    #[test]
    fn test_subtotal_fails_on_unresolved_ref() {
        let a = ItemId::new();
        let mut set = LineItemSet::new();
        set.add(a, 1).unwrap();

        let result = set.subtotal(|_| None);
        assert_eq!(result, Err(UnresolvedItemRef(a)));
    }

    #[test]
    fn test_subtotal_invariant_under_permutation() {
        let a = ItemId::new();
        let b = ItemId::new();
        let c = ItemId::new();
        let prices = price_table(&[(a, 1000), (b, 2500), (c, 50)]);

        let mut set = LineItemSet::new();
        set.add(a, 2).unwrap();
        set.add(b, 1).unwrap();
        set.add(c, 10).unwrap();
        let expected = set.subtotal(|id| prices.get(&id).copied()).unwrap();

        // Reverse the stored order; the subtotal must not change
        let mut reversed = set.into_items();
        reversed.reverse();
        let permuted = LineItemSet::from_items(reversed);
        let actual = permuted.subtotal(|id| prices.get(&id).copied()).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_from_items_restores_display_order() {
        let a = ItemId::new();
        let stored_second = LineItem::new(a, 1, 1);
        let stored_first = LineItem::new(a, 2, 0);

        let set = LineItemSet::from_items(vec![stored_second, stored_first]);
        assert_eq!(set.as_slice()[0].position, 0);
        assert_eq!(set.as_slice()[0].quantity, 2);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut set = LineItemSet::new();
        set.add_with_price(ItemId::new(), 3, Some(Money::from_cents(999)))
            .unwrap();

        let json = serde_json::to_string(&set).unwrap();
        let restored: LineItemSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, restored);
    }
}
