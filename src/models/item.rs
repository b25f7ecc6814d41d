//! Inventory item model
//!
//! Represents stocked parts and accessories that can be attached to work
//! orders and budgets as line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ItemId;
use super::money::Money;

/// Default low-stock threshold for newly created items
pub const DEFAULT_STOCK_MINIMUM: i64 = 5;

/// Category of an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Repair parts (filters, pads, belts, ...)
    Part,
    /// Accessories sold alongside repairs
    Accessory,
}

impl ItemCategory {
    /// Parse a category from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "part" | "parts" => Some(Self::Part),
            "accessory" | "accessories" => Some(Self::Accessory),
            _ => None,
        }
    }
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::Part
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part => write!(f, "Part"),
            Self::Accessory => write!(f, "Accessory"),
        }
    }
}

/// A stocked inventory item
///
/// `stock` is always non-negative; every mutation goes through the stock
/// ledger, which rejects (never clamps) movements that would violate this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier
    pub id: ItemId,

    /// Display name (e.g. "Oil filter 15x200")
    pub name: String,

    /// Item category
    pub category: ItemCategory,

    /// Manufacturer brand, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Manufacturer model/reference, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Units currently on the shelf
    pub stock: i64,

    /// Threshold below which the item counts as low stock
    #[serde(default = "default_stock_minimum")]
    pub stock_minimum: i64,

    /// Current catalog price per unit
    #[serde(default)]
    pub unit_price: Money,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_stock_minimum() -> i64 {
    DEFAULT_STOCK_MINIMUM
}

impl InventoryItem {
    /// Create a new item with default stock minimum and zero price
    pub fn new(name: impl Into<String>, category: ItemCategory) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::new(),
            name: name.into(),
            category,
            brand: None,
            model: None,
            stock: 0,
            stock_minimum: DEFAULT_STOCK_MINIMUM,
            unit_price: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when stock has fallen below the configured minimum
    ///
    /// Computed from current state on every call; never stored.
    pub fn is_low(&self) -> bool {
        self.stock < self.stock_minimum
    }

    /// Validate the item's invariants
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if self.name.len() > 100 {
            return Err(ItemValidationError::NameTooLong(self.name.len()));
        }
        if self.stock < 0 {
            return Err(ItemValidationError::NegativeStock(self.stock));
        }
        if self.stock_minimum < 1 {
            return Err(ItemValidationError::NonPositiveMinimum(self.stock_minimum));
        }
        if self.unit_price.is_negative() {
            return Err(ItemValidationError::NegativePrice);
        }
        Ok(())
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}

/// Validation errors for inventory items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeStock(i64),
    NonPositiveMinimum(i64),
    NegativePrice,
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Item name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Item name too long ({} chars, max 100)", len)
            }
            Self::NegativeStock(stock) => {
                write!(f, "Stock cannot be negative (got {})", stock)
            }
            Self::NonPositiveMinimum(min) => {
                write!(f, "Stock minimum must be at least 1 (got {})", min)
            }
            Self::NegativePrice => write!(f, "Unit price cannot be negative"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = InventoryItem::new("Oil filter", ItemCategory::Part);
        assert_eq!(item.name, "Oil filter");
        assert_eq!(item.category, ItemCategory::Part);
        assert_eq!(item.stock, 0);
        assert_eq!(item.stock_minimum, DEFAULT_STOCK_MINIMUM);
        assert_eq!(item.unit_price, Money::zero());
        assert!(item.brand.is_none());
    }

    #[test]
    fn test_is_low() {
        let mut item = InventoryItem::new("Brake pads", ItemCategory::Part);
        item.stock = 5;
        item.stock_minimum = 3;
        assert!(!item.is_low());

        item.stock = 2;
        assert!(item.is_low());

        // Equal to the minimum is not low
        item.stock = 3;
        assert!(!item.is_low());
    }

    #[test]
    fn test_validation() {
        let mut item = InventoryItem::new("Valid", ItemCategory::Accessory);
        assert!(item.validate().is_ok());

        item.name = String::new();
        assert_eq!(item.validate(), Err(ItemValidationError::EmptyName));

        item.name = "ok".into();
        item.stock = -1;
        assert_eq!(item.validate(), Err(ItemValidationError::NegativeStock(-1)));

        item.stock = 0;
        item.stock_minimum = 0;
        assert_eq!(
            item.validate(),
            Err(ItemValidationError::NonPositiveMinimum(0))
        );

        item.stock_minimum = 5;
        item.unit_price = Money::from_cents(-100);
        assert_eq!(item.validate(), Err(ItemValidationError::NegativePrice));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(ItemCategory::parse("part"), Some(ItemCategory::Part));
        assert_eq!(ItemCategory::parse("PARTS"), Some(ItemCategory::Part));
        assert_eq!(
            ItemCategory::parse("accessory"),
            Some(ItemCategory::Accessory)
        );
        assert_eq!(ItemCategory::parse("widget"), None);
    }

    #[test]
    fn test_serialization_applies_defaults() {
        // stock_minimum missing in stored data falls back to the default
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Air filter",
            "category": "part",
            "stock": 2,
            "created_at": "2025-01-15T10:00:00Z",
            "updated_at": "2025-01-15T10:00:00Z"
        }"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.stock_minimum, DEFAULT_STOCK_MINIMUM);
        assert_eq!(item.unit_price, Money::zero());
        assert!(item.is_low());
    }

    #[test]
    fn test_display() {
        let item = InventoryItem::new("Wiper blade", ItemCategory::Accessory);
        assert_eq!(format!("{}", item), "Wiper blade (Accessory)");
    }
}
