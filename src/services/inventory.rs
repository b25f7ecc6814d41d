//! Inventory service
//!
//! Business logic for the item catalog: creation, edits, deletion with
//! referential-integrity protection, and lookups. Stock quantities are
//! deliberately absent here - every movement goes through the stock ledger.

use crate::audit::EntityType;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{InventoryItem, ItemCategory, ItemId, Money};
use crate::storage::Storage;

/// Service for inventory catalog management
pub struct InventoryService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new inventory item
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub name: String,
    pub category: ItemCategory,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub initial_stock: i64,
    pub stock_minimum: Option<i64>,
    pub unit_price: Option<Money>,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new item in the catalog
    pub fn create(&self, input: CreateItemInput) -> WorkshopResult<InventoryItem> {
        let name = input.name.trim();
        if self.storage.items.find_by_name(name)?.is_some() {
            return Err(WorkshopError::Duplicate {
                entity_type: "Inventory item",
                identifier: name.to_string(),
            });
        }

        let mut item = InventoryItem::new(name, input.category);
        item.brand = input.brand.filter(|b| !b.trim().is_empty());
        item.model = input.model.filter(|m| !m.trim().is_empty());
        item.stock = input.initial_stock;
        if let Some(minimum) = input.stock_minimum {
            item.stock_minimum = minimum;
        }
        if let Some(price) = input.unit_price {
            item.unit_price = price;
        }

        item.validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        self.storage.items.upsert(item.clone())?;
        self.storage.items.save()?;

        self.storage.log_create(
            EntityType::Item,
            item.id.to_string(),
            Some(item.name.clone()),
            &item,
        )?;

        Ok(item)
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> WorkshopResult<Option<InventoryItem>> {
        self.storage.items.get(id)
    }

    /// Find an item by ID string or name
    pub fn find(&self, identifier: &str) -> WorkshopResult<Option<InventoryItem>> {
        if let Ok(id) = identifier.parse::<ItemId>() {
            if let Some(item) = self.storage.items.get(id)? {
                return Ok(Some(item));
            }
        }
        self.storage.items.find_by_name(identifier)
    }

    /// List items, optionally restricted to one category
    pub fn list(&self, category: Option<ItemCategory>) -> WorkshopResult<Vec<InventoryItem>> {
        match category {
            Some(category) => self.storage.items.get_by_category(category),
            None => self.storage.items.get_all(),
        }
    }

    /// Update an item's catalog fields
    ///
    /// Stock is not editable here; use the ledger's adjustment path.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        id: ItemId,
        name: Option<String>,
        category: Option<ItemCategory>,
        brand: Option<Option<String>>,
        model: Option<Option<String>>,
        stock_minimum: Option<i64>,
        unit_price: Option<Money>,
    ) -> WorkshopResult<InventoryItem> {
        let mut item = self
            .storage
            .items
            .get(id)?
            .ok_or_else(|| WorkshopError::item_not_found(id.to_string()))?;

        let before = item.clone();

        if let Some(new_name) = name {
            let new_name = new_name.trim().to_string();
            if let Some(existing) = self.storage.items.find_by_name(&new_name)? {
                if existing.id != id {
                    return Err(WorkshopError::Duplicate {
                        entity_type: "Inventory item",
                        identifier: new_name,
                    });
                }
            }
            item.name = new_name;
        }
        if let Some(new_category) = category {
            item.category = new_category;
        }
        if let Some(new_brand) = brand {
            item.brand = new_brand.filter(|b| !b.trim().is_empty());
        }
        if let Some(new_model) = model {
            item.model = new_model.filter(|m| !m.trim().is_empty());
        }
        if let Some(new_minimum) = stock_minimum {
            item.stock_minimum = new_minimum;
        }
        if let Some(new_price) = unit_price {
            item.unit_price = new_price;
        }

        item.updated_at = chrono::Utc::now();
        item.validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        self.storage.items.upsert(item.clone())?;
        self.storage.items.save()?;

        // Build diff summary
        let mut changes = Vec::new();
        if before.name != item.name {
            changes.push(format!("name: '{}' -> '{}'", before.name, item.name));
        }
        if before.category != item.category {
            changes.push(format!("category: {} -> {}", before.category, item.category));
        }
        if before.stock_minimum != item.stock_minimum {
            changes.push(format!(
                "stock_minimum: {} -> {}",
                before.stock_minimum, item.stock_minimum
            ));
        }
        if before.unit_price != item.unit_price {
            changes.push(format!(
                "unit_price: {} -> {}",
                before.unit_price, item.unit_price
            ));
        }

        let diff = if changes.is_empty() {
            None
        } else {
            Some(changes.join(", "))
        };

        self.storage.log_update(
            EntityType::Item,
            item.id.to_string(),
            Some(item.name.clone()),
            &before,
            &item,
            diff,
        )?;

        Ok(item)
    }

    /// Delete an item from the catalog
    ///
    /// Items referenced by line items on any work order or budget cannot be
    /// deleted; the weak references must be removed from their documents
    /// first.
    pub fn delete(&self, id: ItemId) -> WorkshopResult<InventoryItem> {
        let item = self
            .storage
            .items
            .get(id)?
            .ok_or_else(|| WorkshopError::item_not_found(id.to_string()))?;

        let references = self.storage.order_lines.count_references(id)?
            + self.storage.budget_lines.count_references(id)?;
        if references > 0 {
            return Err(WorkshopError::ReferentialIntegrity {
                entity_type: "Inventory item",
                identifier: item.name.clone(),
                references,
            });
        }

        self.storage.items.delete(id)?;
        self.storage.items.save()?;

        self.storage.log_delete(
            EntityType::Item,
            item.id.to_string(),
            Some(item.name.clone()),
            &item,
        )?;

        Ok(item)
    }

    /// Count catalog items
    pub fn count(&self) -> WorkshopResult<usize> {
        self.storage.items.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::WorkshopPaths;
    use crate::models::LineItem;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn input(name: &str) -> CreateItemInput {
        CreateItemInput {
            name: name.to_string(),
            category: ItemCategory::Part,
            brand: None,
            model: None,
            initial_stock: 0,
            stock_minimum: None,
            unit_price: None,
        }
    }

    #[test]
    fn test_create_item() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service
            .create(CreateItemInput {
                name: "Oil filter".to_string(),
                category: ItemCategory::Part,
                brand: Some("Bosch".to_string()),
                model: Some("F-026".to_string()),
                initial_stock: 10,
                stock_minimum: Some(3),
                unit_price: Some(Money::from_cents(1500)),
            })
            .unwrap();

        assert_eq!(item.stock, 10);
        assert_eq!(item.stock_minimum, 3);
        assert_eq!(item.brand.as_deref(), Some("Bosch"));
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        service.create(input("Oil filter")).unwrap();
        let err = service.create(input("oil FILTER")).unwrap_err();
        assert!(matches!(err, WorkshopError::Duplicate { .. }));
    }

    #[test]
    fn test_create_rejects_invalid_fields() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let mut bad = input("Valid");
        bad.initial_stock = -2;
        assert!(service.create(bad).unwrap_err().is_validation());

        let mut bad = input("Valid");
        bad.stock_minimum = Some(0);
        assert!(service.create(bad).unwrap_err().is_validation());
    }

    #[test]
    fn test_find_by_id_or_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.create(input("Brake pads")).unwrap();

        let by_name = service.find("brake pads").unwrap().unwrap();
        assert_eq!(by_name.id, item.id);

        let by_id = service
            .find(&item.id.as_uuid().to_string())
            .unwrap()
            .unwrap();
        assert_eq!(by_id.id, item.id);

        assert!(service.find("unknown").unwrap().is_none());
    }

    #[test]
    fn test_update_item() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.create(input("Wiper")).unwrap();

        let updated = service
            .update(
                item.id,
                Some("Wiper blade".to_string()),
                Some(ItemCategory::Accessory),
                None,
                None,
                Some(10),
                Some(Money::from_cents(800)),
            )
            .unwrap();

        assert_eq!(updated.name, "Wiper blade");
        assert_eq!(updated.category, ItemCategory::Accessory);
        assert_eq!(updated.stock_minimum, 10);
        assert_eq!(updated.unit_price.cents(), 800);
    }

    #[test]
    fn test_delete_unreferenced_item() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.create(input("Coolant")).unwrap();
        service.delete(item.id).unwrap();
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_referenced_item_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.create(input("Clutch kit")).unwrap();

        // Attach the item to some document's line items
        storage
            .order_lines
            .replace_for(Uuid::new_v4(), vec![LineItem::new(item.id, 1, 0)])
            .unwrap();

        let err = service.delete(item.id).unwrap_err();
        assert!(matches!(
            err,
            WorkshopError::ReferentialIntegrity { references: 1, .. }
        ));

        // Item still present
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_checks_budget_lines_too() {
        let (_temp_dir, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.create(input("Battery")).unwrap();
        storage
            .budget_lines
            .replace_for(Uuid::new_v4(), vec![LineItem::new(item.id, 2, 0)])
            .unwrap();

        assert!(matches!(
            service.delete(item.id).unwrap_err(),
            WorkshopError::ReferentialIntegrity { .. }
        ));
    }
}
