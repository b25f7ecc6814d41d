//! Inventory item repository
//!
//! Manages loading and saving the item catalog to items.json. The in-memory
//! map doubles as the stock ledger's read-through cache: it is filled on
//! `load` and written through on every successful mutation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::WorkshopError;
use crate::models::{InventoryItem, ItemCategory, ItemId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable item catalog structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ItemData {
    items: Vec<InventoryItem>,
}

/// Repository for inventory item persistence
pub struct ItemRepository {
    path: PathBuf,
    data: RwLock<HashMap<ItemId, InventoryItem>>,
}

impl ItemRepository {
    /// Create a new item repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load items from disk
    pub fn load(&self) -> Result<(), WorkshopError> {
        let file_data: ItemData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for item in file_data.items {
            data.insert(item.id, item);
        }

        Ok(())
    }

    /// Save items to disk
    pub fn save(&self) -> Result<(), WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut items: Vec<_> = data.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &ItemData { items })
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all items, sorted by name
    pub fn get_all(&self) -> Result<Vec<InventoryItem>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut items: Vec<_> = data.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Get all items of one category, sorted by name
    pub fn get_by_category(
        &self,
        category: ItemCategory,
    ) -> Result<Vec<InventoryItem>, WorkshopError> {
        let mut items = self.get_all()?;
        items.retain(|i| i.category == category);
        Ok(items)
    }

    /// Find an item by exact name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Result<Option<InventoryItem>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    /// Insert or update an item
    pub fn upsert(&self, item: InventoryItem) -> Result<(), WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(item.id, item);
        Ok(())
    }

    /// Delete an item, returning whether it existed
    pub fn delete(&self, id: ItemId) -> Result<bool, WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count items
    pub fn count(&self) -> Result<usize, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ItemRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.json");
        let repo = ItemRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut item = InventoryItem::new("Oil filter", ItemCategory::Part);
        item.stock = 12;
        let id = item.id;

        repo.upsert(item).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.stock, 12);
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(InventoryItem::new("Brake pads", ItemCategory::Part))
            .unwrap();

        assert!(repo.find_by_name("brake PADS").unwrap().is_some());
        assert!(repo.find_by_name("clutch kit").unwrap().is_none());
    }

    #[test]
    fn test_get_by_category() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(InventoryItem::new("Oil filter", ItemCategory::Part))
            .unwrap();
        repo.upsert(InventoryItem::new("Floor mats", ItemCategory::Accessory))
            .unwrap();

        let parts = repo.get_by_category(ItemCategory::Part).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "Oil filter");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let item = InventoryItem::new("Spark plug", ItemCategory::Part);
        let id = item.id;
        repo.upsert(item).unwrap();
        repo.save().unwrap();

        let repo2 = ItemRepository::new(temp_dir.path().join("items.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "Spark plug");
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let item = InventoryItem::new("Wiper blade", ItemCategory::Accessory);
        let id = item.id;
        repo.upsert(item).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
