//! Line item repository
//!
//! One instance per line-item collection (work-order lines and budget lines
//! are stored in separate files). Lines are keyed by their parent document,
//! and a document's whole set is always replaced in one operation - callers
//! never observe a half-replaced set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::WorkshopError;
use crate::models::{ItemId, LineItem};

use super::file_io::{read_json, write_json_atomic};

/// Serializable line item data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LineItemData {
    /// Parent document UUID -> its line items
    lines: HashMap<Uuid, Vec<LineItem>>,
}

/// Repository for the line items of one document collection
pub struct LineItemRepository {
    path: PathBuf,
    data: RwLock<HashMap<Uuid, Vec<LineItem>>>,
}

impl LineItemRepository {
    /// Create a new line item repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load line items from disk
    pub fn load(&self) -> Result<(), WorkshopError> {
        let file_data: LineItemData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = file_data.lines;
        Ok(())
    }

    /// Save line items to disk
    pub fn save(&self) -> Result<(), WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(
            &self.path,
            &LineItemData {
                lines: data.clone(),
            },
        )
    }

    /// Get the line items of one document, in display order
    pub fn get_for(&self, parent: Uuid) -> Result<Vec<LineItem>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut lines = data.get(&parent).cloned().unwrap_or_default();
        lines.sort_by_key(|l| l.position);
        Ok(lines)
    }

    /// Replace a document's entire line item set in one step
    ///
    /// The swap happens under a single write lock; an empty new set removes
    /// the document's entry entirely.
    pub fn replace_for(&self, parent: Uuid, lines: Vec<LineItem>) -> Result<(), WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if lines.is_empty() {
            data.remove(&parent);
        } else {
            data.insert(parent, lines);
        }
        Ok(())
    }

    /// Remove all line items of a document, returning whether any existed
    pub fn delete_for(&self, parent: Uuid) -> Result<bool, WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&parent).is_some())
    }

    /// Count lines across all documents that reference an inventory item
    pub fn count_references(&self, item_id: ItemId) -> Result<usize, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .flatten()
            .filter(|l| l.item_id == item_id)
            .count())
    }

    /// Count line items across all documents
    pub fn count(&self) -> Result<usize, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.values().map(|v| v.len()).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, LineItemRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lines.json");
        let repo = LineItemRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_document_has_no_lines() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        assert!(repo.get_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_replace_and_get_in_display_order() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let parent = Uuid::new_v4();
        let item = ItemId::new();
        let lines = vec![
            LineItem::new(item, 2, 1),
            LineItem::new(item, 5, 0),
        ];
        repo.replace_for(parent, lines).unwrap();

        let stored = repo.get_for(parent).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].quantity, 5);
        assert_eq!(stored[1].quantity, 2);
    }

    #[test]
    fn test_replace_with_empty_removes_entry() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let parent = Uuid::new_v4();
        repo.replace_for(parent, vec![LineItem::new(ItemId::new(), 1, 0)])
            .unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        repo.replace_for(parent, Vec::new()).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(!repo.delete_for(parent).unwrap());
    }

    #[test]
    fn test_count_references_across_documents() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let shared = ItemId::new();
        let other = ItemId::new();
        repo.replace_for(
            Uuid::new_v4(),
            vec![LineItem::new(shared, 1, 0), LineItem::new(other, 1, 1)],
        )
        .unwrap();
        repo.replace_for(Uuid::new_v4(), vec![LineItem::new(shared, 3, 0)])
            .unwrap();

        assert_eq!(repo.count_references(shared).unwrap(), 2);
        assert_eq!(repo.count_references(other).unwrap(), 1);
        assert_eq!(repo.count_references(ItemId::new()).unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let parent = Uuid::new_v4();
        repo.replace_for(parent, vec![LineItem::new(ItemId::new(), 4, 0)])
            .unwrap();
        repo.save().unwrap();

        let repo2 = LineItemRepository::new(temp_dir.path().join("lines.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get_for(parent).unwrap()[0].quantity, 4);
    }
}
