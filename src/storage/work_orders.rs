//! Work order repository
//!
//! Manages loading and saving work orders to work_orders.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::WorkshopError;
use crate::models::{WorkOrder, WorkOrderId, WorkOrderStatus};

use super::file_io::{read_json, write_json_atomic};

/// Serializable work order data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct WorkOrderData {
    orders: Vec<WorkOrder>,
}

/// Repository for work order persistence
pub struct WorkOrderRepository {
    path: PathBuf,
    data: RwLock<HashMap<WorkOrderId, WorkOrder>>,
}

impl WorkOrderRepository {
    /// Create a new work order repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load work orders from disk
    pub fn load(&self) -> Result<(), WorkshopError> {
        let file_data: WorkOrderData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for order in file_data.orders {
            data.insert(order.id, order);
        }

        Ok(())
    }

    /// Save work orders to disk, newest first
    pub fn save(&self) -> Result<(), WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut orders: Vec<_> = data.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &WorkOrderData { orders })
    }

    /// Get a work order by ID
    pub fn get(&self, id: WorkOrderId) -> Result<Option<WorkOrder>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all work orders, newest first
    pub fn get_all(&self) -> Result<Vec<WorkOrder>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut orders: Vec<_> = data.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Get work orders with a given status, newest first
    pub fn get_by_status(
        &self,
        status: WorkOrderStatus,
    ) -> Result<Vec<WorkOrder>, WorkshopError> {
        let mut orders = self.get_all()?;
        orders.retain(|o| o.status == status);
        Ok(orders)
    }

    /// Insert or update a work order
    pub fn upsert(&self, order: WorkOrder) -> Result<(), WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(order.id, order);
        Ok(())
    }

    /// Delete a work order, returning whether it existed
    pub fn delete(&self, id: WorkOrderId) -> Result<bool, WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count work orders
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

    fn create_test_repo() -> (TempDir, WorkOrderRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("work_orders.json");
        let repo = WorkOrderRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_get_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let order = WorkOrder::new("Alice");
        let id = order.id;
        repo.upsert(order).unwrap();

        assert_eq!(repo.get(id).unwrap().unwrap().customer_name, "Alice");
        assert!(repo.delete(id).unwrap());
        assert!(repo.get(id).unwrap().is_none());
    }

    #[test]
    fn test_get_by_status() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut finished = WorkOrder::new("Bob");
        finished.status = WorkOrderStatus::Finished;
        repo.upsert(finished).unwrap();
        repo.upsert(WorkOrder::new("Carol")).unwrap();

        let pending = repo.get_by_status(WorkOrderStatus::Pending).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].customer_name, "Carol");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let order = WorkOrder::new("Dave");
        let id = order.id;
        repo.upsert(order).unwrap();
        repo.save().unwrap();

        let repo2 = WorkOrderRepository::new(temp_dir.path().join("work_orders.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().customer_name, "Dave");
    }
}
