//! Budget repository
//!
//! Manages loading and saving budgets to budgets.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::WorkshopError;
use crate::models::{Budget, BudgetId, BudgetStatus};

use super::file_io::{read_json, write_json_atomic};

/// Serializable budget data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), WorkshopError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for budget in file_data.budgets {
            data.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Save budgets to disk, newest first
    pub fn save(&self) -> Result<(), WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut budgets: Vec<_> = data.values().cloned().collect();
        budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &BudgetData { budgets })
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all budgets, newest first
    pub fn get_all(&self) -> Result<Vec<Budget>, WorkshopError> {
        let data = self
            .data
            .read()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut budgets: Vec<_> = data.values().cloned().collect();
        budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(budgets)
    }

    /// Get budgets with a given status, newest first
    pub fn get_by_status(&self, status: BudgetStatus) -> Result<Vec<Budget>, WorkshopError> {
        let mut budgets = self.get_all()?;
        budgets.retain(|b| b.status == status);
        Ok(budgets)
    }

    /// Insert or update a budget
    pub fn upsert(&self, budget: Budget) -> Result<(), WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(budget.id, budget);
        Ok(())
    }

    /// Delete a budget, returning whether it existed
    pub fn delete(&self, id: BudgetId) -> Result<bool, WorkshopError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| WorkshopError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count budgets
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

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");
        let repo = BudgetRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_get_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget = Budget::new("Erin");
        let id = budget.id;
        repo.upsert(budget).unwrap();

        assert_eq!(repo.get(id).unwrap().unwrap().customer_name, "Erin");
        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_by_status() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let mut approved = Budget::new("Frank");
        approved.status = BudgetStatus::Approved;
        repo.upsert(approved).unwrap();
        repo.upsert(Budget::new("Grace")).unwrap();

        let drafts = repo.get_by_status(BudgetStatus::Draft).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].customer_name, "Grace");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget = Budget::new("Hugo");
        let id = budget.id;
        repo.upsert(budget).unwrap();
        repo.save().unwrap();

        let repo2 = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().customer_name, "Hugo");
    }
}
