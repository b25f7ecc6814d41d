//! Storage layer for the workshop application
//!
//! Provides JSON file storage with atomic writes. Each collection lives in
//! its own repository over an in-memory map; the coordinator wires them to
//! their files and owns the audit logger.

pub mod budgets;
pub mod file_io;
pub mod init;
pub mod items;
pub mod line_items;
pub mod work_orders;

pub use budgets::BudgetRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use items::ItemRepository;
pub use line_items::LineItemRepository;
pub use work_orders::WorkOrderRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::WorkshopPaths;
use crate::error::WorkshopError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: WorkshopPaths,
    audit: AuditLogger,
    pub items: ItemRepository,
    pub work_orders: WorkOrderRepository,
    pub budgets: BudgetRepository,
    /// Line items attached to work orders
    pub order_lines: LineItemRepository,
    /// Line items attached to budgets
    pub budget_lines: LineItemRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: WorkshopPaths) -> Result<Self, WorkshopError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            items: ItemRepository::new(paths.items_file()),
            work_orders: WorkOrderRepository::new(paths.work_orders_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            order_lines: LineItemRepository::new(paths.work_order_lines_file()),
            budget_lines: LineItemRepository::new(paths.budget_lines_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &WorkshopPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), WorkshopError> {
        self.items.load()?;
        self.work_orders.load()?;
        self.budgets.load()?;
        self.order_lines.load()?;
        self.budget_lines.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), WorkshopError> {
        self.items.save()?;
        self.work_orders.save()?;
        self.budgets.save()?;
        self.order_lines.save()?;
        self.budget_lines.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.settings_file().exists()
    }

    /// Record a create operation in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), WorkshopError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update operation in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Result<(), WorkshopError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    /// Record a delete operation in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), WorkshopError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Record a commit-recovery warning in the audit log
    ///
    /// Best effort: recovery logging must never mask the error that caused
    /// the recovery, so a logging failure is swallowed here.
    pub fn log_recovery(&self, entity_type: EntityType, entity_id: String, detail: String) {
        let _ = self
            .audit
            .log(&AuditEntry::recovered(entity_type, entity_id, detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_load_and_save_all() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();

        storage.load_all().unwrap();
        storage.save_all().unwrap();

        assert!(temp_dir.path().join("data").join("items.json").exists());
        assert!(temp_dir
            .path()
            .join("data")
            .join("work_orders.json")
            .exists());
    }
}
