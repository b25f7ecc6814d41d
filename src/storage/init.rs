//! Storage initialization
//!
//! Handles first-run setup: creates the directory layout and empty data
//! files so later loads see a consistent store rather than a missing one.

use crate::config::paths::WorkshopPaths;
use crate::error::WorkshopError;

use super::Storage;

/// Initialize storage for a fresh installation
pub fn initialize_storage(paths: &WorkshopPaths) -> Result<(), WorkshopError> {
    paths.ensure_directories()?;

    // Writing each repository once materializes its (empty) data file
    let storage = Storage::new(paths.clone())?;
    storage.save_all()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_data_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();

        assert!(paths.items_file().exists());
        assert!(paths.work_orders_file().exists());
        assert!(paths.budgets_file().exists());
        assert!(paths.work_order_lines_file().exists());
        assert!(paths.budget_lines_file().exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        initialize_storage(&paths).unwrap();
    }
}
