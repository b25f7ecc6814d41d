//! Path management for the workshop application
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `WORKSHOP_CLI_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/workshop-cli` or `~/.config/workshop-cli`
//! 3. Windows: `%APPDATA%\workshop-cli`

use std::path::PathBuf;

use crate::error::WorkshopError;

/// Manages all paths used by the workshop application
#[derive(Debug, Clone)]
pub struct WorkshopPaths {
    /// Base directory for all workshop data
    base_dir: PathBuf,
}

impl WorkshopPaths {
    /// Create a new WorkshopPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, WorkshopError> {
        let base_dir = if let Ok(custom) = std::env::var("WORKSHOP_CLI_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create WorkshopPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/workshop-cli/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/workshop-cli/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to items.json (the inventory catalog)
    pub fn items_file(&self) -> PathBuf {
        self.data_dir().join("items.json")
    }

    /// Get the path to work_orders.json
    pub fn work_orders_file(&self) -> PathBuf {
        self.data_dir().join("work_orders.json")
    }

    /// Get the path to budgets.json
    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    /// Get the path to work_order_lines.json
    pub fn work_order_lines_file(&self) -> PathBuf {
        self.data_dir().join("work_order_lines.json")
    }

    /// Get the path to budget_lines.json
    pub fn budget_lines_file(&self) -> PathBuf {
        self.data_dir().join("budget_lines.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), WorkshopError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| WorkshopError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| WorkshopError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the workshop has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, WorkshopError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
    Ok(config_base.join("workshop-cli"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, WorkshopError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| WorkshopError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("workshop-cli"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.items_file(),
            temp_dir.path().join("data").join("items.json")
        );
        assert_eq!(
            paths.budget_lines_file(),
            temp_dir.path().join("data").join("budget_lines.json")
        );
    }

    #[test]
    fn test_is_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(!paths.is_initialized());
        std::fs::write(paths.settings_file(), "{}").unwrap();
        assert!(paths.is_initialized());
    }
}
