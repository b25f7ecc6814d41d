//! Custom error types for the workshop application
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for workshop operations
#[derive(Error, Debug)]
pub enum WorkshopError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A stock movement would drive an item's quantity below zero
    #[error("Insufficient stock for '{item}': requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    /// Money parse failure
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Attempt to delete an entity that other records still reference
    #[error("{entity_type} {identifier} is still referenced by {references} line item(s)")]
    ReferentialIntegrity {
        entity_type: &'static str,
        identifier: String,
        references: usize,
    },

    /// Stale version on commit - the document changed since it was read
    #[error("{entity_type} {identifier} was modified concurrently; reload and retry")]
    Conflict {
        entity_type: &'static str,
        identifier: String,
    },

    /// No operator session, or an operation the session does not permit
    #[error("Session error: {0}")]
    Session(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkshopError {
    /// Create a "not found" error for inventory items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Inventory item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for work orders
    pub fn order_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Work order",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an insufficient-stock error
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, Self::InsufficientStock { .. })
    }

    /// Check if this is a stale-version conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for WorkshopError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WorkshopError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for workshop operations
pub type WorkshopResult<T> = Result<T, WorkshopError>;
