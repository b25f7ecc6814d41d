//! Work order model
//!
//! A work order is the binding document of the shop: the parts attached to
//! it consume real inventory, and its totals are what the customer pays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::WorkOrderId;
use super::money::Money;

/// Lifecycle status of a work order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Vehicle received, work not started
    Pending,
    /// Work in progress
    InRepair,
    /// Work completed and delivered
    Finished,
}

impl WorkOrderStatus {
    /// Parse a status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_repair" | "in-repair" | "inrepair" | "repair" => Some(Self::InRepair),
            "finished" | "done" => Some(Self::Finished),
            _ => None,
        }
    }
}

impl Default for WorkOrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InRepair => write!(f, "In repair"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// A repair work order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Unique identifier
    pub id: WorkOrderId,

    /// Customer name
    pub customer_name: String,

    /// Customer phone number
    #[serde(default)]
    pub customer_phone: String,

    /// Vehicle brand (e.g. "Toyota")
    #[serde(default)]
    pub vehicle_brand: String,

    /// Vehicle model (e.g. "Corolla 2018")
    #[serde(default)]
    pub vehicle_model: String,

    /// Problem as reported by the customer
    #[serde(default)]
    pub problem: String,

    /// Mechanic's diagnosis
    #[serde(default)]
    pub diagnosis: String,

    /// Current status
    #[serde(default)]
    pub status: WorkOrderStatus,

    /// Negotiated price for services (towing, cleaning, ...)
    #[serde(default)]
    pub service_price: Money,

    /// Negotiated price for labor
    #[serde(default)]
    pub labor_price: Money,

    /// Canonical grand total; recomputed and persisted on every commit,
    /// never trusted without recomputation
    #[serde(default)]
    pub total: Money,

    /// Optimistic-concurrency token; bumped on every persisted change
    #[serde(default)]
    pub version: u64,

    /// When the order was created
    pub created_at: DateTime<Utc>,

    /// When the order was last modified
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    /// Create a new pending work order
    pub fn new(customer_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkOrderId::new(),
            customer_name: customer_name.into(),
            customer_phone: String::new(),
            vehicle_brand: String::new(),
            vehicle_model: String::new(),
            problem: String::new(),
            diagnosis: String::new(),
            status: WorkOrderStatus::Pending,
            service_price: Money::zero(),
            labor_price: Money::zero(),
            total: Money::zero(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the order's fields
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if self.customer_name.trim().is_empty() {
            return Err(DocumentValidationError::EmptyCustomerName);
        }
        if self.service_price.is_negative() || self.labor_price.is_negative() {
            return Err(DocumentValidationError::NegativeAmount);
        }
        Ok(())
    }
}

impl fmt::Display for WorkOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {} ({})",
            self.customer_name, self.vehicle_brand, self.vehicle_model, self.status
        )
    }
}

/// Validation errors shared by work orders and budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    EmptyCustomerName,
    NegativeAmount,
}

impl fmt::Display for DocumentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCustomerName => write!(f, "Customer name cannot be empty"),
            Self::NegativeAmount => write!(f, "Monetary fields cannot be negative"),
        }
    }
}

impl std::error::Error for DocumentValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_defaults() {
        let order = WorkOrder::new("Alice Carter");
        assert_eq!(order.customer_name, "Alice Carter");
        assert_eq!(order.status, WorkOrderStatus::Pending);
        assert_eq!(order.total, Money::zero());
        assert_eq!(order.version, 0);
    }

    #[test]
    fn test_validation() {
        let mut order = WorkOrder::new("Bob");
        assert!(order.validate().is_ok());

        order.customer_name = "  ".into();
        assert_eq!(
            order.validate(),
            Err(DocumentValidationError::EmptyCustomerName)
        );

        order.customer_name = "Bob".into();
        order.labor_price = Money::from_cents(-1);
        assert_eq!(order.validate(), Err(DocumentValidationError::NegativeAmount));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            WorkOrderStatus::parse("pending"),
            Some(WorkOrderStatus::Pending)
        );
        assert_eq!(
            WorkOrderStatus::parse("in-repair"),
            Some(WorkOrderStatus::InRepair)
        );
        assert_eq!(
            WorkOrderStatus::parse("FINISHED"),
            Some(WorkOrderStatus::Finished)
        );
        assert_eq!(WorkOrderStatus::parse("paused"), None);
    }

    #[test]
    fn test_serialization_round_trip() {
        let order = WorkOrder::new("Test");
        let json = serde_json::to_string(&order).unwrap();
        let restored: WorkOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(order.id, restored.id);
        assert_eq!(restored.status, WorkOrderStatus::Pending);
    }
}
