//! Budget (quote) model
//!
//! A budget is a non-binding estimate for a prospective repair. It carries
//! the same customer/vehicle header as a work order but never moves stock;
//! its line items are priced live from the catalog until the budget is
//! approved, at which point prices freeze.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;
use super::money::Money;
use super::work_order::DocumentValidationError;

/// Lifecycle status of a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Being composed; estimates track current catalog prices
    Draft,
    /// Sent to the customer
    Sent,
    /// Accepted by the customer; prices are frozen from here on
    Approved,
    /// Declined by the customer
    Rejected,
    /// Lapsed without an answer
    Expired,
}

impl BudgetStatus {
    /// Parse a status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// True once the customer has accepted: line prices freeze and the
    /// estimate stops tracking the catalog
    pub fn freezes_prices(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl Default for BudgetStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Sent => write!(f, "Sent"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

/// A repair estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Customer name
    pub customer_name: String,

    /// Customer phone number
    #[serde(default)]
    pub customer_phone: String,

    /// Vehicle brand
    #[serde(default)]
    pub vehicle_brand: String,

    /// Vehicle model
    #[serde(default)]
    pub vehicle_model: String,

    /// What the estimate covers
    #[serde(default)]
    pub description: String,

    /// Current status
    #[serde(default)]
    pub status: BudgetStatus,

    /// Negotiated labor estimate
    #[serde(default)]
    pub labor_estimate: Money,

    /// Negotiated services estimate
    #[serde(default)]
    pub services_total_estimate: Money,

    /// Parts subtotal; recomputed from the line items on every commit
    #[serde(default)]
    pub parts_total_estimate: Money,

    /// Grand total; recomputed on every commit, never trusted as cached
    #[serde(default)]
    pub grand_total_estimate: Money,

    /// Optimistic-concurrency token; bumped on every persisted change
    #[serde(default)]
    pub version: u64,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new draft budget
    pub fn new(customer_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            customer_name: customer_name.into(),
            customer_phone: String::new(),
            vehicle_brand: String::new(),
            vehicle_model: String::new(),
            description: String::new(),
            status: BudgetStatus::Draft,
            labor_estimate: Money::zero(),
            services_total_estimate: Money::zero(),
            parts_total_estimate: Money::zero(),
            grand_total_estimate: Money::zero(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the budget's fields
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if self.customer_name.trim().is_empty() {
            return Err(DocumentValidationError::EmptyCustomerName);
        }
        if self.labor_estimate.is_negative() || self.services_total_estimate.is_negative() {
            return Err(DocumentValidationError::NegativeAmount);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {} ({})",
            self.customer_name, self.vehicle_brand, self.vehicle_model, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_budget_defaults() {
        let budget = Budget::new("Carol Diaz");
        assert_eq!(budget.status, BudgetStatus::Draft);
        assert_eq!(budget.grand_total_estimate, Money::zero());
        assert_eq!(budget.version, 0);
    }

    #[test]
    fn test_status_freezes_prices() {
        assert!(!BudgetStatus::Draft.freezes_prices());
        assert!(!BudgetStatus::Sent.freezes_prices());
        assert!(BudgetStatus::Approved.freezes_prices());
        assert!(!BudgetStatus::Rejected.freezes_prices());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(BudgetStatus::parse("draft"), Some(BudgetStatus::Draft));
        assert_eq!(BudgetStatus::parse("APPROVED"), Some(BudgetStatus::Approved));
        assert_eq!(BudgetStatus::parse("maybe"), None);
    }

    #[test]
    fn test_validation() {
        let mut budget = Budget::new("Dan");
        assert!(budget.validate().is_ok());

        budget.labor_estimate = Money::from_cents(-5);
        assert_eq!(
            budget.validate(),
            Err(DocumentValidationError::NegativeAmount)
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let budget = Budget::new("Test");
        let json = serde_json::to_string(&budget).unwrap();
        let restored: Budget = serde_json::from_str(&json).unwrap();
        assert_eq!(budget.id, restored.id);
        assert_eq!(restored.status, BudgetStatus::Draft);
    }
}
