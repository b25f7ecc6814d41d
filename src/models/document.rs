//! Document identity shared by work orders and budgets
//!
//! The two document kinds share reconciliation machinery but differ in one
//! crucial way: only work orders move stock. The kind is a closed variant so
//! adding a future document type forces every dispatch site to be revisited.

use std::fmt;

use uuid::Uuid;

use super::ids::{BudgetId, WorkOrderId};

/// The kind of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    WorkOrder,
    Budget,
}

impl DocumentKind {
    /// Whether committing this kind of document applies stock deltas
    ///
    /// Work orders are binding; budgets are estimates and never touch the
    /// ledger.
    pub fn moves_stock(&self) -> bool {
        match self {
            Self::WorkOrder => true,
            Self::Budget => false,
        }
    }

    /// Entity label used in errors and the audit log
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::WorkOrder => "Work order",
            Self::Budget => "Budget",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_type())
    }
}

/// Typed reference to a document of either kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRef {
    WorkOrder(WorkOrderId),
    Budget(BudgetId),
}

impl DocumentRef {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::WorkOrder(_) => DocumentKind::WorkOrder,
            Self::Budget(_) => DocumentKind::Budget,
        }
    }

    /// The raw UUID, used as the line-item parent key in storage
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::WorkOrder(id) => *id.as_uuid(),
            Self::Budget(id) => *id.as_uuid(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkOrder(id) => write!(f, "{}", id),
            Self::Budget(id) => write!(f, "{}", id),
        }
    }
}

impl From<WorkOrderId> for DocumentRef {
    fn from(id: WorkOrderId) -> Self {
        Self::WorkOrder(id)
    }
}

impl From<BudgetId> for DocumentRef {
    fn from(id: BudgetId) -> Self {
        Self::Budget(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_work_orders_move_stock() {
        assert!(DocumentKind::WorkOrder.moves_stock());
        assert!(!DocumentKind::Budget.moves_stock());
    }

    #[test]
    fn test_ref_kind_and_uuid() {
        let order_id = WorkOrderId::new();
        let doc: DocumentRef = order_id.into();
        assert_eq!(doc.kind(), DocumentKind::WorkOrder);
        assert_eq!(doc.uuid(), *order_id.as_uuid());

        let budget_id = BudgetId::new();
        let doc: DocumentRef = budget_id.into();
        assert_eq!(doc.kind(), DocumentKind::Budget);
    }

    #[test]
    fn test_display_uses_prefixed_id() {
        let doc: DocumentRef = WorkOrderId::new().into();
        assert!(doc.to_string().starts_with("ord-"));
    }
}
