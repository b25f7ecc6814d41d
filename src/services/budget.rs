//! Budget service
//!
//! Lifecycle management for budgets: creation, header edits, status
//! transitions (including the price freeze on approval), and deletion.
//! Budgets never move stock; their line items are pure estimates.

use crate::audit::EntityType;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{Budget, BudgetId, BudgetStatus, LineItem, LineItemSet, Money};
use crate::storage::Storage;

use super::aggregator::{Aggregator, Totals};
use super::reconciler::{DocumentReconciler, LineItemInput};

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new budget
#[derive(Debug, Clone, Default)]
pub struct CreateBudgetInput {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub description: Option<String>,
    pub labor_estimate: Option<Money>,
    pub services_estimate: Option<Money>,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new draft budget
    pub fn create(&self, input: CreateBudgetInput) -> WorkshopResult<Budget> {
        let mut budget = Budget::new(input.customer_name.trim());
        if let Some(phone) = input.customer_phone {
            budget.customer_phone = phone.trim().to_string();
        }
        if let Some(brand) = input.vehicle_brand {
            budget.vehicle_brand = brand.trim().to_string();
        }
        if let Some(model) = input.vehicle_model {
            budget.vehicle_model = model.trim().to_string();
        }
        if let Some(description) = input.description {
            budget.description = description;
        }
        if let Some(labor) = input.labor_estimate {
            budget.labor_estimate = labor;
        }
        if let Some(services) = input.services_estimate {
            budget.services_total_estimate = services;
        }
        budget.grand_total_estimate = budget.labor_estimate + budget.services_total_estimate;

        budget
            .validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.customer_name.clone()),
            &budget,
        )?;

        Ok(budget)
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> WorkshopResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    /// Find a budget by ID string
    pub fn find(&self, identifier: &str) -> WorkshopResult<Option<Budget>> {
        match identifier.parse::<BudgetId>() {
            Ok(id) => self.storage.budgets.get(id),
            Err(_) => Ok(None),
        }
    }

    /// List budgets, optionally restricted to one status
    pub fn list(&self, status: Option<BudgetStatus>) -> WorkshopResult<Vec<Budget>> {
        match status {
            Some(status) => self.storage.budgets.get_by_status(status),
            None => self.storage.budgets.get_all(),
        }
    }

    /// The stored line items of a budget, in display order
    pub fn lines(&self, id: BudgetId) -> WorkshopResult<Vec<LineItem>> {
        self.storage.budget_lines.get_for(*id.as_uuid())
    }

    /// Replace the budget's line items; never touches stock
    pub fn set_items(&self, id: BudgetId, items: &[LineItemInput]) -> WorkshopResult<Totals> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| WorkshopError::budget_not_found(id.to_string()))?;

        DocumentReconciler::new(self.storage).commit(id.into(), budget.version, items)
    }

    /// Update the budget's header fields
    ///
    /// Changing either estimate re-aggregates and persists the computed
    /// totals.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        id: BudgetId,
        customer_name: Option<String>,
        customer_phone: Option<String>,
        vehicle_brand: Option<String>,
        vehicle_model: Option<String>,
        description: Option<String>,
        labor_estimate: Option<Money>,
        services_estimate: Option<Money>,
    ) -> WorkshopResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| WorkshopError::budget_not_found(id.to_string()))?;

        let before = budget.clone();
        let mut updated = budget;

        if let Some(name) = customer_name {
            updated.customer_name = name.trim().to_string();
        }
        if let Some(phone) = customer_phone {
            updated.customer_phone = phone.trim().to_string();
        }
        if let Some(brand) = vehicle_brand {
            updated.vehicle_brand = brand.trim().to_string();
        }
        if let Some(model) = vehicle_model {
            updated.vehicle_model = model.trim().to_string();
        }
        if let Some(new_description) = description {
            updated.description = new_description;
        }
        if let Some(labor) = labor_estimate {
            updated.labor_estimate = labor;
        }
        if let Some(services) = services_estimate {
            updated.services_total_estimate = services;
        }

        updated
            .validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        let lines = LineItemSet::from_items(self.lines(id)?);
        let totals = Aggregator::new(self.storage).compute_for_budget(&updated, &lines)?;
        updated.parts_total_estimate = totals.parts;
        updated.grand_total_estimate = totals.grand;

        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        self.storage.budgets.upsert(updated.clone())?;
        self.storage.budgets.save()?;

        let mut changes = Vec::new();
        if before.labor_estimate != updated.labor_estimate {
            changes.push(format!(
                "labor: {} -> {}",
                before.labor_estimate, updated.labor_estimate
            ));
        }
        if before.services_total_estimate != updated.services_total_estimate {
            changes.push(format!(
                "services: {} -> {}",
                before.services_total_estimate, updated.services_total_estimate
            ));
        }
        if before.grand_total_estimate != updated.grand_total_estimate {
            changes.push(format!(
                "grand: {} -> {}",
                before.grand_total_estimate, updated.grand_total_estimate
            ));
        }

        let diff = if changes.is_empty() {
            None
        } else {
            Some(changes.join(", "))
        };

        self.storage.log_update(
            EntityType::Budget,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            diff,
        )?;

        Ok(updated)
    }

    /// Move the budget to a new status
    ///
    /// Approval freezes every line's price at the current catalog value so
    /// the accepted estimate stops tracking later price changes.
    pub fn set_status(&self, id: BudgetId, status: BudgetStatus) -> WorkshopResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| WorkshopError::budget_not_found(id.to_string()))?;

        if budget.status == status {
            return Ok(budget);
        }

        if status.freezes_prices() && !budget.status.freezes_prices() {
            self.freeze_line_prices(id)?;
        }

        let before = budget.clone();
        let mut updated = budget;
        updated.status = status;
        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        self.storage.budgets.upsert(updated.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_update(
            EntityType::Budget,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            Some(format!("status: {} -> {}", before.status, updated.status)),
        )?;

        Ok(updated)
    }

    /// Delete a budget and its line items; no stock is involved
    pub fn delete(&self, id: BudgetId) -> WorkshopResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| WorkshopError::budget_not_found(id.to_string()))?;

        self.storage.budget_lines.delete_for(*id.as_uuid())?;
        self.storage.budget_lines.save()?;
        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.customer_name.clone()),
            &budget,
        )?;

        Ok(budget)
    }

    /// Count budgets
    pub fn count(&self) -> WorkshopResult<usize> {
        self.storage.budgets.count()
    }

    /// Snapshot the current catalog price into every live-priced line
    fn freeze_line_prices(&self, id: BudgetId) -> WorkshopResult<()> {
        let mut lines = self.storage.budget_lines.get_for(*id.as_uuid())?;
        for line in &mut lines {
            if line.unit_price_override.is_some() {
                continue;
            }
            let item = self
                .storage
                .items
                .get(line.item_id)?
                .ok_or_else(|| WorkshopError::item_not_found(line.item_id.to_string()))?;
            line.unit_price_override = Some(item.unit_price);
        }

        self.storage.budget_lines.replace_for(*id.as_uuid(), lines)?;
        self.storage.budget_lines.save()
    }
}
