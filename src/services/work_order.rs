//! Work order service
//!
//! Lifecycle management for work orders: creation, header edits, status
//! transitions, and deletion. Line-item edits are delegated to the
//! reconciler so stock always moves through the single ledger path.

use crate::audit::EntityType;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{LineItem, LineItemSet, Money, WorkOrder, WorkOrderId, WorkOrderStatus};
use crate::storage::Storage;

use super::aggregator::{Aggregator, Totals};
use super::reconciler::{DocumentReconciler, LineItemInput};

/// Service for work order management
pub struct WorkOrderService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new work order
#[derive(Debug, Clone, Default)]
pub struct CreateOrderInput {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub problem: Option<String>,
}

impl<'a> WorkOrderService<'a> {
    /// Create a new work order service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new pending work order
    pub fn create(&self, input: CreateOrderInput) -> WorkshopResult<WorkOrder> {
        let mut order = WorkOrder::new(input.customer_name.trim());
        if let Some(phone) = input.customer_phone {
            order.customer_phone = phone.trim().to_string();
        }
        if let Some(brand) = input.vehicle_brand {
            order.vehicle_brand = brand.trim().to_string();
        }
        if let Some(model) = input.vehicle_model {
            order.vehicle_model = model.trim().to_string();
        }
        if let Some(problem) = input.problem {
            order.problem = problem;
        }

        order
            .validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        self.storage.work_orders.upsert(order.clone())?;
        self.storage.work_orders.save()?;

        self.storage.log_create(
            EntityType::WorkOrder,
            order.id.to_string(),
            Some(order.customer_name.clone()),
            &order,
        )?;

        Ok(order)
    }

    /// Get a work order by ID
    pub fn get(&self, id: WorkOrderId) -> WorkshopResult<Option<WorkOrder>> {
        self.storage.work_orders.get(id)
    }

    /// Find a work order by ID string
    pub fn find(&self, identifier: &str) -> WorkshopResult<Option<WorkOrder>> {
        match identifier.parse::<WorkOrderId>() {
            Ok(id) => self.storage.work_orders.get(id),
            Err(_) => Ok(None),
        }
    }

    /// List work orders, optionally restricted to one status
    pub fn list(&self, status: Option<WorkOrderStatus>) -> WorkshopResult<Vec<WorkOrder>> {
        match status {
            Some(status) => self.storage.work_orders.get_by_status(status),
            None => self.storage.work_orders.get_all(),
        }
    }

    /// The stored line items of a work order, in display order
    pub fn lines(&self, id: WorkOrderId) -> WorkshopResult<Vec<LineItem>> {
        self.storage.order_lines.get_for(*id.as_uuid())
    }

    /// Replace the order's line items, moving stock for the difference
    pub fn set_items(
        &self,
        id: WorkOrderId,
        items: &[LineItemInput],
    ) -> WorkshopResult<Totals> {
        let order = self
            .storage
            .work_orders
            .get(id)?
            .ok_or_else(|| WorkshopError::order_not_found(id.to_string()))?;

        DocumentReconciler::new(self.storage).commit(id.into(), order.version, items)
    }

    /// Update the order's header fields
    ///
    /// Changing labor or service prices re-aggregates and persists the
    /// total; the stored grand total is never left stale.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        id: WorkOrderId,
        customer_name: Option<String>,
        customer_phone: Option<String>,
        vehicle_brand: Option<String>,
        vehicle_model: Option<String>,
        problem: Option<String>,
        diagnosis: Option<String>,
        labor_price: Option<Money>,
        service_price: Option<Money>,
    ) -> WorkshopResult<WorkOrder> {
        let order = self
            .storage
            .work_orders
            .get(id)?
            .ok_or_else(|| WorkshopError::order_not_found(id.to_string()))?;

        let before = order.clone();
        let mut updated = order;

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
        if let Some(new_problem) = problem {
            updated.problem = new_problem;
        }
        if let Some(new_diagnosis) = diagnosis {
            updated.diagnosis = new_diagnosis;
        }
        if let Some(labor) = labor_price {
            updated.labor_price = labor;
        }
        if let Some(service) = service_price {
            updated.service_price = service;
        }

        updated
            .validate()
            .map_err(|e| WorkshopError::Validation(e.to_string()))?;

        // Monetary fields feed the total; recompute rather than trust it
        let lines = LineItemSet::from_items(self.lines(id)?);
        let totals = Aggregator::new(self.storage).compute_for_order(&updated, &lines)?;
        updated.total = totals.grand;

        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        self.storage.work_orders.upsert(updated.clone())?;
        self.storage.work_orders.save()?;

        let mut changes = Vec::new();
        if before.customer_name != updated.customer_name {
            changes.push(format!(
                "customer: '{}' -> '{}'",
                before.customer_name, updated.customer_name
            ));
        }
        if before.labor_price != updated.labor_price {
            changes.push(format!(
                "labor: {} -> {}",
                before.labor_price, updated.labor_price
            ));
        }
        if before.service_price != updated.service_price {
            changes.push(format!(
                "services: {} -> {}",
                before.service_price, updated.service_price
            ));
        }
        if before.total != updated.total {
            changes.push(format!("total: {} -> {}", before.total, updated.total));
        }

        let diff = if changes.is_empty() {
            None
        } else {
            Some(changes.join(", "))
        };

        self.storage.log_update(
            EntityType::WorkOrder,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            diff,
        )?;

        Ok(updated)
    }

    /// Move the order to a new status
    pub fn set_status(
        &self,
        id: WorkOrderId,
        status: WorkOrderStatus,
    ) -> WorkshopResult<WorkOrder> {
        let order = self
            .storage
            .work_orders
            .get(id)?
            .ok_or_else(|| WorkshopError::order_not_found(id.to_string()))?;

        if order.status == status {
            return Ok(order);
        }

        let before = order.clone();
        let mut updated = order;
        updated.status = status;
        updated.version += 1;
        updated.updated_at = chrono::Utc::now();

        self.storage.work_orders.upsert(updated.clone())?;
        self.storage.work_orders.save()?;

        self.storage.log_update(
            EntityType::WorkOrder,
            updated.id.to_string(),
            Some(updated.customer_name.clone()),
            &before,
            &updated,
            Some(format!("status: {} -> {}", before.status, updated.status)),
        )?;

        Ok(updated)
    }

    /// Delete a work order and its line items
    ///
    /// The line items are reconciled to an empty set first, so every unit
    /// the order had consumed goes back on the shelf before the document
    /// disappears.
    pub fn delete(&self, id: WorkOrderId) -> WorkshopResult<WorkOrder> {
        let order = self
            .storage
            .work_orders
            .get(id)?
            .ok_or_else(|| WorkshopError::order_not_found(id.to_string()))?;

        DocumentReconciler::new(self.storage).commit(id.into(), order.version, &[])?;

        self.storage.work_orders.delete(id)?;
        self.storage.work_orders.save()?;
        self.storage.order_lines.delete_for(*id.as_uuid())?;
        self.storage.order_lines.save()?;

        self.storage.log_delete(
            EntityType::WorkOrder,
            order.id.to_string(),
            Some(order.customer_name.clone()),
            &order,
        )?;

        Ok(order)
    }

    /// Count work orders
    pub fn count(&self) -> WorkshopResult<usize> {
        self.storage.work_orders.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::WorkshopPaths;
    use crate::models::{InventoryItem, ItemCategory, ItemId};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed_item(storage: &Storage, name: &str, stock: i64, price_cents: i64) -> ItemId {
        let mut item = InventoryItem::new(name, ItemCategory::Part);
        item.stock = stock;
        item.unit_price = Money::from_cents(price_cents);
        let id = item.id;
        storage.items.upsert(item).unwrap();
        storage.items.save().unwrap();
        id
    }

    fn input(name: &str) -> CreateOrderInput {
        CreateOrderInput {
            customer_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_order() {
        let (_temp_dir, storage) = create_test_storage();
        let service = WorkOrderService::new(&storage);

        let order = service
            .create(CreateOrderInput {
                customer_name: "Alice Carter".to_string(),
                customer_phone: Some("555-0100".to_string()),
                vehicle_brand: Some("Toyota".to_string()),
                vehicle_model: Some("Corolla".to_string()),
                problem: Some("Rattling noise".to_string()),
            })
            .unwrap();

        assert_eq!(order.status, WorkOrderStatus::Pending);
        assert_eq!(order.vehicle_brand, "Toyota");
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_create_rejects_blank_customer() {
        let (_temp_dir, storage) = create_test_storage();
        let service = WorkOrderService::new(&storage);

        assert!(service.create(input("   ")).unwrap_err().is_validation());
    }

    #[test]
    fn test_update_prices_recomputes_total() {
        let (_temp_dir, storage) = create_test_storage();
        let item = seed_item(&storage, "Oil filter", 10, 1500);
        let service = WorkOrderService::new(&storage);

        let order = service.create(input("Bob")).unwrap();
        service
            .set_items(
                order.id,
                &[LineItemInput {
                    item_id: item,
                    quantity: 2,
                    unit_price_override: None,
                }],
            )
            .unwrap();

        let updated = service
            .update(
                order.id,
                None,
                None,
                None,
                None,
                None,
                Some("Worn belt".to_string()),
                Some(Money::from_cents(10_000)),
                Some(Money::from_cents(500)),
            )
            .unwrap();

        // 2 x 15.00 parts + 100.00 labor + 5.00 services
        assert_eq!(updated.total.cents(), 13_500);
        assert_eq!(updated.diagnosis, "Worn belt");
    }

    #[test]
    fn test_set_status() {
        let (_temp_dir, storage) = create_test_storage();
        let service = WorkOrderService::new(&storage);

        let order = service.create(input("Carol")).unwrap();
        let updated = service
            .set_status(order.id, WorkOrderStatus::InRepair)
            .unwrap();
        assert_eq!(updated.status, WorkOrderStatus::InRepair);
        assert_eq!(updated.version, order.version + 1);
    }

    #[test]
    fn test_delete_returns_consumed_stock() {
        let (_temp_dir, storage) = create_test_storage();
        let item = seed_item(&storage, "Brake pads", 8, 2000);
        let service = WorkOrderService::new(&storage);

        let order = service.create(input("Dave")).unwrap();
        service
            .set_items(
                order.id,
                &[LineItemInput {
                    item_id: item,
                    quantity: 3,
                    unit_price_override: None,
                }],
            )
            .unwrap();
        assert_eq!(storage.items.get(item).unwrap().unwrap().stock, 5);

        service.delete(order.id).unwrap();

        assert_eq!(storage.items.get(item).unwrap().unwrap().stock, 8);
        assert_eq!(service.count().unwrap(), 0);
        assert!(storage
            .order_lines
            .get_for(*order.id.as_uuid())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_unknown_returns_none() {
        let (_temp_dir, storage) = create_test_storage();
        let service = WorkOrderService::new(&storage);

        assert!(service.find("not-an-id").unwrap().is_none());
    }
}
