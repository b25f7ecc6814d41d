//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the service layer.

pub mod budget;
pub mod inventory;
pub mod order;

pub use budget::{handle_budget_command, BudgetCommands};
pub use inventory::{handle_inventory_command, InventoryCommands};
pub use order::{handle_order_command, OrderCommands};

use crate::config::Settings;
use crate::display::LineItemRow;
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::LineItem;
use crate::services::{InventoryService, LineItemInput};
use crate::storage::Storage;

/// Parse `ITEM:QTY` / `ITEM:QTY:PRICE` specs into reconciler inputs
///
/// `ITEM` is an item name or ID; `PRICE` (optional) is a per-line price in
/// the configured currency format.
pub(crate) fn parse_line_specs(
    storage: &Storage,
    settings: &Settings,
    specs: &[String],
) -> WorkshopResult<Vec<LineItemInput>> {
    let inventory = InventoryService::new(storage);
    let mut inputs = Vec::with_capacity(specs.len());

    for spec in specs {
        let parts: Vec<&str> = spec.split(':').collect();
        let (item_part, qty_part, price_part) = match parts.as_slice() {
            [item, qty] => (*item, *qty, None),
            [item, qty, price] => (*item, *qty, Some(*price)),
            _ => {
                return Err(WorkshopError::Validation(format!(
                    "Invalid line spec '{}'. Use ITEM:QTY or ITEM:QTY:PRICE",
                    spec
                )))
            }
        };

        let item = inventory
            .find(item_part)?
            .ok_or_else(|| WorkshopError::item_not_found(item_part))?;

        let quantity: i64 = qty_part.parse().map_err(|_| {
            WorkshopError::Validation(format!("Invalid quantity '{}' in '{}'", qty_part, spec))
        })?;

        let unit_price_override = match price_part {
            Some(price) => Some(settings.currency.parse(price)?),
            None => None,
        };

        inputs.push(LineItemInput {
            item_id: item.id,
            quantity,
            unit_price_override,
        });
    }

    Ok(inputs)
}

/// Resolve stored line items into display rows with names and prices
pub(crate) fn build_line_rows(
    storage: &Storage,
    lines: &[LineItem],
) -> WorkshopResult<Vec<LineItemRow>> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let item = storage
            .items
            .get(line.item_id)?
            .ok_or_else(|| WorkshopError::item_not_found(line.item_id.to_string()))?;

        let unit_price = line.resolved_unit_price(item.unit_price);
        rows.push(LineItemRow {
            item_name: item.name,
            quantity: line.quantity,
            unit_price,
            line_total: unit_price * line.quantity,
        });
    }
    Ok(rows)
}
