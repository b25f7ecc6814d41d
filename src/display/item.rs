//! Inventory display formatting
//!
//! Formats inventory items for terminal output in table and detail views.

use crate::models::{CurrencyFormat, InventoryItem};

/// Format a list of items as a table
pub fn format_item_list(items: &[InventoryItem], currency: &CurrencyFormat) -> String {
    if items.is_empty() {
        return "No items found.\n".to_string();
    }

    let name_width = items
        .iter()
        .map(|i| i.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<9}  {:>6}  {:>4}  {:>12}  {}\n",
        "Name",
        "Category",
        "Stock",
        "Min",
        "Price",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<9}  {:->6}  {:->4}  {:->12}  {:-<6}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for item in items {
        let status = if item.is_low() { "LOW" } else { "" };
        output.push_str(&format!(
            "{:<name_width$}  {:<9}  {:>6}  {:>4}  {:>12}  {}\n",
            item.name,
            item.category.to_string(),
            item.stock,
            item.stock_minimum,
            currency.format(item.unit_price),
            status,
            name_width = name_width,
        ));
    }

    output
}

/// Format a single item's details
pub fn format_item_details(item: &InventoryItem, currency: &CurrencyFormat) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", item.name));
    output.push_str(&format!("  ID:        {}\n", item.id));
    output.push_str(&format!("  Category:  {}\n", item.category));
    if let Some(brand) = &item.brand {
        output.push_str(&format!("  Brand:     {}\n", brand));
    }
    if let Some(model) = &item.model {
        output.push_str(&format!("  Model:     {}\n", model));
    }
    output.push_str(&format!(
        "  Stock:     {} (minimum {}){}\n",
        item.stock,
        item.stock_minimum,
        if item.is_low() { "  ** LOW **" } else { "" }
    ));
    output.push_str(&format!(
        "  Price:     {}\n",
        currency.format(item.unit_price)
    ));
    output.push_str(&format!(
        "  Created:   {}\n",
        item.created_at.format("%Y-%m-%d")
    ));
    output
}
