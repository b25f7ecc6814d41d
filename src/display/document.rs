//! Work order and budget display formatting
//!
//! Formats documents, their line items, and their totals for terminal
//! output.

use crate::models::{Budget, CurrencyFormat, Money, WorkOrder};
use crate::services::Totals;

/// A line item resolved for display
#[derive(Debug, Clone)]
pub struct LineItemRow {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Format a list of work orders as a table
pub fn format_order_list(orders: &[WorkOrder], currency: &CurrencyFormat) -> String {
    if orders.is_empty() {
        return "No work orders found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<20}  {:<20}  {:<10}  {:>12}\n",
        "ID", "Customer", "Vehicle", "Status", "Total"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<20}  {:-<20}  {:-<10}  {:->12}\n",
        "", "", "", "", ""
    ));

    for order in orders {
        let vehicle = format!("{} {}", order.vehicle_brand, order.vehicle_model);
        output.push_str(&format!(
            "{:<12}  {:<20}  {:<20}  {:<10}  {:>12}\n",
            order.id.to_string(),
            truncate(&order.customer_name, 20),
            truncate(vehicle.trim(), 20),
            order.status.to_string(),
            currency.format(order.total),
        ));
    }

    output
}

/// Format a list of budgets as a table
pub fn format_budget_list(budgets: &[Budget], currency: &CurrencyFormat) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<20}  {:<20}  {:<10}  {:>12}\n",
        "ID", "Customer", "Vehicle", "Status", "Estimate"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<20}  {:-<20}  {:-<10}  {:->12}\n",
        "", "", "", "", ""
    ));

    for budget in budgets {
        let vehicle = format!("{} {}", budget.vehicle_brand, budget.vehicle_model);
        output.push_str(&format!(
            "{:<12}  {:<20}  {:<20}  {:<10}  {:>12}\n",
            budget.id.to_string(),
            truncate(&budget.customer_name, 20),
            truncate(vehicle.trim(), 20),
            budget.status.to_string(),
            currency.format(budget.grand_total_estimate),
        ));
    }

    output
}

/// Format resolved line items with a totals block
pub fn format_lines_with_totals(
    rows: &[LineItemRow],
    totals: &Totals,
    currency: &CurrencyFormat,
) -> String {
    let mut output = String::new();

    if rows.is_empty() {
        output.push_str("No line items.\n");
    } else {
        let name_width = rows
            .iter()
            .map(|r| r.item_name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        output.push_str(&format!(
            "{:<name_width$}  {:>4}  {:>12}  {:>12}\n",
            "Item",
            "Qty",
            "Unit",
            "Total",
            name_width = name_width,
        ));
        for row in rows {
            output.push_str(&format!(
                "{:<name_width$}  {:>4}  {:>12}  {:>12}\n",
                row.item_name,
                row.quantity,
                currency.format(row.unit_price),
                currency.format(row.line_total),
                name_width = name_width,
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!("  Parts:     {:>12}\n", currency.format(totals.parts)));
    output.push_str(&format!("  Labor:     {:>12}\n", currency.format(totals.labor)));
    output.push_str(&format!("  Services:  {:>12}\n", currency.format(totals.services)));
    output.push_str(&format!("  Total:     {:>12}\n", currency.format(totals.grand)));
    output
}

/// Format a work order's header details
pub fn format_order_details(order: &WorkOrder, currency: &CurrencyFormat) -> String {
    let mut output = String::new();
    output.push_str(&format!("Work order {}\n", order.id));
    output.push_str(&format!(
        "  Customer:  {} {}\n",
        order.customer_name,
        if order.customer_phone.is_empty() {
            String::new()
        } else {
            format!("({})", order.customer_phone)
        }
    ));
    if !order.vehicle_brand.is_empty() || !order.vehicle_model.is_empty() {
        output.push_str(&format!(
            "  Vehicle:   {} {}\n",
            order.vehicle_brand, order.vehicle_model
        ));
    }
    if !order.problem.is_empty() {
        output.push_str(&format!("  Problem:   {}\n", order.problem));
    }
    if !order.diagnosis.is_empty() {
        output.push_str(&format!("  Diagnosis: {}\n", order.diagnosis));
    }
    output.push_str(&format!("  Status:    {}\n", order.status));
    output.push_str(&format!(
        "  Created:   {}\n",
        order.created_at.format("%Y-%m-%d")
    ));
    output.push_str(&format!("  Total:     {}\n", currency.format(order.total)));
    output
}

/// Format a budget's header details
pub fn format_budget_details(budget: &Budget, currency: &CurrencyFormat) -> String {
    let mut output = String::new();
    output.push_str(&format!("Budget {}\n", budget.id));
    output.push_str(&format!(
        "  Customer:  {} {}\n",
        budget.customer_name,
        if budget.customer_phone.is_empty() {
            String::new()
        } else {
            format!("({})", budget.customer_phone)
        }
    ));
    if !budget.vehicle_brand.is_empty() || !budget.vehicle_model.is_empty() {
        output.push_str(&format!(
            "  Vehicle:   {} {}\n",
            budget.vehicle_brand, budget.vehicle_model
        ));
    }
    if !budget.description.is_empty() {
        output.push_str(&format!("  Covers:    {}\n", budget.description));
    }
    output.push_str(&format!("  Status:    {}\n", budget.status));
    output.push_str(&format!(
        "  Created:   {}\n",
        budget.created_at.format("%Y-%m-%d")
    ));
    output.push_str(&format!(
        "  Estimate:  {}\n",
        currency.format(budget.grand_total_estimate)
    ));
    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
