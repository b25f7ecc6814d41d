//! Work order CLI commands
//!
//! Implements CLI commands for work order management, including the
//! stock-moving line item replacement.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_lines_with_totals, format_order_details, format_order_list};
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{LineItemSet, WorkOrderStatus};
use crate::services::{Aggregator, CreateOrderInput, WorkOrderService};
use crate::session::SessionProvider;
use crate::storage::Storage;

use super::{build_line_rows, parse_line_specs};

/// Work order subcommands
#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create a new work order
    Create {
        /// Customer name
        customer: String,
        /// Customer phone
        #[arg(long)]
        phone: Option<String>,
        /// Vehicle brand
        #[arg(long)]
        brand: Option<String>,
        /// Vehicle model
        #[arg(long)]
        model: Option<String>,
        /// Reported problem
        #[arg(long)]
        problem: Option<String>,
    },
    /// List work orders
    List {
        /// Filter by status (pending, in-repair, finished)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show a work order with its line items and totals
    Show {
        /// Work order ID
        order: String,
    },
    /// Edit a work order's header fields
    Edit {
        /// Work order ID
        order: String,
        /// New customer name
        #[arg(long)]
        customer: Option<String>,
        /// New customer phone
        #[arg(long)]
        phone: Option<String>,
        /// New vehicle brand
        #[arg(long)]
        brand: Option<String>,
        /// New vehicle model
        #[arg(long)]
        model: Option<String>,
        /// New problem text
        #[arg(long)]
        problem: Option<String>,
        /// New diagnosis text
        #[arg(long)]
        diagnosis: Option<String>,
        /// Negotiated labor price (e.g. "100.00")
        #[arg(long)]
        labor: Option<String>,
        /// Negotiated services price
        #[arg(long)]
        services: Option<String>,
    },
    /// Replace the order's parts list (moves stock for the difference)
    SetItems {
        /// Work order ID
        order: String,
        /// Line specs: ITEM:QTY or ITEM:QTY:PRICE (repeatable)
        #[arg(short, long = "item")]
        items: Vec<String>,
    },
    /// Change the order's status
    Status {
        /// Work order ID
        order: String,
        /// New status (pending, in-repair, finished)
        status: String,
    },
    /// Delete a work order, returning its parts to stock
    Delete {
        /// Work order ID
        order: String,
    },
}

/// Handle a work order command
pub fn handle_order_command(
    storage: &Storage,
    settings: &Settings,
    session: &SessionProvider,
    cmd: OrderCommands,
) -> WorkshopResult<()> {
    let service = WorkOrderService::new(storage);

    match cmd {
        OrderCommands::Create {
            customer,
            phone,
            brand,
            model,
            problem,
        } => {
            session.require_user()?;

            let order = service.create(CreateOrderInput {
                customer_name: customer,
                customer_phone: phone,
                vehicle_brand: brand,
                vehicle_model: model,
                problem,
            })?;

            println!("Created work order for {}", order.customer_name);
            println!("  Status: {}", order.status);
            println!("  ID:     {}", order.id);
        }

        OrderCommands::List { status } => {
            let status = match status {
                Some(s) => Some(WorkOrderStatus::parse(&s).ok_or_else(|| {
                    WorkshopError::Validation(format!(
                        "Invalid status: '{}'. Valid statuses: pending, in-repair, finished",
                        s
                    ))
                })?),
                None => None,
            };
            let orders = service.list(status)?;
            print!("{}", format_order_list(&orders, &settings.currency));
        }

        OrderCommands::Show { order } => {
            let found = service
                .find(&order)?
                .ok_or_else(|| WorkshopError::order_not_found(&order))?;
            let lines = service.lines(found.id)?;
            let totals = Aggregator::new(storage)
                .compute_for_order(&found, &LineItemSet::from_items(lines.clone()))?;
            let rows = build_line_rows(storage, &lines)?;

            print!("{}", format_order_details(&found, &settings.currency));
            println!();
            print!(
                "{}",
                format_lines_with_totals(&rows, &totals, &settings.currency)
            );
        }

        OrderCommands::Edit {
            order,
            customer,
            phone,
            brand,
            model,
            problem,
            diagnosis,
            labor,
            services,
        } => {
            session.require_user()?;

            let found = service
                .find(&order)?
                .ok_or_else(|| WorkshopError::order_not_found(&order))?;
            let labor = labor.map(|a| settings.currency.parse(&a)).transpose()?;
            let services = services.map(|a| settings.currency.parse(&a)).transpose()?;

            let updated = service.update(
                found.id, customer, phone, brand, model, problem, diagnosis, labor, services,
            )?;
            println!("Updated work order {}", updated.id);
            println!("  Total: {}", settings.currency.format(updated.total));
        }

        OrderCommands::SetItems { order, items } => {
            session.require_user()?;

            let found = service
                .find(&order)?
                .ok_or_else(|| WorkshopError::order_not_found(&order))?;
            let inputs = parse_line_specs(storage, settings, &items)?;

            let totals = service.set_items(found.id, &inputs)?;
            println!("Updated parts on work order {}", found.id);
            println!("  Parts: {}", settings.currency.format(totals.parts));
            println!("  Total: {}", settings.currency.format(totals.grand));
        }

        OrderCommands::Status { order, status } => {
            session.require_user()?;

            let found = service
                .find(&order)?
                .ok_or_else(|| WorkshopError::order_not_found(&order))?;
            let status = WorkOrderStatus::parse(&status).ok_or_else(|| {
                WorkshopError::Validation(format!(
                    "Invalid status: '{}'. Valid statuses: pending, in-repair, finished",
                    status
                ))
            })?;

            let updated = service.set_status(found.id, status)?;
            println!("Work order {} is now {}", updated.id, updated.status);
        }

        OrderCommands::Delete { order } => {
            session.require_user()?;

            let found = service
                .find(&order)?
                .ok_or_else(|| WorkshopError::order_not_found(&order))?;
            service.delete(found.id)?;
            println!("Deleted work order {} (parts returned to stock)", found.id);
        }
    }

    Ok(())
}
