//! Budget CLI commands
//!
//! Implements CLI commands for budget management. Budgets are estimates:
//! none of these commands ever move stock.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_budget_details, format_budget_list, format_lines_with_totals};
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::{BudgetStatus, LineItemSet};
use crate::services::{Aggregator, BudgetService, CreateBudgetInput};
use crate::session::SessionProvider;
use crate::storage::Storage;

use super::{build_line_rows, parse_line_specs};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a new draft budget
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
        /// What the estimate covers
        #[arg(long)]
        description: Option<String>,
        /// Labor estimate (e.g. "300.00")
        #[arg(long)]
        labor: Option<String>,
        /// Services estimate
        #[arg(long)]
        services: Option<String>,
    },
    /// List budgets
    List {
        /// Filter by status (draft, sent, approved, rejected, expired)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show a budget with its line items and estimates
    Show {
        /// Budget ID
        budget: String,
    },
    /// Edit a budget's header fields
    Edit {
        /// Budget ID
        budget: String,
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
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New labor estimate
        #[arg(long)]
        labor: Option<String>,
        /// New services estimate
        #[arg(long)]
        services: Option<String>,
    },
    /// Replace the budget's parts list (stock is never touched)
    SetItems {
        /// Budget ID
        budget: String,
        /// Line specs: ITEM:QTY or ITEM:QTY:PRICE (repeatable)
        #[arg(short, long = "item")]
        items: Vec<String>,
    },
    /// Change the budget's status (approval freezes line prices)
    Status {
        /// Budget ID
        budget: String,
        /// New status (draft, sent, approved, rejected, expired)
        status: String,
    },
    /// Delete a budget
    Delete {
        /// Budget ID
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    session: &SessionProvider,
    cmd: BudgetCommands,
) -> WorkshopResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Create {
            customer,
            phone,
            brand,
            model,
            description,
            labor,
            services,
        } => {
            session.require_user()?;

            let labor_estimate = labor.map(|a| settings.currency.parse(&a)).transpose()?;
            let services_estimate = services.map(|a| settings.currency.parse(&a)).transpose()?;

            let budget = service.create(CreateBudgetInput {
                customer_name: customer,
                customer_phone: phone,
                vehicle_brand: brand,
                vehicle_model: model,
                description,
                labor_estimate,
                services_estimate,
            })?;

            println!("Created budget for {}", budget.customer_name);
            println!("  Status:   {}", budget.status);
            println!(
                "  Estimate: {}",
                settings.currency.format(budget.grand_total_estimate)
            );
            println!("  ID:       {}", budget.id);
        }

        BudgetCommands::List { status } => {
            let status = match status {
                Some(s) => Some(BudgetStatus::parse(&s).ok_or_else(|| {
                    WorkshopError::Validation(format!(
                        "Invalid status: '{}'. Valid statuses: draft, sent, approved, rejected, expired",
                        s
                    ))
                })?),
                None => None,
            };
            let budgets = service.list(status)?;
            print!("{}", format_budget_list(&budgets, &settings.currency));
        }

        BudgetCommands::Show { budget } => {
            let found = service
                .find(&budget)?
                .ok_or_else(|| WorkshopError::budget_not_found(&budget))?;
            let lines = service.lines(found.id)?;
            let totals = Aggregator::new(storage)
                .compute_for_budget(&found, &LineItemSet::from_items(lines.clone()))?;
            let rows = build_line_rows(storage, &lines)?;

            print!("{}", format_budget_details(&found, &settings.currency));
            println!();
            print!(
                "{}",
                format_lines_with_totals(&rows, &totals, &settings.currency)
            );
        }

        BudgetCommands::Edit {
            budget,
            customer,
            phone,
            brand,
            model,
            description,
            labor,
            services,
        } => {
            session.require_user()?;

            let found = service
                .find(&budget)?
                .ok_or_else(|| WorkshopError::budget_not_found(&budget))?;
            let labor = labor.map(|a| settings.currency.parse(&a)).transpose()?;
            let services = services.map(|a| settings.currency.parse(&a)).transpose()?;

            let updated = service.update(
                found.id,
                customer,
                phone,
                brand,
                model,
                description,
                labor,
                services,
            )?;
            println!("Updated budget {}", updated.id);
            println!(
                "  Estimate: {}",
                settings.currency.format(updated.grand_total_estimate)
            );
        }

        BudgetCommands::SetItems { budget, items } => {
            session.require_user()?;

            let found = service
                .find(&budget)?
                .ok_or_else(|| WorkshopError::budget_not_found(&budget))?;
            let inputs = parse_line_specs(storage, settings, &items)?;

            let totals = service.set_items(found.id, &inputs)?;
            println!("Updated parts on budget {}", found.id);
            println!("  Parts:    {}", settings.currency.format(totals.parts));
            println!("  Estimate: {}", settings.currency.format(totals.grand));
        }

        BudgetCommands::Status { budget, status } => {
            session.require_user()?;

            let found = service
                .find(&budget)?
                .ok_or_else(|| WorkshopError::budget_not_found(&budget))?;
            let status = BudgetStatus::parse(&status).ok_or_else(|| {
                WorkshopError::Validation(format!(
                    "Invalid status: '{}'. Valid statuses: draft, sent, approved, rejected, expired",
                    status
                ))
            })?;

            let updated = service.set_status(found.id, status)?;
            println!("Budget {} is now {}", updated.id, updated.status);
            if status.freezes_prices() {
                println!("  Line prices are frozen at current catalog values.");
            }
        }

        BudgetCommands::Delete { budget } => {
            session.require_user()?;

            let found = service
                .find(&budget)?
                .ok_or_else(|| WorkshopError::budget_not_found(&budget))?;
            service.delete(found.id)?;
            println!("Deleted budget {}", found.id);
        }
    }

    Ok(())
}
