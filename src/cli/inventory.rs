//! Inventory CLI commands
//!
//! Implements CLI commands for catalog management, stock adjustment, and the
//! low-stock report.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_item_details, format_item_list};
use crate::error::{WorkshopError, WorkshopResult};
use crate::models::ItemCategory;
use crate::services::{CreateItemInput, InventoryService, StockLedger};
use crate::session::SessionProvider;
use crate::storage::Storage;

/// Inventory subcommands
#[derive(Subcommand)]
pub enum InventoryCommands {
    /// Add a new item to the catalog
    Add {
        /// Item name
        name: String,
        /// Item category (part, accessory)
        #[arg(short = 'c', long, default_value = "part")]
        category: String,
        /// Manufacturer brand
        #[arg(long)]
        brand: Option<String>,
        /// Manufacturer model/reference
        #[arg(long)]
        model: Option<String>,
        /// Initial stock
        #[arg(short, long, default_value_t = 0)]
        stock: i64,
        /// Low-stock threshold
        #[arg(short = 'm', long)]
        minimum: Option<i64>,
        /// Unit price (e.g. "15.00")
        #[arg(short, long)]
        price: Option<String>,
    },
    /// List catalog items
    List {
        /// Filter by category (part, accessory)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show item details
    Show {
        /// Item name or ID
        item: String,
    },
    /// Edit an item
    Edit {
        /// Item name or ID
        item: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New category (part, accessory)
        #[arg(long)]
        category: Option<String>,
        /// New low-stock threshold
        #[arg(short = 'm', long)]
        minimum: Option<i64>,
        /// New unit price
        #[arg(short, long)]
        price: Option<String>,
    },
    /// Delete an item (fails while any document still references it)
    Delete {
        /// Item name or ID
        item: String,
    },
    /// Adjust stock by a delta (receiving, shrinkage, corrections)
    Adjust {
        /// Item name or ID
        item: String,
        /// Signed stock delta (e.g. 10 or -3)
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// List items below their low-stock threshold
    Low {
        /// Check against this level instead of each item's own minimum
        #[arg(short, long)]
        threshold: Option<i64>,
    },
}

/// Handle an inventory command
pub fn handle_inventory_command(
    storage: &Storage,
    settings: &Settings,
    session: &SessionProvider,
    cmd: InventoryCommands,
) -> WorkshopResult<()> {
    let service = InventoryService::new(storage);
    let ledger = StockLedger::new(storage);

    match cmd {
        InventoryCommands::Add {
            name,
            category,
            brand,
            model,
            stock,
            minimum,
            price,
        } => {
            session.require_user()?;

            let category = ItemCategory::parse(&category).ok_or_else(|| {
                WorkshopError::Validation(format!(
                    "Invalid category: '{}'. Valid categories: part, accessory",
                    category
                ))
            })?;
            let unit_price = price.map(|p| settings.currency.parse(&p)).transpose()?;

            let item = service.create(CreateItemInput {
                name,
                category,
                brand,
                model,
                initial_stock: stock,
                stock_minimum: minimum,
                unit_price,
            })?;

            println!("Added item: {}", item.name);
            println!("  Category: {}", item.category);
            println!("  Stock:    {} (minimum {})", item.stock, item.stock_minimum);
            println!("  Price:    {}", settings.currency.format(item.unit_price));
            println!("  ID:       {}", item.id);
        }

        InventoryCommands::List { category } => {
            let category = match category {
                Some(c) => Some(ItemCategory::parse(&c).ok_or_else(|| {
                    WorkshopError::Validation(format!("Invalid category: '{}'", c))
                })?),
                None => None,
            };
            let items = service.list(category)?;
            print!("{}", format_item_list(&items, &settings.currency));
        }

        InventoryCommands::Show { item } => {
            let found = service
                .find(&item)?
                .ok_or_else(|| WorkshopError::item_not_found(&item))?;
            print!("{}", format_item_details(&found, &settings.currency));
        }

        InventoryCommands::Edit {
            item,
            name,
            category,
            minimum,
            price,
        } => {
            session.require_user()?;

            let found = service
                .find(&item)?
                .ok_or_else(|| WorkshopError::item_not_found(&item))?;
            let category = match category {
                Some(c) => Some(ItemCategory::parse(&c).ok_or_else(|| {
                    WorkshopError::Validation(format!("Invalid category: '{}'", c))
                })?),
                None => None,
            };
            let unit_price = price.map(|p| settings.currency.parse(&p)).transpose()?;

            let updated = service.update(found.id, name, category, None, None, minimum, unit_price)?;
            println!("Updated item: {}", updated.name);
        }

        InventoryCommands::Delete { item } => {
            session.require_user()?;

            let found = service
                .find(&item)?
                .ok_or_else(|| WorkshopError::item_not_found(&item))?;
            let deleted = service.delete(found.id)?;
            println!("Deleted item: {}", deleted.name);
        }

        InventoryCommands::Adjust { item, delta } => {
            session.require_user()?;

            let found = service
                .find(&item)?
                .ok_or_else(|| WorkshopError::item_not_found(&item))?;
            let new_level = ledger.apply_delta(found.id, delta)?;
            println!("{}: stock is now {}", found.name, new_level);
            if ledger.is_low(found.id)? {
                println!("  ** LOW: below minimum of {} **", found.stock_minimum);
            }
        }

        InventoryCommands::Low { threshold } => {
            let items = ledger.low_stock_items(threshold)?;
            if items.is_empty() {
                println!("No items below threshold.");
            } else {
                print!("{}", format_item_list(&items, &settings.currency));
            }
        }
    }

    Ok(())
}
