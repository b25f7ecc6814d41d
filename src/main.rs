use anyhow::Result;
use clap::{Parser, Subcommand};

use workshop::cli::{
    handle_budget_command, handle_inventory_command, handle_order_command, BudgetCommands,
    InventoryCommands, OrderCommands,
};
use workshop::config::{paths::WorkshopPaths, settings::Settings};
use workshop::session::SessionProvider;
use workshop::storage::Storage;

#[derive(Parser)]
#[command(
    name = "workshop",
    version,
    about = "Terminal-based repair-shop management",
    long_about = "Workshop tracks a repair shop's inventory, work orders, and \
                  budgets from the command line. Part lists on work orders move \
                  real stock; budgets are non-binding estimates."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inventory management commands
    #[command(subcommand, alias = "inv")]
    Inventory(InventoryCommands),

    /// Work order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Log in as an operator
    Login {
        /// Operator name
        name: String,
    },

    /// End the current operator session
    Logout,

    /// Show the current operator
    Whoami,

    /// Initialize the data store
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = WorkshopPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let session = SessionProvider::new(&paths);

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Inventory(cmd)) => {
            handle_inventory_command(&storage, &settings, &session, cmd)?;
        }
        Some(Commands::Order(cmd)) => {
            handle_order_command(&storage, &settings, &session, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &settings, &session, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("Audit log is empty.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Login { name }) => {
            let identity = session.login(&name)?;
            println!("Logged in as {}", identity.name);
        }
        Some(Commands::Logout) => {
            session.logout()?;
            println!("Logged out.");
        }
        Some(Commands::Whoami) => match session.current_user()? {
            Some(identity) => println!("{}", identity.name),
            None => println!("No operator logged in."),
        },
        Some(Commands::Init) => {
            println!("Initializing workshop at: {}", paths.data_dir().display());
            workshop::storage::init::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  workshop login <name>          start an operator session");
            println!("  workshop inventory add ...     stock the catalog");
            println!("  workshop order create ...      open the first work order");
        }
        Some(Commands::Config) => {
            println!("Workshop Configuration");
            println!("======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency.symbol);
            println!("  Date format:       {}", settings.date_format);
            println!(
                "  Operator:          {}",
                settings.operator.as_deref().unwrap_or("(none)")
            );
        }
        None => {
            println!("Workshop - terminal-based repair-shop management");
            println!();
            println!("Run 'workshop --help' for usage information.");
            println!("Run 'workshop init' to set up a new data store.");
        }
    }

    Ok(())
}
