//! QuickCart CLI - catalog checks and shop state inspection.
//!
//! # Usage
//!
//! ```bash
//! # Validate a catalog file before deploying it
//! qc-cli catalog check products.json
//!
//! # List the catalog the storefront would serve
//! qc-cli catalog list --catalog products.json
//!
//! # Inspect or empty the persisted cart
//! qc-cli cart show --data-dir data
//! qc-cli cart clear --data-dir data
//!
//! # Show the last order, or send it to the order backend again
//! qc-cli order show --json
//! qc-cli order resend
//! ```
//!
//! Shop options fall back to the same environment variables as the
//! storefront (`STOREFRONT_DATA_DIR`, `STOREFRONT_CATALOG_PATH`,
//! `STOREFRONT_CURRENCY`), and `.env` is loaded if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quickcart_storefront::config::StorefrontConfig;

mod commands;

use commands::{CliError, ShopArgs};

#[derive(Parser)]
#[command(name = "qc-cli")]
#[command(author, version, about = "QuickCart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect product catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect or reset the persisted cart
    Cart {
        #[command(flatten)]
        shop: ShopArgs,
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect or resend the last order
    Order {
        #[command(flatten)]
        shop: ShopArgs,
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog JSON file
    Check {
        /// Path to the catalog file
        path: PathBuf,
    },
    /// List catalog products
    List {
        #[command(flatten)]
        shop: ShopArgs,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and subtotal
    Show,
    /// Remove every line from the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Print the last order
    Show {
        /// Print the stored JSON record instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Send the last order to the configured order backend
    Resend,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Check { path } => commands::catalog::check(&path, &mut out)?,
            CatalogAction::List { shop } => commands::catalog::list(&shop, &mut out)?,
        },
        Commands::Cart { shop, action } => match action {
            CartAction::Show => commands::cart::show(&shop, &mut out)?,
            CartAction::Clear => commands::cart::clear(&shop, &mut out)?,
        },
        Commands::Order { shop, action } => match action {
            OrderAction::Show { json } => commands::order::show(&shop, json, &mut out)?,
            OrderAction::Resend => {
                let api = StorefrontConfig::from_env()?.order_api;
                commands::order::resend(&shop, api.as_ref(), &mut out).await?;
            }
        },
    }
    Ok(())
}
