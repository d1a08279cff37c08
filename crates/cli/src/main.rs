//! Emporium CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! emporium migrate
//!
//! # Create a customer (a random password is generated when omitted)
//! emporium customer create -e ana@example.com -u ana -p 555-0100
//!
//! # Delete a customer and their orders
//! emporium customer delete -e ana@example.com
//!
//! # Add a product
//! emporium product create -n "Tea kettle" --price 30.00 --stock 12
//!
//! # Load products from a JSON file
//! emporium seed products catalog.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emporium_core::Price;
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "emporium")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Manage the product catalog
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Seed the database from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Create a new customer
    Create {
        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        username: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Initial password (at least 8 characters); generated when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a customer and all of their orders
    Delete {
        /// Customer email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Add a product to the catalog
    Create {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Product description
        #[arg(short, long)]
        description: Option<String>,

        /// Unit price, e.g. 19.99
        #[arg(long)]
        price: Price,

        /// Units in stock
        #[arg(long, default_value_t = 0)]
        stock: u32,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create every product listed in a JSON file
    Products {
        /// Path to a JSON array of `{name, description, price, stock}`
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Customer { action } => match action {
            CustomerAction::Create {
                email,
                username,
                phone,
                password,
            } => {
                commands::customer::create(email, username, phone, password.map(SecretString::from))
                    .await?;
            }
            CustomerAction::Delete { email } => commands::customer::delete(email).await?,
        },
        Commands::Product { action } => match action {
            ProductAction::Create {
                name,
                description,
                price,
                stock,
            } => commands::product::create(name, description, price, stock).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
