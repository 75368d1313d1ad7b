//! LUXE CLI - storefront demo tools.
//!
//! # Usage
//!
//! ```bash
//! # Walk the full shopping flow over a seeded in-memory store
//! luxe demo
//!
//! # Browse the seeded catalog
//! luxe products
//! luxe products --category accessories
//! luxe products --featured --limit 4
//! ```
//!
//! # Commands
//!
//! - `demo` - Sign in, fill a cart, check out, and read back order history
//! - `products` - Browse the seeded catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "luxe")]
#[command(author, version, about = "LUXE storefront demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the full shopping flow: sign in, cart, checkout, order history
    Demo,
    /// Browse the seeded catalog
    Products {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show featured products
        #[arg(short, long)]
        featured: bool,

        /// Maximum number of products to show
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "luxe=info,luxe_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Demo => commands::demo::run().await?,
        Commands::Products {
            category,
            featured,
            limit,
        } => commands::products::list(category, featured, limit).await?,
    }
    Ok(())
}
