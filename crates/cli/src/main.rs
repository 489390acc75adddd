//! Tienda CLI - Order summaries and checkout from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Print the order summary for a cart file
//! tienda-cli summary cart.json
//!
//! # Submit a checkout against TIENDA_BACKEND_URL
//! tienda-cli checkout --cart cart.json --form form.json --token "$TOKEN"
//! ```
//!
//! # Commands
//!
//! - `summary` - Subtotal, shipping and total for a cart
//! - `checkout` - Place an order with file-backed cart and form

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tienda-cli")]
#[command(author, version, about = "Tienda CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the order summary for a cart file
    Summary {
        /// JSON file holding the cart's line items
        cart: PathBuf,
    },
    /// Submit a checkout to the backend
    Checkout {
        /// JSON file holding the cart's line items (emptied on success)
        #[arg(short, long)]
        cart: PathBuf,

        /// JSON file holding the shipping form
        #[arg(short, long)]
        form: PathBuf,

        /// Backend bearer token
        #[arg(short, long, env = "TIENDA_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tienda_cli=info,tienda_storefront=info,tienda_core=warn".into()),
        )
        .with_writer(std::io::stderr)
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
        Commands::Summary { cart } => commands::summary::run(&cart).await?,
        Commands::Checkout { cart, form, token } => {
            commands::checkout::run(&cart, &form, token).await?;
        }
    }
    Ok(())
}
