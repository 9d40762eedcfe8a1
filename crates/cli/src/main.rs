//! Shop Bridge CLI - Database migrations and session management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sb-cli migrate
//!
//! # Store a shop's offline Admin API token
//! sb-cli session upsert --shop acme.myshopify.com --token shpat_... --scopes read_orders
//!
//! # Show or remove a shop's session
//! sb-cli session show --shop acme.myshopify.com
//! sb-cli session delete --shop acme.myshopify.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(author, version, about = "Shop Bridge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage stored Shopify sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store a shop's offline session
    Upsert {
        /// Shop domain (`*.myshopify.com`)
        #[arg(short, long)]
        shop: String,

        /// Admin API access token
        #[arg(short, long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
        token: String,

        /// Granted scopes, comma separated
        #[arg(long)]
        scopes: Option<String>,
    },
    /// Show a shop's offline session
    Show {
        /// Shop domain (`*.myshopify.com`)
        #[arg(short, long)]
        shop: String,
    },
    /// Delete all sessions of a shop
    Delete {
        /// Shop domain (`*.myshopify.com`)
        #[arg(short, long)]
        shop: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Session { action } => match action {
            SessionAction::Upsert {
                shop,
                token,
                scopes,
            } => commands::session::upsert(&shop, &token, scopes.as_deref()).await?,
            SessionAction::Show { shop } => commands::session::show(&shop).await?,
            SessionAction::Delete { shop } => commands::session::delete(&shop).await?,
        },
    }
    Ok(())
}
