//! Walker CLI - Command-line client for the Urban Walker Vault storefront
//!
//! Inventory and checkout keep working offline: writes the storefront cannot
//! take are stored locally and pushed by `walker sync` or `walker watch`.

mod cli;
mod commands;
mod error;

use clap::Parser;
use walker_core::config::ClientConfig;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::cart::run_cart;
use crate::commands::checkout::run_checkout;
use crate::commands::common::{open_service, resolve_db_path};
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::pending::run_pending;
use crate::commands::prune::run_prune;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "walker=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let db_path = resolve_db_path(cli.db_path, &config);
    let service = open_service(&db_path, &config).await?;

    match cli.command {
        Commands::Add {
            name,
            price,
            qty,
            desc,
            image,
        } => run_add(&name, price, qty, desc, image, &service).await?,
        Commands::List { json } => run_list(json, &service).await?,
        Commands::Pending { collection, json } => {
            run_pending(collection.into(), json, &service).await?;
        }
        Commands::Delete { id, collection } => {
            run_delete(&id, collection.into(), &service).await?;
        }
        Commands::Prune { collection } => run_prune(collection.map(Into::into), &service).await?,
        Commands::Cart { command } => run_cart(command, &service).await?,
        Commands::Checkout { user } => run_checkout(&user, &service).await?,
        Commands::Sync { collection } => run_sync(collection.map(Into::into), &service).await?,
        Commands::Watch { interval_secs } => run_watch(interval_secs, &config, &service).await?,
    }

    Ok(())
}
