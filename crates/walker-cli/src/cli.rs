use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use walker_core::Collection;

#[derive(Parser)]
#[command(name = "walker")]
#[command(about = "Offline-first client for the Urban Walker Vault storefront")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local store file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a sneaker to the inventory (saved locally when offline)
    #[command(alias = "new")]
    Add {
        /// Sneaker name
        #[arg(long)]
        name: String,
        /// Unit price
        #[arg(long)]
        price: f64,
        /// Units in stock
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        qty: i64,
        /// Description
        #[arg(long)]
        desc: Option<String>,
        /// Image URL
        #[arg(long, value_name = "URL")]
        image: Option<String>,
    },
    /// List sneakers from the storefront plus locally pending ones
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List local records waiting for sync
    Pending {
        #[arg(long, value_enum, default_value_t = CollectionArg::Sneakers)]
        collection: CollectionArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a local record (and its remote entity once synced)
    Delete {
        /// Local ID or unique ID prefix
        id: String,
        #[arg(long, value_enum, default_value_t = CollectionArg::Sneakers)]
        collection: CollectionArg,
    },
    /// Drop synced records from the local store
    Prune {
        /// Only prune this collection
        #[arg(long, value_enum)]
        collection: Option<CollectionArg>,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Check out the cart as a purchase (saved locally when offline)
    Checkout {
        /// Buyer username or email
        #[arg(long)]
        user: String,
    },
    /// Push pending local records to the storefront
    Sync {
        /// Only sync this collection
        #[arg(long, value_enum)]
        collection: Option<CollectionArg>,
    },
    /// Sync periodically until interrupted
    Watch {
        /// Seconds between sync runs (defaults to WALKER_SYNC_INTERVAL_SECS)
        #[arg(long, value_name = "SECS")]
        interval_secs: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum CartCommands {
    /// Add a sneaker to the cart
    Add {
        /// Sneaker remote ID or name
        product: String,
        /// Shoe size
        #[arg(long, default_value = "")]
        size: String,
        /// Number of pairs
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Show cart contents
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the quantity of a cart line by a delta
    Qty {
        /// Line key (`<product>::<size>`)
        key: String,
        /// Quantity change, e.g. 1 or -1
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a cart line
    Remove {
        /// Line key (`<product>::<size>`)
        key: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CollectionArg {
    Sneakers,
    Purchases,
}

impl From<CollectionArg> for Collection {
    fn from(value: CollectionArg) -> Self {
        match value {
            CollectionArg::Sneakers => Self::Sneakers,
            CollectionArg::Purchases => Self::Purchases,
        }
    }
}
