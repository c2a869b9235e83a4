//! walker-core - Core library for Walker
//!
//! This crate contains the record models, the offline-first local cache, the
//! remote store adapter and the reconciler that pushes locally created
//! records to the storefront backend.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod merge;
pub mod models;
pub mod remote;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Collection, LocalId, Payload, Purchase, Record, RemoteId, Sneaker};
pub use services::{CreateOutcome, StorefrontService};
pub use sync::{Reconciler, SyncReport, SyncScheduler};
