use std::io;

use thiserror::Error;
use walker_core::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] walker_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Record ID cannot be empty")]
    EmptyId,
    #[error("No {0} found for id/prefix: {1}")]
    RecordNotFound(&'static str, String),
    #[error("{0}")]
    AmbiguousId(String),
    #[error("No sneaker matches '{0}'")]
    ProductNotFound(String),
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("No cart line with key '{0}'")]
    CartLineNotFound(String),
    #[error("Sync interval must be a positive number of seconds")]
    InvalidInterval,
}
