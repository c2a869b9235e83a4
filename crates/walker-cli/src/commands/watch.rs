use std::time::Duration;

use walker_core::config::ClientConfig;
use walker_core::{Purchase, Sneaker};

use crate::commands::common::Service;
use crate::error::CliError;

pub fn resolve_interval(
    interval_secs: Option<u64>,
    config: &ClientConfig,
) -> Result<Duration, CliError> {
    match interval_secs {
        Some(0) => Err(CliError::InvalidInterval),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(config.sync_interval),
    }
}

pub async fn run_watch(
    interval_secs: Option<u64>,
    config: &ClientConfig,
    service: &Service,
) -> Result<(), CliError> {
    let period = resolve_interval(interval_secs, config)?;
    let scheduler = service.scheduler(period);

    scheduler.start();
    println!(
        "Syncing every {}s. Press Ctrl-C to stop.",
        period.as_secs()
    );

    let signal = tokio::signal::ctrl_c().await;
    scheduler.stop().await;
    signal?;

    let sneakers = service.pending::<Sneaker>().await.len();
    let purchases = service.pending::<Purchase>().await.len();
    println!("Stopped. Pending: {sneakers} sneakers, {purchases} purchases");
    Ok(())
}
