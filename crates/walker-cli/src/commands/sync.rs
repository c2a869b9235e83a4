use walker_core::{Collection, Purchase, Sneaker};

use crate::commands::common::{format_sync_report, Service};
use crate::error::CliError;

pub async fn run_sync(collection: Option<Collection>, service: &Service) -> Result<(), CliError> {
    let reports = match collection {
        None => service.trigger_sync_all().await?,
        Some(Collection::Sneakers) => vec![service.trigger_sync::<Sneaker>().await?],
        Some(Collection::Purchases) => vec![service.trigger_sync::<Purchase>().await?],
    };

    for report in &reports {
        println!("{}", format_sync_report(report));
    }
    Ok(())
}
