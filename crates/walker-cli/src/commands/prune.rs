use walker_core::{Collection, Purchase, Sneaker};

use crate::commands::common::Service;
use crate::error::CliError;

pub async fn run_prune(collection: Option<Collection>, service: &Service) -> Result<(), CliError> {
    let collections = collection.map_or_else(|| Collection::ALL.to_vec(), |one| vec![one]);

    for collection in collections {
        let removed = match collection {
            Collection::Sneakers => service.prune_synced::<Sneaker>().await?,
            Collection::Purchases => service.prune_synced::<Purchase>().await?,
        };
        println!("Pruned {removed} synced {collection}");
    }
    Ok(())
}
