use walker_core::{Collection, Payload, Purchase, Sneaker};

use crate::commands::common::{normalize_identifier, resolve_local_id, Service};
use crate::error::CliError;

pub async fn run_delete(id: &str, collection: Collection, service: &Service) -> Result<(), CliError> {
    let normalized_id = normalize_identifier(id)?;
    match collection {
        Collection::Sneakers => delete::<Sneaker>(&normalized_id, service).await,
        Collection::Purchases => delete::<Purchase>(&normalized_id, service).await,
    }
}

async fn delete<T: Payload>(query: &str, service: &Service) -> Result<(), CliError> {
    let local_id = resolve_local_id::<T, _>(query, service.cache()).await?;
    let record = service.delete_record::<T>(&local_id).await?;

    match record.remote_id() {
        Some(remote_id) if !remote_id.is_acknowledgement() => {
            println!("Deleted {local_id} (remote {remote_id})");
        }
        _ => println!("Deleted {local_id}"),
    }
    Ok(())
}
