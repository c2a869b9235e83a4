use walker_core::{Collection, Payload, Purchase, Sneaker};

use crate::commands::common::{
    format_pending_lines, now_ms, pending_to_item, PendingItem, Service, Summary,
};
use crate::error::CliError;

pub async fn run_pending(
    collection: Collection,
    as_json: bool,
    service: &Service,
) -> Result<(), CliError> {
    match collection {
        Collection::Sneakers => print_pending::<Sneaker>(as_json, service).await,
        Collection::Purchases => print_pending::<Purchase>(as_json, service).await,
    }
}

async fn print_pending<T: Payload + Summary>(
    as_json: bool,
    service: &Service,
) -> Result<(), CliError> {
    let records = service.pending::<T>().await;
    let now = now_ms();

    if as_json {
        let json_items = records
            .iter()
            .map(|record| pending_to_item(record, now))
            .collect::<Result<Vec<PendingItem>, CliError>>()?;
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No pending {}.", T::COLLECTION);
        return Ok(());
    }

    for line in format_pending_lines(&records, now) {
        println!("{line}");
    }
    Ok(())
}
