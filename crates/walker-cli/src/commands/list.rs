use walker_core::Sneaker;

use crate::commands::common::{format_listing_lines, listing_to_item, Service, SneakerListItem};
use crate::error::CliError;

pub async fn run_list(as_json: bool, service: &Service) -> Result<(), CliError> {
    let rows = service.merged_list::<Sneaker>().await;

    if as_json {
        let json_items = rows
            .iter()
            .map(listing_to_item)
            .collect::<Vec<SneakerListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if rows.is_empty() {
        println!("No sneakers found.");
    } else {
        for line in format_listing_lines(&rows) {
            println!("{line}");
        }
    }

    Ok(())
}
