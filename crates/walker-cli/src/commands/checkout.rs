use walker_core::services::CreateOutcome;

use crate::commands::common::{format_price, Service};
use crate::error::CliError;

pub async fn run_checkout(user: &str, service: &Service) -> Result<(), CliError> {
    let carts = service.cart_store();
    match service.checkout(user, &carts).await? {
        CreateOutcome::Created(_) => println!("Purchase recorded"),
        CreateOutcome::SavedLocally { record, reason } => {
            println!(
                "Saved locally (offline): {reason}\nPurchase of {} will be sent on the next sync",
                format_price(record.payload().total)
            );
        }
    }
    Ok(())
}
