use walker_core::services::CreateOutcome;
use walker_core::Sneaker;

use crate::commands::common::Service;
use crate::error::CliError;

pub async fn run_add(
    name: &str,
    price: f64,
    qty: i64,
    desc: Option<String>,
    image: Option<String>,
    service: &Service,
) -> Result<(), CliError> {
    let mut sneaker = Sneaker::new(name.trim(), price).with_qty(qty);
    if let Some(desc) = desc {
        sneaker = sneaker.with_desc(desc);
    }
    if let Some(image) = image {
        sneaker = sneaker.with_image(image);
    }

    match service.create_sneaker(sneaker).await? {
        CreateOutcome::Created(created) => match created.id {
            Some(id) => println!("Created {id}"),
            None => println!("Created"),
        },
        CreateOutcome::SavedLocally { reason, .. } => {
            println!("Saved locally (offline): {reason}");
        }
    }
    Ok(())
}
