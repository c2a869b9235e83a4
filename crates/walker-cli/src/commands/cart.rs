use walker_core::models::CartLine;
use walker_core::Sneaker;

use crate::cli::CartCommands;
use crate::commands::common::{find_product, format_cart_lines, product_id, Service};
use crate::error::CliError;

pub async fn run_cart(command: CartCommands, service: &Service) -> Result<(), CliError> {
    match command {
        CartCommands::Add { product, size, qty } => add(&product, &size, qty, service).await,
        CartCommands::Show { json } => show(json, service).await,
        CartCommands::Qty { key, delta } => change_qty(&key, delta, service).await,
        CartCommands::Remove { key } => remove(&key, service).await,
        CartCommands::Clear => {
            service.cart_store().clear().await?;
            println!("Cart cleared");
            Ok(())
        }
    }
}

async fn add(product: &str, size: &str, qty: u32, service: &Service) -> Result<(), CliError> {
    let rows = service.merged_list::<Sneaker>().await;
    let row = find_product(&rows, product)?;
    if row.payload.is_out_of_stock() {
        return Err(CliError::OutOfStock(row.payload.name.clone()));
    }

    let line = CartLine {
        product_id: product_id(row),
        name: row.payload.name.clone(),
        price: row.payload.price,
        image: row.payload.image.clone(),
        size: size.trim().to_string(),
        qty,
    };
    let key = line.key();
    service
        .cart_store()
        .modify(move |cart| cart.add(line))
        .await?;

    println!("Added {key}");
    Ok(())
}

async fn show(as_json: bool, service: &Service) -> Result<(), CliError> {
    let cart = service.cart_store().load().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&cart)?);
    } else if cart.is_empty() {
        println!("Cart is empty.");
    } else {
        for line in format_cart_lines(&cart) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn change_qty(key: &str, delta: i64, service: &Service) -> Result<(), CliError> {
    let key = key.trim();
    let changed = service
        .cart_store()
        .modify(|cart| cart.change_qty(key, delta))
        .await?;
    if !changed {
        return Err(CliError::CartLineNotFound(key.to_string()));
    }
    println!("Updated {key}");
    Ok(())
}

async fn remove(key: &str, service: &Service) -> Result<(), CliError> {
    let key = key.trim();
    let removed = service
        .cart_store()
        .modify(|cart| cart.remove(key))
        .await?;
    if !removed {
        return Err(CliError::CartLineNotFound(key.to_string()));
    }
    println!("Removed {key}");
    Ok(())
}
