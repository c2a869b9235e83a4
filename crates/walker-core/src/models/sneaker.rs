//! Sneaker (product) model

use serde::{Deserialize, Serialize};

use super::record::{Collection, DomainKey, Payload};
use crate::error::{Error, Result};

/// A sneaker listed in the storefront inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sneaker {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub desc: String,
    #[serde(default)]
    pub qty: i64,
}

impl Sneaker {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            image: None,
            price,
            desc: String::new(),
            qty: 0,
        }
    }

    #[must_use]
    pub fn with_qty(mut self, qty: i64) -> Self {
        self.qty = qty;
        self
    }

    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check the fields a create request needs before it leaves the client.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("Sneaker name cannot be empty".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Sneaker price must be a non-negative amount, got {}",
                self.price
            )));
        }
        if self.qty < 0 {
            return Err(Error::InvalidInput(format!(
                "Sneaker quantity cannot be negative, got {}",
                self.qty
            )));
        }
        Ok(())
    }

    pub const fn is_out_of_stock(&self) -> bool {
        self.qty == 0
    }
}

impl Payload for Sneaker {
    const COLLECTION: Collection = Collection::Sneakers;
}

impl DomainKey for Sneaker {
    fn domain_key(&self) -> String {
        self.name.clone()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
