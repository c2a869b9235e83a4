//! Purchase model

use serde::{Deserialize, Serialize};

use super::record::{Collection, Payload};

/// One grouped line of a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: String,
    pub qty: u32,
}

impl PurchaseItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

/// A completed checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Username or email of the buyer
    pub user: String,
    pub items: Vec<PurchaseItem>,
    pub total: f64,
    /// Checkout time (RFC 3339)
    pub datetime: String,
}

impl Purchase {
    /// Number of units across all lines
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }
}

impl Payload for Purchase {
    const COLLECTION: Collection = Collection::Purchases;
}
