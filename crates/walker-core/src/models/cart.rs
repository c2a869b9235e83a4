//! Shopping cart model
//!
//! Lines are grouped by product and size, so adding the same sneaker in the
//! same size twice bumps the quantity instead of adding a second line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::purchase::{Purchase, PurchaseItem};
use crate::util::round_cents;

/// One grouped cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: String,
    pub qty: u32,
}

impl CartLine {
    /// Grouping key: `<product_id>::<size>`
    pub fn key(&self) -> String {
        format!("{}::{}", self.product_id, self.size)
    }
}

/// The buyer's cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a line, merging quantities with an existing line of the same key.
    pub fn add(&mut self, line: CartLine) {
        if line.qty == 0 {
            return;
        }
        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|existing| existing.key() == key) {
            existing.qty = existing.qty.saturating_add(line.qty);
        } else {
            self.lines.push(line);
        }
    }

    /// Adjust a line's quantity; the line is dropped once it reaches zero.
    ///
    /// Returns `false` when no line has the given key.
    pub fn change_qty(&mut self, key: &str, delta: i64) -> bool {
        let Some(position) = self.lines.iter().position(|line| line.key() == key) else {
            return false;
        };

        let current = i64::from(self.lines[position].qty);
        let updated = current.saturating_add(delta).max(0);
        if updated == 0 {
            self.lines.remove(position);
        } else {
            self.lines[position].qty = u32::try_from(updated).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove a line by key. Returns `false` when no line has the given key.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.key() != key);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart total rounded to cents
    pub fn total(&self) -> f64 {
        round_cents(
            self.lines
                .iter()
                .map(|line| line.price * f64::from(line.qty))
                .sum(),
        )
    }

    /// Build the purchase recorded when this cart is checked out.
    pub fn to_purchase(&self, user: &str, now: DateTime<Utc>) -> Purchase {
        Purchase {
            user: user.to_string(),
            items: self
                .lines
                .iter()
                .map(|line| PurchaseItem {
                    id: Some(line.product_id.clone()),
                    name: line.name.clone(),
                    price: line.price,
                    image: line.image.clone(),
                    size: line.size.clone(),
                    qty: line.qty,
                })
                .collect(),
            total: self.total(),
            datetime: now.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(product_id: &str, size: &str, qty: u32, price: f64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            name: format!("Sneaker {product_id}"),
            price,
            image: None,
            size: size.to_string(),
            qty,
        }
    }

    #[test]
    fn test_add_groups_by_product_and_size() {
        let mut cart = Cart::default();
        cart.add(line("1", "9", 1, 100.0));
        cart.add(line("1", "9", 2, 100.0));
        cart.add(line("1", "10", 1, 100.0));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].qty, 3);
        assert_eq!(cart.lines()[1].key(), "1::10");
    }

    #[test]
    fn test_add_ignores_zero_quantity() {
        let mut cart = Cart::default();
        cart.add(line("1", "", 0, 10.0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_qty_drops_line_at_zero() {
        let mut cart = Cart::default();
        cart.add(line("1", "9", 2, 100.0));

        assert!(cart.change_qty("1::9", 1));
        assert_eq!(cart.lines()[0].qty, 3);

        assert!(cart.change_qty("1::9", -5));
        assert!(cart.is_empty());

        assert!(!cart.change_qty("missing::", 1));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::default();
        cart.add(line("1", "9", 1, 100.0));
        cart.add(line("2", "9", 1, 100.0));

        assert!(cart.remove("1::9"));
        assert!(!cart.remove("1::9"));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let mut cart = Cart::default();
        cart.add(line("1", "", 3, 0.1));
        assert!((cart.total() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_purchase_copies_lines() {
        let mut cart = Cart::default();
        cart.add(line("1", "9", 2, 100.0));
        cart.add(line("2", "", 1, 49.99));

        let now = DateTime::from_timestamp(0, 0).unwrap();
        let purchase = cart.to_purchase("lerato", now);

        assert_eq!(purchase.user, "lerato");
        assert_eq!(purchase.items.len(), 2);
        assert_eq!(purchase.items[0].id.as_deref(), Some("1"));
        assert_eq!(purchase.items[0].qty, 2);
        assert!((purchase.total - 249.99).abs() < 1e-9);
        assert_eq!(purchase.datetime, "1970-01-01T00:00:00+00:00");
    }
}
