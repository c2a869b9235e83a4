//! Persisted shopping cart

use std::sync::Arc;

use super::{load_for_write, load_or_default};
use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::Cart;

const CART_KEY: &str = "cart";

/// Cart persisted in the same local store as the record collections.
pub struct CartStore<S> {
    store: Arc<S>,
}

impl<S> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> CartStore<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load the cart; a missing or malformed value is an empty cart.
    pub async fn load(&self) -> Cart {
        load_or_default(self.store.as_ref(), CART_KEY).await
    }

    pub async fn save(&self, cart: &Cart) -> Result<()> {
        let encoded = serde_json::to_string(cart)?;
        self.store.set(CART_KEY, &encoded).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(CART_KEY).await
    }

    /// Load, modify and save the cart in one call.
    ///
    /// Nothing is saved when the stored cart cannot be read.
    pub async fn modify<F, R>(&self, apply: F) -> Result<R>
    where
        F: FnOnce(&mut Cart) -> R + Send,
        R: Send,
    {
        let mut cart: Cart = load_for_write(self.store.as_ref(), CART_KEY).await?;
        let result = apply(&mut cart);
        self.save(&cart).await?;
        Ok(result)
    }
}
