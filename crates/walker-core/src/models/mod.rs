//! Data models for Walker

mod cart;
mod purchase;
mod record;
mod sneaker;

pub use cart::{Cart, CartLine};
pub use purchase::{Purchase, PurchaseItem};
pub use record::{Collection, DomainKey, LocalId, Payload, Record, RemoteId};
pub use sneaker::Sneaker;
