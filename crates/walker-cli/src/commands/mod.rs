pub mod add;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod delete;
pub mod list;
pub mod pending;
pub mod prune;
pub mod sync;
pub mod watch;
