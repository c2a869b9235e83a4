//! Services exposed to client front ends.

mod storefront;

pub use storefront::{CreateOutcome, StorefrontService};
