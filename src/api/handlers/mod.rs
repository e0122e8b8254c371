//! API request handlers.

pub mod analysis;
pub mod reports;
