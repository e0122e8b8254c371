//! API request/response models.
//!
//! Kept separate from database models so the wire format can evolve
//! independently of storage. Conversions from row structs live next to the
//! response types.

pub mod analysis;
pub mod reports;
