//! Database record models matching table schemas.
//!
//! Each struct maps a table row via `sqlx::FromRow`. Database models stay
//! separate from API models so storage and API representations can evolve
//! independently.

pub mod benchmarks;
pub mod offers;
pub mod reports;
