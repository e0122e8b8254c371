//! Repository implementations for database access.
//!
//! One repository struct per table, each wrapping a `PgConnection` so a caller
//! can run several repositories inside one transaction. Queries are built with
//! runtime binding so the crate compiles without a live database.

pub mod benchmarks;
pub mod offers;
pub mod reports;

pub use benchmarks::Benchmarks;
pub use offers::Offers;
pub use reports::Reports;
