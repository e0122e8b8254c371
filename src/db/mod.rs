//! Database layer for data persistence and access.
//!
//! SQLx with PostgreSQL, following the repository pattern: [`handlers`] holds
//! one repository struct per table wrapping a `PgConnection`, [`models`] holds
//! the row structs those repositories return, [`errors`] categorizes database
//! failures, and [`stores`] adapts the repositories to the store traits the
//! analysis service depends on.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod stores;
