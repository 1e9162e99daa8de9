//! Postgres lifecycle check.
//!
//! Layout:
//! - `models.rs`: the `persons` row and its fixture value
//! - `schema.rs`: SQL text and SQLSTATE codes
//! - `postgres.rs`: create / migrate + exercise / drop steps

pub mod models;
pub mod postgres;
pub mod schema;

pub use models::Person;
pub use postgres::DatabaseStatus;
