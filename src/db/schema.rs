//! SQL issued by the Postgres check.
//! Table DDL lives in `migrations/`; only DML and database-level commands are here.

/// SQLSTATE `duplicate_database`.
pub const DUPLICATE_DATABASE: &str = "42P04";
/// SQLSTATE `invalid_catalog_name`, raised by DROP DATABASE on a missing name.
pub const INVALID_CATALOG_NAME: &str = "3D000";

pub const INSERT_PERSON: &str = "INSERT INTO persons (id, name) VALUES ($1, $2)";
pub const SELECT_PERSONS: &str = "SELECT * FROM persons";

/// Quote an identifier so it can be spliced into DDL, which does not accept bind parameters.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_database(name: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(name))
}

pub fn drop_database(name: &str) -> String {
    format!("DROP DATABASE {}", quote_ident(name))
}
