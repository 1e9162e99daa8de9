use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const FIXTURE_ID: i32 = 1;
pub const FIXTURE_NAME: &str = "Viraj Shelke";

/// Row of the `persons` table created by the bundled migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Person {
    pub id: i32,
    pub name: String,
}

impl Person {
    /// The single record written and read back by the check.
    pub fn fixture() -> Self {
        Self {
            id: FIXTURE_ID,
            name: FIXTURE_NAME.to_string(),
        }
    }
}
