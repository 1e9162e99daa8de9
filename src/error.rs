use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migrate(#[from] MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("{op} did not complete within {}s", .after.as_secs())]
    Timeout { op: &'static str, after: Duration },

    #[error("key '{0}' was not found in the cache")]
    MissingKey(String),

    #[error("key '{key}' read back '{actual}', expected '{expected}'")]
    CacheMismatch {
        key: String,
        expected: String,
        actual: String,
    },
}

impl ProbeError {
    /// SQLSTATE of the underlying Postgres error, if this is one.
    pub fn sqlstate(&self) -> Option<String> {
        match self {
            ProbeError::Database(SqlxError::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            _ => None,
        }
    }

    pub fn is_sqlstate(&self, code: &str) -> bool {
        self.sqlstate().as_deref() == Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError(&'static str);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error {}", self.0)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn db_error(code: &'static str) -> ProbeError {
        ProbeError::Database(SqlxError::Database(Box::new(FakeDbError(code))))
    }

    #[test]
    fn sqlstate_is_read_from_database_errors() {
        let err = db_error("42P04");
        assert_eq!(err.sqlstate().as_deref(), Some("42P04"));
        assert!(err.is_sqlstate("42P04"));
        assert!(!err.is_sqlstate("3D000"));
    }

    #[test]
    fn non_database_errors_have_no_sqlstate() {
        let err = ProbeError::Database(SqlxError::PoolTimedOut);
        assert_eq!(err.sqlstate(), None);

        let err = ProbeError::MissingKey("myname".to_string());
        assert!(!err.is_sqlstate("42P04"));
    }

    #[test]
    fn timeout_message_names_the_operation() {
        let err = ProbeError::Timeout {
            op: "postgres connect",
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "postgres connect did not complete within 5s");
    }
}
