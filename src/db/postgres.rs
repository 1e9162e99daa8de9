use crate::config::{PostgresConfig, redact};
use crate::db::models::Person;
use crate::db::schema;
use crate::error::ProbeError;
use crate::service::deadline::within;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};
use tracing::{debug, info, warn};

/// What a create or drop step found on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    Created,
    AlreadyExists,
    Dropped,
    Missing,
}

/// Run the whole lifecycle: create, migrate and exercise, drop.
/// The first unexpected error aborts the remaining steps.
pub async fn check(cfg: &PostgresConfig) -> Result<Vec<Person>, ProbeError> {
    info!(
        host = %cfg.host,
        port = cfg.port,
        username = %cfg.username,
        password = redact(cfg.password.as_deref()),
        "PG connection details"
    );

    create_database(cfg).await?;
    let rows = exercise_database(cfg).await?;
    drop_database(cfg).await?;
    Ok(rows)
}

pub async fn create_database(cfg: &PostgresConfig) -> Result<DatabaseStatus, ProbeError> {
    info!(database = %cfg.name, "creating database");
    let mut conn = connect(cfg, &cfg.admin_database).await?;
    let sql = schema::create_database(&cfg.name);
    let result = within(cfg.timeout, "create database", conn.execute(sql.as_str())).await;
    release(cfg, conn, &cfg.admin_database).await;

    match result {
        Ok(_) => {
            info!(database = %cfg.name, "database created");
            Ok(DatabaseStatus::Created)
        }
        Err(e) if e.is_sqlstate(schema::DUPLICATE_DATABASE) => {
            info!(database = %cfg.name, "database already exists");
            Ok(DatabaseStatus::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

/// Apply pending migrations, insert the fixture row and read the table back.
pub async fn exercise_database(cfg: &PostgresConfig) -> Result<Vec<Person>, ProbeError> {
    let mut conn = connect(cfg, &cfg.name).await?;
    let result = migrate_and_round_trip(cfg, &mut conn).await;
    release(cfg, conn, &cfg.name).await;
    result
}

pub async fn drop_database(cfg: &PostgresConfig) -> Result<DatabaseStatus, ProbeError> {
    info!(database = %cfg.name, "dropping database");
    let mut conn = connect(cfg, &cfg.admin_database).await?;
    let sql = schema::drop_database(&cfg.name);
    let result = within(cfg.timeout, "drop database", conn.execute(sql.as_str())).await;
    release(cfg, conn, &cfg.admin_database).await;

    match result {
        Ok(_) => {
            info!(database = %cfg.name, "database dropped");
            Ok(DatabaseStatus::Dropped)
        }
        Err(e) if e.is_sqlstate(schema::INVALID_CATALOG_NAME) => {
            info!(database = %cfg.name, "database does not exist");
            Ok(DatabaseStatus::Missing)
        }
        Err(e) => Err(e),
    }
}

async fn migrate_and_round_trip(
    cfg: &PostgresConfig,
    conn: &mut PgConnection,
) -> Result<Vec<Person>, ProbeError> {
    info!(dir = %cfg.migrations_dir.display(), "running migrations");
    let migrator = Migrator::new(cfg.migrations_dir.as_path()).await?;
    within(cfg.timeout, "run migrations", migrator.run(&mut *conn)).await?;
    info!(
        available = migrator.iter().count(),
        "migrations done; inserting fixture row"
    );

    let person = Person::fixture();
    within(
        cfg.timeout,
        "insert fixture",
        sqlx::query(schema::INSERT_PERSON)
            .bind(person.id)
            .bind(&person.name)
            .execute(&mut *conn),
    )
    .await?;

    debug!("fixture row inserted; selecting all persons");
    let rows: Vec<Person> = within(
        cfg.timeout,
        "select persons",
        sqlx::query_as::<_, Person>(schema::SELECT_PERSONS).fetch_all(&mut *conn),
    )
    .await?;

    info!(rows = %serde_json::to_string(&rows)?, "query result");
    Ok(rows)
}

fn connect_options(cfg: &PostgresConfig, database: &str) -> PgConnectOptions {
    let opts = PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .database(database);
    match cfg.password.as_deref() {
        Some(password) if !password.is_empty() => opts.password(password),
        _ => opts,
    }
}

async fn connect(cfg: &PostgresConfig, database: &str) -> Result<PgConnection, ProbeError> {
    let opts = connect_options(cfg, database);
    let conn = within(cfg.timeout, "postgres connect", PgConnection::connect_with(&opts)).await?;
    debug!(database, "postgres connection opened");
    Ok(conn)
}

/// Close a connection without letting a close failure mask the step's own result.
async fn release(cfg: &PostgresConfig, conn: PgConnection, database: &str) {
    match within(cfg.timeout, "postgres close", conn.close()).await {
        Ok(()) => debug!(database, "postgres connection closed"),
        Err(e) => warn!(database, error = %e, "failed to close postgres connection"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn cfg(password: Option<&str>) -> PostgresConfig {
        PostgresConfig {
            host: "db.internal".to_string(),
            port: 6543,
            username: "app".to_string(),
            password: password.map(str::to_string),
            name: "smoke".to_string(),
            admin_database: "postgres".to_string(),
            migrations_dir: PathBuf::from("migrations"),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn connect_options_target_the_requested_database() {
        let c = cfg(Some("secret"));
        let admin = connect_options(&c, &c.admin_database);
        assert_eq!(admin.get_host(), "db.internal");
        assert_eq!(admin.get_port(), 6543);
        assert_eq!(admin.get_username(), "app");
        assert_eq!(admin.get_database(), Some("postgres"));

        let target = connect_options(&c, &c.name);
        assert_eq!(target.get_database(), Some("smoke"));
    }
}
