use stack_probe::Config;
use stack_probe::config::{PostgresConfig, ProbeSettings, RedisConfig};
use stack_probe::service::runner::{POSTGRES_CHECK, REDIS_CHECK};
use std::path::PathBuf;
use std::time::Duration;

/// Port 1 on loopback refuses connections, so both checks fail fast.
fn unreachable_config() -> Config {
    let timeout = Duration::from_secs(2);
    Config {
        postgres: PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "postgres".to_string(),
            password: Some("postgres".to_string()),
            name: "stack_probe_unreachable".to_string(),
            admin_database: "postgres".to_string(),
            migrations_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"),
            timeout,
        },
        redis: RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: None,
            password: None,
            timeout,
        },
        probe: ProbeSettings::default(),
    }
}

#[tokio::test]
async fn postgres_failure_does_not_skip_redis_check() {
    let report = stack_probe::run(&unreachable_config()).await;

    let names: Vec<_> = report.outcomes.iter().map(|o| o.name).collect();
    assert_eq!(names, [POSTGRES_CHECK, REDIS_CHECK]);

    let pg = report.outcome(POSTGRES_CHECK).expect("postgres outcome");
    let cache = report.outcome(REDIS_CHECK).expect("redis outcome");
    assert!(!pg.succeeded());
    assert!(!cache.succeeded());
    assert!(!report.all_succeeded());
    assert_eq!(report.failed().count(), 2);
}

#[tokio::test]
async fn unreachable_postgres_surfaces_from_first_step() {
    let cfg = unreachable_config();
    let err = stack_probe::db::postgres::create_database(&cfg.postgres)
        .await
        .expect_err("connect should fail");
    assert!(matches!(
        err,
        stack_probe::ProbeError::Database(_) | stack_probe::ProbeError::Timeout { .. }
    ));
}
