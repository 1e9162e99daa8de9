use crate::cache::{CACHE_KEY, CACHE_VALUE};
use crate::config::{RedisConfig, redact};
use crate::error::ProbeError;
use crate::service::deadline::within;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::{debug, info};

/// Set the fixture key, read it back and return what the server handed out.
pub async fn check(cfg: &RedisConfig) -> Result<String, ProbeError> {
    info!(
        host = %cfg.host,
        port = cfg.port,
        username = cfg.username.as_deref().unwrap_or("<none>"),
        password = redact(cfg.password.as_deref()),
        "Redis connection details"
    );

    let mut conn = connect(cfg).await?;
    let result = round_trip(cfg, &mut conn).await;
    drop(conn);
    debug!("redis connection released");
    result
}

async fn round_trip(
    cfg: &RedisConfig,
    conn: &mut MultiplexedConnection,
) -> Result<String, ProbeError> {
    info!(key = CACHE_KEY, value = CACHE_VALUE, "setting key");
    within(cfg.timeout, "redis set", conn.set::<_, _, ()>(CACHE_KEY, CACHE_VALUE)).await?;

    debug!(key = CACHE_KEY, "key set; reading it back");
    let value: Option<String> = within(cfg.timeout, "redis get", conn.get(CACHE_KEY)).await?;
    let value = verify(value)?;
    info!(key = CACHE_KEY, value = %value, "value read back");
    Ok(value)
}

/// The value read back must be exactly the one written.
fn verify(value: Option<String>) -> Result<String, ProbeError> {
    match value {
        None => Err(ProbeError::MissingKey(CACHE_KEY.to_string())),
        Some(actual) if actual != CACHE_VALUE => Err(ProbeError::CacheMismatch {
            key: CACHE_KEY.to_string(),
            expected: CACHE_VALUE.to_string(),
            actual,
        }),
        Some(value) => Ok(value),
    }
}

pub(crate) fn connection_info(cfg: &RedisConfig) -> ConnectionInfo {
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(cfg.host.clone(), cfg.port),
        redis: RedisConnectionInfo {
            username: non_empty(&cfg.username),
            password: non_empty(&cfg.password),
            ..Default::default()
        },
    }
}

async fn connect(cfg: &RedisConfig) -> Result<MultiplexedConnection, ProbeError> {
    let client = redis::Client::open(connection_info(cfg))?;
    let conn = within(
        cfg.timeout,
        "redis connect",
        client.get_multiplexed_async_connection(),
    )
    .await?;
    debug!("redis connection opened");
    Ok(conn)
}
