use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = stack_probe::Config::load();
    let loglevel = cfg
        .as_ref()
        .map(|c| c.probe.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        postgres = %format!("{}:{}/{}", cfg.postgres.host, cfg.postgres.port, cfg.postgres.name),
        redis = %format!("{}:{}", cfg.redis.host, cfg.redis.port),
        migrations = %cfg.postgres.migrations_dir.display(),
        timeout_secs = cfg.probe.timeout_secs,
        loglevel = %cfg.probe.loglevel
    );

    let report = stack_probe::run(&cfg).await;
    if report.all_succeeded() {
        info!("all checks passed");
        return ExitCode::SUCCESS;
    }

    for outcome in report.failed() {
        error!(
            check = outcome.name,
            error = outcome.error.as_deref().unwrap_or_default(),
            "check did not pass"
        );
    }
    ExitCode::FAILURE
}
