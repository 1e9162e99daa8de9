use crate::cache;
use crate::config::Config;
use crate::db;
use crate::error::ProbeError;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, info};

pub const POSTGRES_CHECK: &str = "Postgres Database";
pub const REDIS_CHECK: &str = "Redis";

/// Result of one independent check, with the error already rendered for reporting.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Run the Postgres check and then the Redis check.
/// A failure in one is logged and recorded; it never stops the other.
pub async fn run(config: &Config) -> RunReport {
    info!("Starting the application");
    let mut report = RunReport::default();

    report
        .outcomes
        .push(run_unit(POSTGRES_CHECK, db::postgres::check(&config.postgres)).await);
    report
        .outcomes
        .push(run_unit(REDIS_CHECK, cache::redis::check(&config.redis)).await);

    report
}

pub async fn run_unit<T, F>(name: &'static str, check: F) -> CheckOutcome
where
    F: Future<Output = Result<T, ProbeError>>,
{
    info!("Testing {name}");
    let started = Instant::now();
    let result = check.await;
    let elapsed = started.elapsed();

    let error = match result {
        Ok(_) => {
            info!(elapsed = ?elapsed, "Done testing {name}");
            None
        }
        Err(e) => {
            error!(check = name, error = %e, "check failed");
            Some(e.to_string())
        }
    };

    CheckOutcome {
        name,
        elapsed,
        error,
    }
}
