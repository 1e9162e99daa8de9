pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod service;

pub use config::Config;
pub use error::ProbeError;
pub use service::{RunReport, run};
