//! Redis set/get check.

pub mod redis;

pub const CACHE_KEY: &str = "myname";
pub const CACHE_VALUE: &str = "Viraj Shelke";
