pub mod deadline;
pub mod runner;

pub use runner::{CheckOutcome, RunReport, run};
