//! Core types shared by the driver, the sinks and the reports.

pub mod env;
pub mod schema;

pub use env::EnvironmentInfo;
pub use schema::{CSV_HEADERS, InputClassification, ResultRecord};
