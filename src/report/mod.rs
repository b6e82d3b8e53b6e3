//! Reporting over result records.
//!
//! - `summary`: per-implementation statistics (`Summary`)
//! - `render`: terminal report and JSON document

pub mod render;
pub mod summary;

pub use render::{SummaryDocument, render_all, render_text, write_json};
pub use summary::{ImplementationSummary, Summary, SummaryInput, summarize};
