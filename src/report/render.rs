//! Text and JSON renderings of summaries.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::env::EnvironmentInfo;
use crate::{BenchError, BenchResult};

use super::summary::{ImplementationSummary, Summary};

/// JSON document written by `summarize -o`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub environment: EnvironmentInfo,
    pub summaries: Vec<Summary>,
}

impl SummaryDocument {
    pub fn new(summaries: Vec<Summary>, environment: EnvironmentInfo) -> Self {
        SummaryDocument {
            generated_at: now_rfc3339(),
            environment,
            summaries,
        }
    }
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

enum Measure {
    Percent(fn(&ImplementationSummary) -> f64),
    Value(fn(&ImplementationSummary) -> Option<f64>),
}

const MEASURES: &[(&str, Measure)] = &[
    ("Fastest", Measure::Percent(|s| s.fastest)),
    ("Total time (ms)", Measure::Value(|s| Some(s.total_time_ms))),
    ("Smallest formula", Measure::Percent(|s| s.smallest_formula)),
    ("Strictly smallest formula", Measure::Percent(|s| s.strictly_smallest)),
    ("Mean blow-up", Measure::Value(|s| s.mean_blowup)),
    ("Median blow-up", Measure::Value(|s| s.median_blowup)),
    ("Worst-case blow-up", Measure::Value(|s| s.worst_blowup)),
    ("Mean blow-up (DAG)", Measure::Value(|s| s.mean_blowup_dag)),
    ("Median blow-up (DAG)", Measure::Value(|s| s.median_blowup_dag)),
    ("Worst-case blow-up (DAG)", Measure::Value(|s| s.worst_blowup_dag)),
    ("Not GF-normalized", Measure::Percent(|s| s.not_gfnorm)),
    ("Normalization errors", Measure::Value(|s| Some(s.errors as f64))),
];

/// Human-readable report; `color` highlights labels with ANSI escapes.
pub fn render_text(summary: &Summary, color: bool) -> String {
    let emph = |s: &str| {
        if color {
            format!("\x1b[33m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", emph("File:"), summary.file);
    if !summary.filters.is_empty() {
        let _ = writeln!(out, "{} {}", emph("Filters:"), summary.filters.join(", "));
    }
    let _ = writeln!(
        out,
        "{} {}",
        emph("Implementations:"),
        summary.implementations.join(" + ")
    );
    let _ = writeln!(out, "{} {}", emph("Formulae:"), summary.formulae);
    let _ = writeln!(out, "{} {:.2} %", emph("Already in Δ₂:"), summary.already_normalized);
    let _ = writeln!(out, "{} {:.2} %", emph("Already GF-normalized:"), summary.already_gfnorm);

    for (name, measure) in MEASURES {
        let _ = writeln!(out, "\n{name}:");
        for s in &summary.per_implementation {
            let value = match measure {
                Measure::Percent(get) => format!("{:.2} %", get(s)),
                Measure::Value(get) => get(s)
                    .map(|v| format!("{v:.3}"))
                    .unwrap_or_else(|| "-".to_string()),
            };
            let _ = writeln!(out, "\t{}\t{value}", emph(&s.name));
        }
    }
    out
}

/// Render several summaries separated by rules.
pub fn render_all(summaries: &[Summary], color: bool) -> String {
    summaries
        .iter()
        .map(|s| render_text(s, color))
        .collect::<Vec<_>>()
        .join(&format!("{}\n", "-".repeat(80)))
}

/// Write the JSON document to `path`.
pub fn write_json(path: &Path, document: &SummaryDocument) -> BenchResult<()> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| BenchError::Message(format!("failed to serialize summary: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| BenchError::Message(format!("failed to write {}: {e}", path.display())))
}
