//! ResultRecord: one row of benchmark output per (formula, implementation).

use crate::classify::{dag_size, is_gf_normalized, is_normalized, tree_size};
use crate::formula::Formula;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "file",
    "formula",
    "already_normal",
    "already_gfnorm",
    "imp",
    "time",
    "init_size",
    "init_dagsize",
    "fin_size",
    "fin_dagsize",
    "final_normal",
    "final_gfnorm",
];

/// Outcome of sending one formula to one implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Formula stream the record comes from
    pub file: String,
    /// Input formula as read from the stream
    pub formula: String,
    pub already_normal: bool,
    pub already_gfnorm: bool,
    /// Implementation name
    pub imp: String,
    /// Round-trip time in nanoseconds
    pub time: u64,
    pub init_size: u64,
    pub init_dagsize: u64,
    /// Empty when the reply could not be parsed
    pub fin_size: Option<u64>,
    pub fin_dagsize: Option<u64>,
    pub final_normal: bool,
    pub final_gfnorm: bool,
}

/// Pre-transform half of a record, computed once per input formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputClassification {
    pub normal: bool,
    pub gf_normal: bool,
    pub size: u64,
    pub dag_size: u64,
}

impl InputClassification {
    pub fn of(f: &Formula) -> Self {
        InputClassification {
            normal: is_normalized(f),
            gf_normal: is_gf_normalized(f),
            size: tree_size(f),
            dag_size: dag_size(f),
        }
    }
}

impl ResultRecord {
    /// Builds a record from the classified input and the parsed reply, if any.
    pub fn new(
        file: &str,
        formula: &str,
        imp: &str,
        time: u64,
        input: InputClassification,
        reply: Option<&Formula>,
    ) -> Self {
        ResultRecord {
            file: file.to_string(),
            formula: formula.to_string(),
            already_normal: input.normal,
            already_gfnorm: input.gf_normal,
            imp: imp.to_string(),
            time,
            init_size: input.size,
            init_dagsize: input.dag_size,
            fin_size: reply.map(tree_size),
            fin_dagsize: reply.map(dag_size),
            final_normal: reply.is_some_and(is_normalized),
            final_gfnorm: reply.is_some_and(is_gf_normalized),
        }
    }
}
