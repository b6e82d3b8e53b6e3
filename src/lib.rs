//! Benchmark harness for LTL normalizers.
//!
//! The crate classifies LTL formulas against the syntactic normal forms of
//! the Δ₂ level of the temporal hierarchy, drives external normalizer
//! processes over formula corpora, records per-formula results and summarizes
//! them across implementations.

pub mod bench;
pub mod classify;
pub mod core;
pub mod engine;
pub mod formula;
pub mod generate;
pub mod implementation;
pub mod report;
pub mod storage;

pub mod check_cmd;
pub mod filter_cmd;
pub mod generate_cmd;
pub mod summarize_cmd;

use thiserror::Error;

use implementation::TerminationStatus;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] formula::ParseError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("something went wrong during the execution of {implementation} ({status})")]
    ImplementationDied {
        implementation: String,
        status: TerminationStatus,
    },
    #[error("generator failed: {0}")]
    Generator(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;

pub use formula::Formula;
