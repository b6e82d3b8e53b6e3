//! Benchmark configuration.

pub mod config;

pub use config::{
    ImplementationSpec, default_implementations, load_implementations, resolve_implementations,
    select_implementations,
};
