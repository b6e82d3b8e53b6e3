//! Engine: runs normalizers over formula streams.
//!
//! - `driver`: the sequential implementation × formula loop.
//! - `equivalence`: optional semantic check of every reply.
//! - `interrupt`: Ctrl-C turns into a clean, reported stop.

pub mod driver;
pub mod equivalence;
pub mod interrupt;

pub use driver::{BenchmarkDriver, ImplementationReport, RunOutcome, RunStatus};
pub use equivalence::{EquivalenceOracle, LtlfiltOracle};
pub use interrupt::{install_handler, interrupt_flag};
