//! Normalizer implementations under test.
//!
//! A [`Normalizer`] answers one formula per line; [`ImplementationProcess`]
//! wraps an external program, [`MockNormalizer`] answers from memory.

pub mod mock;
pub mod process;
pub mod traits;

pub use mock::{MockConfig, MockLauncher, MockNormalizer, MockReply};
pub use process::{ImplementationProcess, ProcessLauncher, SHUTDOWN_TIMEOUT, signal_name};
pub use traits::{Launcher, Normalizer, TerminationStatus};
