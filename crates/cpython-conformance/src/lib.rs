//! CPython-Conformance: run CPython's own test suite against oxython
//!
//! Takes a vendored CPython tree (see `cpython-vendor`), assembles a
//! `test.regrtest` argument vector from the run configuration and skip-list,
//! and launches regrtest under the candidate runtime. The engine's exit code
//! is returned as-is; per-test results, retries and timeouts belong to the
//! engine.

pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod runner;

pub use args::build_arguments;
pub use config::{resolve_worker_count, RunConfiguration, WorkerCount};
pub use engine::{locate_entry_point, resolve_library_path};
pub use error::ConformanceError;
pub use filter::{load_exclusions, parse_exclusions, FilterSet, DEFAULT_SKIP_FILE};
pub use runner::{ConformanceRunner, Invocation, DEFAULT_INTERPRETER};

/// Result type for conformance runs
pub type Result<T> = std::result::Result<T, ConformanceError>;
