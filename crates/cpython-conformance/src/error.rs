//! Error types for cpython-conformance

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before the regression engine takes over
#[derive(Error, Debug)]
pub enum ConformanceError {
    /// `Lib` is missing from the vendored tree
    #[error("missing {}. Point --vendor-dir at the CPython root", .0.display())]
    VendorTreeMissing(PathBuf),

    /// Worker count is neither `auto` nor a positive integer
    #[error("invalid worker count: {0:?}. Expected a positive integer or 'auto'")]
    InvalidWorkerCount(String),

    /// `test/regrtest.py` could not be found under `Lib`
    #[error("could not find test.regrtest in {}", .0.display())]
    EntryPointMissing(PathBuf),

    /// A path that must be embedded in the bootstrap script is not UTF-8
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The candidate runtime could not be started
    #[error("failed to launch {}", .program.display())]
    RuntimeLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
