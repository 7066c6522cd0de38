//! Error types for cpython-vendor

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while syncing the vendored tree
#[derive(Error, Debug)]
pub enum VendorError {
    /// Tag text is not of the form `vMAJOR.MINOR.PATCH`
    #[error("invalid tag: {0}. Expected like v3.12.6")]
    InvalidVersion(String),

    /// Git could not be started at all
    #[error("failed to run {program}")]
    GitUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The target directory exists but is not the root of its own checkout
    #[error("{} exists but is not the root of a git checkout", .0.display())]
    NotACheckout(PathBuf),

    /// A git command exited with a non-zero status
    #[error("git {command} failed: {}", .stderr.trim())]
    SyncFailed { command: String, stderr: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
