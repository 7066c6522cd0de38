//! CPython-Vendor: pinned, sparse CPython checkouts
//!
//! Keeps a local directory holding just the parts of the CPython source tree
//! the conformance runner needs (`Lib`, `Lib/test`, `Tools`), checked out at a
//! specific release tag with a shallow, blob-filtered clone.
//!
//! Re-running a sync with the same tag is a no-op beyond re-applying the
//! sparse paths. Moving to an older tag requires an explicit override.

pub mod error;
pub mod git;
pub mod sync;
pub mod tag;
pub mod tree;

pub use error::VendorError;
pub use git::Git;
pub use sync::{
    plan_sync, SyncOutcome, SyncPlan, SyncRequest, TreeState, VendorRepoManager, DEFAULT_DIR,
    DEFAULT_URL,
};
pub use tag::VersionTag;
pub use tree::{VendoredTree, SPARSE_PATHS};

/// Result type for vendoring operations
pub type Result<T> = std::result::Result<T, VendorError>;
