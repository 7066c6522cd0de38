//! Clone, upgrade, or (with permission) downgrade the vendored tree.
//!
//! The decision is made by [`plan_sync`], a pure function over what is on
//! disk; [`VendorRepoManager::sync`] then carries the plan out with git.

use crate::error::VendorError;
use crate::git::Git;
use crate::tag::VersionTag;
use crate::tree::VendoredTree;
use crate::Result;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Upstream CPython repository.
pub const DEFAULT_URL: &str = "https://github.com/python/cpython.git";

/// Default checkout directory.
pub const DEFAULT_DIR: &str = "cpython";

/// What is on disk before a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Target directory is missing or empty.
    Absent,
    /// Target directory is a checkout; `None` when no release tag points at `HEAD`.
    Present(Option<VersionTag>),
}

/// The action a sync will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncPlan {
    /// Fresh shallow clone.
    Clone,
    /// Already at the requested tag; only re-apply sparse paths.
    RefreshSparse,
    /// Current tag is newer and downgrades were not allowed.
    RefuseDowngrade { current: VersionTag },
    /// Fetch and check out the requested tag.
    Switch { from: Option<VersionTag> },
}

impl fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPlan::Clone => write!(f, "clone"),
            SyncPlan::RefreshSparse => write!(f, "refresh sparse checkout"),
            SyncPlan::RefuseDowngrade { current } => {
                write!(f, "refuse downgrade from {current}")
            }
            SyncPlan::Switch { from: Some(from) } => write!(f, "switch from {from}"),
            SyncPlan::Switch { from: None } => write!(f, "switch from unknown revision"),
        }
    }
}

/// Result of a completed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Cloned,
    AlreadyCurrent,
    /// Nothing was changed. Not an error: rerun with a downgrade override.
    DowngradeRefused { current: VersionTag },
    Switched { from: Option<VersionTag> },
}

/// Decide what a sync to `requested` should do.
pub fn plan_sync(state: TreeState, requested: VersionTag, allow_downgrade: bool) -> SyncPlan {
    match state {
        TreeState::Absent => SyncPlan::Clone,
        TreeState::Present(Some(current)) if current == requested => SyncPlan::RefreshSparse,
        TreeState::Present(Some(current)) if current > requested && !allow_downgrade => {
            SyncPlan::RefuseDowngrade { current }
        }
        TreeState::Present(from) => SyncPlan::Switch { from },
    }
}

/// Request for a single sync.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub tag: String,
    pub url: String,
    pub dir: PathBuf,
    pub allow_downgrade: bool,
}

impl SyncRequest {
    /// Sync `tag` from the upstream URL into the default directory.
    pub fn new(tag: impl Into<String>) -> Self {
        SyncRequest {
            tag: tag.into(),
            url: DEFAULT_URL.to_string(),
            dir: PathBuf::from(DEFAULT_DIR),
            allow_downgrade: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn allow_downgrade(mut self, allow: bool) -> Self {
        self.allow_downgrade = allow;
        self
    }
}

/// Keeps a vendored tree at a requested tag.
///
/// Calls against the same directory must be serialized by the caller.
#[derive(Debug, Clone, Default)]
pub struct VendorRepoManager {
    git: Git,
}

impl VendorRepoManager {
    pub fn new(git: Git) -> Self {
        VendorRepoManager { git }
    }

    pub fn tree(&self, dir: impl Into<PathBuf>) -> VendoredTree {
        VendoredTree::new(dir, self.git.clone())
    }

    /// Compute the plan for `request` without touching the tree.
    pub fn plan(&self, request: &SyncRequest) -> Result<(VersionTag, SyncPlan)> {
        let requested = VersionTag::parse(&request.tag)?;
        let tree = self.tree(&request.dir);
        let state = if self.has_checkout(&tree)? {
            TreeState::Present(tree.current_tag()?)
        } else {
            TreeState::Absent
        };
        Ok((requested, plan_sync(state, requested, request.allow_downgrade)))
    }

    /// Bring the tree at `request.dir` to `request.tag`.
    pub fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome> {
        let requested = VersionTag::parse(&request.tag)?;
        let tree = self.tree(&request.dir);

        let state = if self.has_checkout(&tree)? {
            info!("Found existing repo at {}", tree.root().display());
            self.git.run(
                Some(tree.root()),
                ["remote", "set-url", "origin", request.url.as_str()],
            )?;
            TreeState::Present(tree.current_tag()?)
        } else {
            TreeState::Absent
        };

        match plan_sync(state, requested, request.allow_downgrade) {
            SyncPlan::Clone => {
                info!("Cloning {} into {}", requested, tree.root().display());
                self.clone_into(&tree, requested, &request.url)?;
                tree.ensure_sparse_paths()?;
                info!("Cloned {}", requested);
                Ok(SyncOutcome::Cloned)
            }
            SyncPlan::RefreshSparse => {
                info!("Already at {}, ensuring sparse checkout", requested);
                tree.ensure_sparse_paths()?;
                Ok(SyncOutcome::AlreadyCurrent)
            }
            SyncPlan::RefuseDowngrade { current } => {
                info!(
                    "Current {} is newer than requested {}, leaving tree unchanged",
                    current, requested
                );
                Ok(SyncOutcome::DowngradeRefused { current })
            }
            SyncPlan::Switch { from } => {
                info!("Switching to {}", requested);
                self.checkout_tag(&tree, requested)?;
                info!("Checked out {}", requested);
                Ok(SyncOutcome::Switched { from })
            }
        }
    }

    /// `false` when the directory is missing or empty, so it can be cloned
    /// into. Any other directory must be the root of its own checkout.
    fn has_checkout(&self, tree: &VendoredTree) -> Result<bool> {
        if !tree.exists() || tree.is_empty()? {
            return Ok(false);
        }
        if !tree.is_checkout()? {
            return Err(VendorError::NotACheckout(tree.root().to_path_buf()));
        }
        Ok(true)
    }

    fn clone_into(&self, tree: &VendoredTree, tag: VersionTag, url: &str) -> Result<()> {
        let tag = tag.to_string();
        self.git.run(
            None,
            [
                OsStr::new("clone"),
                OsStr::new("--depth"),
                OsStr::new("1"),
                OsStr::new("--filter=blob:none"),
                OsStr::new("--branch"),
                OsStr::new(&tag),
                OsStr::new(url),
                tree.root().as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn checkout_tag(&self, tree: &VendoredTree, tag: VersionTag) -> Result<()> {
        let tag = tag.to_string();
        let root = Some(tree.root());
        self.git
            .run(root, ["fetch", "--depth", "1", "origin", "tag", tag.as_str()])?;
        self.git.run(root, ["checkout", "-q", "FETCH_HEAD"])?;
        tree.ensure_sparse_paths()
    }
}
