//! The on-disk vendored CPython tree.

use crate::git::Git;
use crate::tag::VersionTag;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths kept by the sparse checkout.
pub const SPARSE_PATHS: [&str; 3] = ["Lib", "Lib/test", "Tools"];

/// A (possibly absent) partial checkout of CPython.
///
/// The checked-out tag is never cached; every call to
/// [`VendoredTree::current_tag`] asks git again.
#[derive(Debug, Clone)]
pub struct VendoredTree {
    root: PathBuf,
    git: Git,
}

impl VendoredTree {
    pub fn new(root: impl Into<PathBuf>, git: Git) -> Self {
        VendoredTree {
            root: root.into(),
            git,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the tree directory exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Whether the tree directory has no entries at all.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(std::fs::read_dir(&self.root)?.next().is_none())
    }

    /// Whether the tree directory is the top of its own work tree.
    ///
    /// A plain directory nested inside some other repository is not: git
    /// would resolve every command against the enclosing repository.
    pub fn is_checkout(&self) -> Result<bool> {
        let Some(out) = self
            .git
            .query(&self.root, ["rev-parse", "--show-toplevel"])?
        else {
            return Ok(false);
        };
        let toplevel = std::fs::canonicalize(out.trim())?;
        Ok(toplevel == std::fs::canonicalize(&self.root)?)
    }

    /// The release tag pointing at `HEAD`, or `None` if `HEAD` is untagged,
    /// unreachable, or tagged with something that is not a release tag.
    pub fn current_tag(&self) -> Result<Option<VersionTag>> {
        if let Some(out) = self.git.query(&self.root, ["tag", "--points-at", "HEAD"])? {
            let tagged = out
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .find_map(|line| VersionTag::parse(line).ok());
            if let Some(tag) = tagged {
                return Ok(Some(tag));
            }
        }

        let described = self
            .git
            .query(&self.root, ["describe", "--tags", "--exact-match"])?;
        let tag = described.and_then(|out| VersionTag::parse(out.trim()).ok());
        if tag.is_none() {
            debug!("no release tag at HEAD in {}", self.root.display());
        }
        Ok(tag)
    }

    /// (Re)apply the sparse allow-list. Safe to call repeatedly.
    pub fn ensure_sparse_paths(&self) -> Result<()> {
        self.git
            .run(Some(&self.root), ["sparse-checkout", "init", "--cone"])?;
        self.git.run(
            Some(&self.root),
            ["sparse-checkout", "set"].into_iter().chain(SPARSE_PATHS),
        )?;
        Ok(())
    }
}
