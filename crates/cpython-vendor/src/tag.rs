//! CPython release tags
//!
//! Only plain release tags of the form `vMAJOR.MINOR.PATCH` are accepted.
//! Pre-release tags such as `v3.14.0rc1` are rejected, matching the set of
//! tags this tooling knows how to order.

use crate::error::VendorError;
use crate::Result;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A parsed `vMAJOR.MINOR.PATCH` tag.
///
/// Field order matters: the derived `Ord` compares `(major, minor, patch)`
/// lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag {
    major: u64,
    minor: u64,
    patch: u64,
}

impl VersionTag {
    /// Build a tag from its components.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionTag {
            major,
            minor,
            patch,
        }
    }

    /// Parse a tag, failing with [`VendorError::InvalidVersion`] on anything
    /// other than an exact `vN.N.N` match.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || VendorError::InvalidVersion(text.to_string());

        let rest = text.strip_prefix('v').ok_or_else(invalid)?;
        let mut parts = rest.split('.');
        let mut next = || -> Result<u64> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let tag = VersionTag::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(tag)
    }

    /// Returns `true` if `text` is a well-formed release tag.
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    /// The `(major, minor, patch)` tuple.
    pub fn components(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTag {
    type Err = VendorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
