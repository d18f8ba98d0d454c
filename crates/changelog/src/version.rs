//! Version parsing, ordering and bump calculation.
//!
//! This module provides:
//! - [`Version`] parsing from changelog headings and canonical formatting
//! - [`BumpType`] with strict major > minor > patch precedence
//! - [`ChangeCounts`], the per-severity tally that drives the next version

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A semantic version following the `SemVer` 2.0.0 specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifier (e.g., "alpha", "beta.1").
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "20230101", "commit.abc123").
    pub build: Option<String>,
}

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Apply a bump type to this version.
    ///
    /// Pre-release and build metadata are dropped by any real bump.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the bumped component would
    /// overflow.
    pub fn bump(&self, bump_type: BumpType) -> Result<Self> {
        let overflow = || Error::invalid_version(format!("{self} cannot be bumped ({bump_type})"));
        let next = match bump_type {
            BumpType::Major => Self::new(self.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpType::Minor => Self::new(
                self.major,
                self.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            BumpType::Patch => Self::new(
                self.major,
                self.minor,
                self.patch.checked_add(1).ok_or_else(overflow)?,
            ),
            BumpType::None => self.clone(),
        };
        Ok(next)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        let (version_pre, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };

        let (version, prerelease) = match version_pre.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_pre, None),
        };

        if prerelease.as_deref() == Some("") || build.as_deref() == Some("") {
            return Err(Error::invalid_version(s));
        }

        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::invalid_version(s));
        }

        let major = parse_component(parts[0], "major")?;
        let minor = parse_component(parts[1], "minor")?;
        let patch = parse_component(parts[2], "patch")?;

        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }
}

fn parse_component(part: &str, name: &str) -> Result<u64> {
    // u64::from_str accepts a leading '+', which is not valid semver
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_version(format!(
            "Invalid {name} version: {part}"
        )));
    }
    part.parse()
        .map_err(|_| Error::invalid_version(format!("Invalid {name} version: {part}")))
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            major,
            minor,
            patch,
            prerelease,
            build,
        } = self;
        write!(f, "{major}.{minor}.{patch}")?;
        match (prerelease, build) {
            (Some(pre), Some(build)) => write!(f, "-{pre}+{build}"),
            (Some(pre), None) => write!(f, "-{pre}"),
            (None, Some(build)) => write!(f, "+{build}"),
            (None, None) => Ok(()),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Build metadata never takes part in precedence.
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (Some(a), Some(b)) => a.cmp(b),
                // A release outranks any of its pre-releases.
                (a, b) => b.is_some().cmp(&a.is_some()),
            })
    }
}

/// Type of version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// No version change.
    None,
    /// Patch version bump (0.0.X).
    Patch,
    /// Minor version bump (0.X.0).
    Minor,
    /// Major version bump (X.0.0).
    Major,
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Per-severity tally of accepted changelog entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    /// Entries carrying the breaking-change marker.
    pub major: usize,
    /// Non-breaking entries in the Added category.
    pub minor: usize,
    /// Every other accepted entry.
    pub patch: usize,
}

impl ChangeCounts {
    /// Record one accepted entry at the given severity.
    pub fn record(&mut self, bump: BumpType) {
        match bump {
            BumpType::Major => self.major += 1,
            BumpType::Minor => self.minor += 1,
            BumpType::Patch => self.patch += 1,
            BumpType::None => {}
        }
    }

    /// Total number of counted entries.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.major + self.minor + self.patch
    }

    /// Whether no entry was counted at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Map the counts to a bump with strict major > minor > patch precedence.
    #[must_use]
    pub const fn bump_type(&self) -> BumpType {
        if self.major > 0 {
            BumpType::Major
        } else if self.minor > 0 {
            BumpType::Minor
        } else if self.patch > 0 {
            BumpType::Patch
        } else {
            BumpType::None
        }
    }
}

/// Compute the next version from the current one and the post-dedup counts.
///
/// # Errors
///
/// Returns [`Error::NoChanges`] when every counter is zero and
/// [`Error::InvalidVersion`] when the bumped component would overflow.
pub fn next_version(current: &Version, counts: &ChangeCounts) -> Result<(Version, BumpType)> {
    let bump = counts.bump_type();
    if bump == BumpType::None {
        return Err(Error::NoChanges);
    }

    let next = current.bump(bump)?;
    debug!(%current, %next, %bump, ?counts, "Calculated next version");
    Ok((next, bump))
}
