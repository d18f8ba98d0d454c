//! Changelog engine configuration.
//!
//! The engine runs with sensible defaults; callers that load settings from a
//! project file deserialize a [`ChangelogConfig`] and pass it to
//! [`ChangelogProcessor::new`](crate::ChangelogProcessor::new).

use crate::error::{Error, Result};
use crate::version::Version;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version targeted by a changelog that has never been released.
pub const INITIAL_VERSION: Version = Version::new(1, 0, 0);

/// Overlap ratio at or above which two entries describe the same change.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.6;

/// How section boundaries (`[Unreleased]` and the latest release heading) are
/// recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMatching {
    /// The bracketed marker may appear anywhere on a line.
    ///
    /// Matches the long-standing behavior, including its false positives when
    /// an entry quotes `[Unreleased]` or a version heading in free text.
    #[default]
    Substring,

    /// Only whole `## [..]` heading lines count as boundaries.
    Anchored,
}

impl fmt::Display for BoundaryMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => write!(f, "substring"),
            Self::Anchored => write!(f, "anchored"),
        }
    }
}

/// Near-duplicate detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Whether the semantic (token overlap) phase runs at all.
    ///
    /// Exact duplicates are always removed.
    pub enabled: bool,
    /// Minimum overlap ratio for two entries to be treated as duplicates.
    #[serde(rename = "overlapThreshold")]
    pub overlap_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

/// Complete changelog engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Version assigned to the first release of a changelog.
    #[serde(rename = "initialVersion")]
    pub initial_version: Version,
    /// Entry deduplication settings.
    pub dedup: DedupConfig,
    /// Section boundary detection.
    pub boundary: BoundaryMatching,
    /// `strftime` format for the release date in version headings.
    #[serde(rename = "dateFormat")]
    pub date_format: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            initial_version: INITIAL_VERSION,
            dedup: DedupConfig::default(),
            boundary: BoundaryMatching::default(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl ChangelogConfig {
    /// Check the configuration for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overlap threshold is outside `(0, 1]`
    /// or the date format is empty or not a valid `strftime` string.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.dedup.overlap_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::config(
                format!("Invalid overlap threshold: {threshold}"),
                "dedup.overlapThreshold must be greater than 0 and at most 1",
            ));
        }

        if self.date_format.is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::config(
                format!("Invalid date format: '{}'", self.date_format),
                "dateFormat must be a strftime pattern such as %Y-%m-%d",
            ));
        }

        Ok(())
    }
}
