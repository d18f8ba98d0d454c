//! Changelog orchestration.
//!
//! Scans a document once, hands the open `[Unreleased]` block to the
//! repair, classify, dedup, bump and render pipeline, and splices the result
//! back between the untouched preamble and released history.

use crate::config::{BoundaryMatching, ChangelogConfig};
use crate::error::{Error, Result};
use crate::locator::{closes_unreleased, find_latest_version, is_unreleased_marker};
use crate::render::{make_bootstrap_sections, make_new_sections};
use crate::sections::{Sections, fix_section_headings, parse_unreleased_into_sections};
use crate::version::{BumpType, ChangeCounts, Version, next_version};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

/// Result of preparing a release from a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogUpdate {
    /// Version being released.
    pub version: Version,
    /// Latest version previously recorded, `None` for a first release.
    pub previous_version: Option<Version>,
    /// Bump applied to the previous version, `None` for a first release.
    pub bump: Option<BumpType>,
    /// Severity counts after deduplication.
    pub changes: ChangeCounts,
    /// The rewritten document.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Preamble,
    InUnreleased,
    InReleasedBlock,
}

/// The unreleased block after classification and deduplication.
struct PreparedBlock {
    sections: Sections,
    changes: ChangeCounts,
}

/// Processes Keep a Changelog documents into releases.
///
/// All operations are pure over the given lines; reading and writing the
/// file is left to the caller.
#[derive(Debug, Clone, Default)]
pub struct ChangelogProcessor {
    config: ChangelogConfig,
    release_date: Option<NaiveDate>,
}

impl ChangelogProcessor {
    /// Create a processor with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ChangelogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            release_date: None,
        })
    }

    /// Create a processor with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Use a fixed release date instead of today's local date.
    #[must_use]
    pub const fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    /// Returns a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    const fn boundary(&self) -> BoundaryMatching {
        self.config.boundary
    }

    fn release_date(&self) -> String {
        self.release_date
            .unwrap_or_else(|| Local::now().date_naive())
            .format(&self.config.date_format)
            .to_string()
    }

    /// Release the unreleased section of a changelog.
    ///
    /// The unreleased block ends at the first released heading, so older
    /// sections keep their place even when the newest release is not listed
    /// first. Falls back to
    /// [`process_new_changelog`](Self::process_new_changelog) when the
    /// document has no released version yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChanges`] if there is nothing to release and
    /// [`Error::InvalidVersion`] for a malformed version heading.
    pub fn process_changelog<S: AsRef<str>>(&self, lines: &[S]) -> Result<ChangelogUpdate> {
        let latest = match find_latest_version(lines) {
            Ok(version) => version,
            Err(Error::NoVersionFound) => {
                info!("No released version in changelog, preparing first release");
                return self.process_new_changelog(lines);
            }
            Err(e) => return Err(e),
        };

        let mut output = Vec::with_capacity(lines.len());
        let mut block = Vec::new();
        let mut state = ScanState::Preamble;
        let mut release: Option<(Version, BumpType, ChangeCounts)> = None;

        for line in lines {
            let line = line.as_ref();
            match state {
                ScanState::Preamble => {
                    if is_unreleased_marker(line, self.boundary()) {
                        state = ScanState::InUnreleased;
                    } else {
                        output.push(line.to_string());
                    }
                }
                ScanState::InUnreleased => {
                    if closes_unreleased(line, &latest, self.boundary()) {
                        release = Some(self.release_block(&mut block, &latest, &mut output)?);
                        output.push(line.to_string());
                        state = ScanState::InReleasedBlock;
                    } else {
                        block.push(line.to_string());
                    }
                }
                ScanState::InReleasedBlock => output.push(line.to_string()),
            }
        }

        // The unreleased block ran to the end of the document.
        if state == ScanState::InUnreleased {
            release = Some(self.release_block(&mut block, &latest, &mut output)?);
        }

        let Some((version, bump, changes)) = release else {
            debug!("Changelog has no [Unreleased] section");
            return Err(Error::NoChanges);
        };

        info!(previous = %latest, %version, %bump, "Prepared changelog release");
        Ok(ChangelogUpdate {
            version,
            previous_version: Some(latest),
            bump: Some(bump),
            changes,
            lines: output,
        })
    }

    /// Release a changelog that has never been released before.
    ///
    /// The version is always the configured initial version. If nothing in
    /// the unreleased block can be classified, its raw content becomes the
    /// body of the release.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChanges`] if the unreleased block is missing or blank.
    pub fn process_new_changelog<S: AsRef<str>>(&self, lines: &[S]) -> Result<ChangelogUpdate> {
        let mut output = Vec::with_capacity(lines.len());
        let mut block = Vec::new();
        let mut state = ScanState::Preamble;

        for line in lines {
            let line = line.as_ref();
            if state == ScanState::Preamble && is_unreleased_marker(line, self.boundary()) {
                state = ScanState::InUnreleased;
            } else if state == ScanState::Preamble {
                output.push(line.to_string());
            } else {
                block.push(line.to_string());
            }
        }

        if block.iter().all(|line| line.trim().is_empty()) {
            return Err(Error::NoChanges);
        }

        let raw = block.clone();
        let prepared = self.prepare_block(&mut block);
        let version = self.config.initial_version.clone();

        if prepared.sections.is_empty() {
            warn!(
                %version,
                "No categorized entries in unreleased section, releasing raw content"
            );
        }

        output.extend(make_bootstrap_sections(
            &prepared.sections,
            &raw,
            &version,
            &self.release_date(),
        ));

        info!(%version, "Prepared first changelog release");
        Ok(ChangelogUpdate {
            version,
            previous_version: None,
            bump: None,
            changes: prepared.changes,
            lines: output,
        })
    }

    /// Whether the unreleased section has no bullet entries.
    ///
    /// A document without a released version is still scanned; a document
    /// without an `[Unreleased]` section is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] for a malformed version heading.
    pub fn is_changelog_unreleased_empty<S: AsRef<str>>(&self, lines: &[S]) -> Result<bool> {
        let latest = match find_latest_version(lines) {
            Ok(version) => Some(version),
            Err(Error::NoVersionFound) => None,
            Err(e) => return Err(e),
        };

        let mut state = ScanState::Preamble;
        for line in lines {
            let line = line.as_ref();
            match state {
                ScanState::Preamble => {
                    if is_unreleased_marker(line, self.boundary()) {
                        state = ScanState::InUnreleased;
                    }
                }
                ScanState::InUnreleased => {
                    if let Some(version) = &latest
                        && closes_unreleased(line, version, self.boundary())
                    {
                        state = ScanState::InReleasedBlock;
                    } else if is_bullet(line) {
                        return Ok(false);
                    }
                }
                ScanState::InReleasedBlock => break,
            }
        }

        Ok(true)
    }

    /// Repair, classify and deduplicate an unreleased block.
    fn prepare_block(&self, block: &mut [String]) -> PreparedBlock {
        fix_section_headings(block);
        let (mut sections, raw_changes) = parse_unreleased_into_sections(&*block);
        sections.deduplicate(&self.config.dedup);
        let changes = sections.change_counts();
        debug!(?raw_changes, ?changes, "Classified unreleased entries");
        PreparedBlock { sections, changes }
    }

    /// Bump `current` from the unreleased block and append the rendered
    /// sections to `output`.
    fn release_block(
        &self,
        block: &mut [String],
        current: &Version,
        output: &mut Vec<String>,
    ) -> Result<(Version, BumpType, ChangeCounts)> {
        let prepared = self.prepare_block(block);
        let (version, bump) = next_version(current, &prepared.changes)?;
        output.extend(make_new_sections(
            &prepared.sections,
            &version,
            &self.release_date(),
        ));
        Ok((version, bump, prepared.changes))
    }
}

fn is_bullet(line: &str) -> bool {
    let trimmed = line.trim();
    ["- ", "* ", "+ "]
        .iter()
        .any(|marker| trimmed.starts_with(marker))
}

/// Release a changelog with the default configuration.
///
/// # Errors
///
/// See [`ChangelogProcessor::process_changelog`].
pub fn process_changelog<S: AsRef<str>>(lines: &[S]) -> Result<ChangelogUpdate> {
    ChangelogProcessor::default_config().process_changelog(lines)
}

/// Release a never-released changelog with the default configuration.
///
/// # Errors
///
/// See [`ChangelogProcessor::process_new_changelog`].
pub fn process_new_changelog<S: AsRef<str>>(lines: &[S]) -> Result<ChangelogUpdate> {
    ChangelogProcessor::default_config().process_new_changelog(lines)
}

/// Check the unreleased section with the default configuration.
///
/// # Errors
///
/// See [`ChangelogProcessor::is_changelog_unreleased_empty`].
pub fn is_changelog_unreleased_empty<S: AsRef<str>>(lines: &[S]) -> Result<bool> {
    ChangelogProcessor::default_config().is_changelog_unreleased_empty(lines)
}
