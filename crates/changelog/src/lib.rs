//! Keep a Changelog version-bump engine for bumpwright.
//!
//! This crate turns the `## [Unreleased]` section of a changelog into a dated
//! release section and computes the next semantic version from its entries.
//! It is pure: every operation takes the document as lines and returns new
//! lines, so callers own all I/O and can process many repositories in
//! parallel.
//!
//! # Pipeline
//!
//! - [`locator`] - finds the latest released version and section boundaries
//! - [`sections`] - repairs misleveled headings and classifies entries
//! - [`dedup`] - removes exact and near-duplicate entries per category
//! - [`version`] - maps severity counts to a major/minor/patch bump
//! - [`render`] - writes the new unreleased header and release section
//! - [`processor`] - runs the pipeline over a whole document
//!
//! # Example
//!
//! ```rust,ignore
//! use bumpwright_changelog::{ChangelogProcessor, Error, file};
//! use std::path::Path;
//!
//! let path = Path::new("CHANGELOG.md");
//! let lines = file::read_lines(path)?;
//!
//! match ChangelogProcessor::default_config().process_changelog(&lines) {
//!     Ok(update) => {
//!         file::write_lines(path, &update.lines)?;
//!         println!("releasing {}", update.version);
//!     }
//!     Err(Error::NoChanges) => println!("nothing to release"),
//!     Err(e) => return Err(e),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod dedup;
pub mod error;
pub mod file;
pub mod locator;
pub mod processor;
pub mod render;
pub mod sections;
pub mod version;

// Re-export main types
pub use config::{BoundaryMatching, ChangelogConfig, DedupConfig, INITIAL_VERSION};
pub use dedup::{deduplicate_entries, deduplicate_entries_with, overlap_ratio};
pub use error::{Error, Result};
pub use locator::find_latest_version;
pub use processor::{
    ChangelogProcessor, ChangelogUpdate, is_changelog_unreleased_empty, process_changelog,
    process_new_changelog,
};
pub use render::{changelog_template, extract_release_notes, make_new_sections};
pub use sections::{Category, Sections, fix_section_headings, parse_unreleased_into_sections};
pub use version::{BumpType, ChangeCounts, Version, next_version};
