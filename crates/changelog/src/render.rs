//! Rendering of release sections and release notes.
//!
//! Output follows the Keep a Changelog layout: an empty `## [Unreleased]`
//! header, then `## [X.Y.Z] - <date>` with one `### <Category>` block per
//! non-empty category.

use crate::locator::{UNRELEASED, heading_token};
use crate::sections::Sections;
use crate::version::Version;

/// Heading that opens the unreleased section.
pub const UNRELEASED_HEADING: &str = "## [Unreleased]";

/// Render the new unreleased header and the dated release section.
///
/// Categories are written in fixed order and their entries sorted
/// lexicographically; empty categories are omitted.
#[must_use]
pub fn make_new_sections(sections: &Sections, version: &Version, date: &str) -> Vec<String> {
    let mut lines = release_header(version, date);

    for (category, entries) in sections.iter_rendered() {
        let mut sorted = entries.to_vec();
        sorted.sort();

        lines.push(format!("### {category}"));
        lines.extend(sorted);
        lines.push(String::new());
    }

    lines
}

/// Render the first release of a changelog.
///
/// When classification produced nothing, the original unreleased block is
/// carried over verbatim so the release is never empty.
#[must_use]
pub fn make_bootstrap_sections<S: AsRef<str>>(
    sections: &Sections,
    raw_block: &[S],
    version: &Version,
    date: &str,
) -> Vec<String> {
    if !sections.is_empty() {
        return make_new_sections(sections, version, date);
    }

    let mut lines = release_header(version, date);
    lines.extend(trim_blank_edges(raw_block).iter().map(|l| l.as_ref().to_string()));
    lines.push(String::new());
    lines
}

fn release_header(version: &Version, date: &str) -> Vec<String> {
    vec![
        UNRELEASED_HEADING.to_string(),
        String::new(),
        format!("## [{version}] - {date}"),
        String::new(),
    ]
}

/// Body of a released section, without its heading.
///
/// Returns `None` if the document has no heading for `version`. Leading and
/// trailing blank lines are dropped.
#[must_use]
pub fn extract_release_notes<S: AsRef<str>>(lines: &[S], version: &Version) -> Option<Vec<String>> {
    let start = lines.iter().position(|line| {
        heading_token(line.as_ref())
            .filter(|token| *token != UNRELEASED)
            .and_then(|token| token.parse::<Version>().ok())
            .is_some_and(|parsed| parsed == *version)
    })?;

    let body = &lines[start + 1..];
    let end = body
        .iter()
        .position(|line| heading_token(line.as_ref()).is_some())
        .unwrap_or(body.len());

    Some(
        trim_blank_edges(&body[..end])
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect(),
    )
}

/// Skeleton for a changelog that has never been released.
#[must_use]
pub fn changelog_template() -> Vec<String> {
    [
        "# Changelog",
        "",
        "All notable changes to this project will be documented in this file.",
        "",
        "The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),",
        "and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).",
        "",
        UNRELEASED_HEADING,
        "",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn trim_blank_edges<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let is_blank = |line: &S| line.as_ref().trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);
    &lines[start..end]
}
