//! Change categories and classification of the unreleased block.
//!
//! The unreleased block is first repaired by [`fix_section_headings`] so that
//! misleveled headings such as `## Fixed` or `#### Added` are not lost, then
//! split into per-category buckets by [`parse_unreleased_into_sections`].

use crate::config::DedupConfig;
use crate::dedup::deduplicate_entries_with;
use crate::version::{BumpType, ChangeCounts};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Literal bullet prefix that marks an entry as a breaking change.
pub const BREAKING_MARKER: &str = "- **BREAKING CHANGE:**";

static LOOSE_CATEGORY_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#+\s*(added|changed|deprecated|removed|fixed|security)\s*$")
        .expect("loose category heading regex is valid")
});

static CATEGORY_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*###\s+(added|changed|deprecated|removed|fixed|security)\s*$")
        .expect("category heading regex is valid")
});

/// One of the fixed Keep a Changelog change categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// New features.
    Added,
    /// Changes in existing functionality.
    Changed,
    /// Soon-to-be removed features.
    Deprecated,
    /// Removed features.
    Removed,
    /// Bug fixes.
    Fixed,
    /// Vulnerability fixes.
    Security,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    /// Order in which categories are written into a release section.
    pub const RENDER_ORDER: [Self; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Fixed,
        Self::Removed,
        Self::Security,
    ];

    /// Canonical heading name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }

    /// Parse a category name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
    }

    /// Severity an accepted entry contributes to the next version.
    #[must_use]
    pub fn severity(self, entry: &str) -> BumpType {
        if is_breaking(entry) {
            BumpType::Major
        } else if self == Self::Added {
            BumpType::Minor
        } else {
            BumpType::Patch
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether an entry carries the breaking-change marker.
#[must_use]
pub fn is_breaking(entry: &str) -> bool {
    entry.trim_start().starts_with(BREAKING_MARKER)
}

/// Classified entries of an unreleased block, one bucket per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    buckets: [Vec<String>; 6],
}

impl Sections {
    /// Create empty sections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one category, in document order.
    #[must_use]
    pub fn entries(&self, category: Category) -> &[String] {
        &self.buckets[category.index()]
    }

    /// Append an entry to a category.
    pub fn push(&mut self, category: Category, entry: impl Into<String>) {
        self.buckets[category.index()].push(entry.into());
    }

    /// Whether every category is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Total number of entries across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Non-empty categories with their entries, in render order.
    pub fn iter_rendered(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::RENDER_ORDER
            .into_iter()
            .map(move |category| (category, self.entries(category)))
            .filter(|(_, entries)| !entries.is_empty())
    }

    /// Recount severities from the current contents.
    #[must_use]
    pub fn change_counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts::default();
        for category in Category::ALL {
            for entry in self.entries(category) {
                counts.record(category.severity(entry));
            }
        }
        counts
    }

    /// Deduplicate every category independently.
    pub fn deduplicate(&mut self, config: &DedupConfig) {
        for category in Category::ALL {
            let bucket = &mut self.buckets[category.index()];
            let before = bucket.len();
            *bucket = deduplicate_entries_with(bucket, config);
            if bucket.len() != before {
                debug!(
                    %category,
                    removed = before - bucket.len(),
                    "Removed duplicate entries"
                );
            }
        }
    }
}

/// Rewrite misleveled category headings to the canonical `### <Category>`.
///
/// The matched category token keeps its original case. Returns the number of
/// lines that changed.
pub fn fix_section_headings(block: &mut [String]) -> usize {
    let mut repaired = 0;
    for line in block.iter_mut() {
        let Some(token) = LOOSE_CATEGORY_HEADING
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        let canonical = format!("### {token}");
        if *line != canonical {
            debug!(original = %line, repaired = %canonical, "Repaired section heading");
            *line = canonical;
            repaired += 1;
        }
    }
    repaired
}

/// Split an unreleased block into category buckets and count severities.
///
/// Lines before the first category heading, lines under an unrecognized
/// heading, blank lines and bare `-` bullets are dropped. Breaking-change
/// status is taken from the raw text.
#[must_use]
pub fn parse_unreleased_into_sections<S: AsRef<str>>(block: &[S]) -> (Sections, ChangeCounts) {
    let mut sections = Sections::new();
    let mut counts = ChangeCounts::default();
    let mut cursor: Option<Category> = None;

    for line in block {
        let line = line.as_ref();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = CATEGORY_HEADING.captures(line) {
            cursor = caps.get(1).and_then(|m| Category::parse(m.as_str()));
            continue;
        }
        if trimmed.starts_with('#') {
            cursor = None;
            continue;
        }
        if trimmed == "-" {
            continue;
        }

        let Some(category) = cursor else {
            continue;
        };
        counts.record(category.severity(trimmed));
        sections.push(category, trimmed);
    }

    (sections, counts)
}
