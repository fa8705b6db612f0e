//! Section-to-blocks rendering.
//!
//! A section is rendered as a reverse-chronological list of blocks, one per
//! position record:
//!
//! ```text
//! ### {title}
//!
//! {location}
//!
//! {institution}
//!
//! {timeline}
//!
//! {description block}
//!
//!
//! ```

use crate::core::links::LinkRegistry;
use crate::domain::model::{PositionRecord, RenderedEntry};
use std::cmp::Reverse;
use std::fmt;

/// Stands in for any absent title, location, institution or timeline.
pub const MISSING_SENTINEL: &str = "N/A";

/// Label used for an absent end year when a start year exists.
pub const ONGOING_LABEL: &str = "Present";

/// Description area of an entry with no descriptions.
pub const DESCRIPTION_PLACEHOLDER: &str = " ";

const BLOCK_SEPARATOR: &str = "\n\n\n";

/// Records of `section_id`, most recent first.
///
/// A missing end year counts as ongoing and sorts ahead of every finished
/// position. The sort is stable, so equal end years keep input order.
pub fn select_section<'a>(records: &'a [PositionRecord], section_id: &str) -> Vec<&'a PositionRecord> {
    let mut selected: Vec<&PositionRecord> = records
        .iter()
        .filter(|record| record.section == section_id)
        .collect();
    selected.sort_by_key(|record| Reverse(record.end.unwrap_or(i32::MAX)));
    selected
}

pub fn timeline(start: Option<i32>, end: Option<i32>) -> String {
    match (start, end) {
        (None, None) => MISSING_SENTINEL.to_string(),
        (None, Some(end)) => end.to_string(),
        (Some(start), Some(end)) if start == end => end.to_string(),
        (Some(start), Some(end)) => format!("{} - {}", end, start),
        (Some(start), None) => format!("{} - {}", ONGOING_LABEL, start),
    }
}

pub fn description_block(descriptions: &[String]) -> String {
    if descriptions.is_empty() {
        return DESCRIPTION_PLACEHOLDER.to_string();
    }

    descriptions
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display adapter producing the block text of one entry.
pub struct Block<'a>(pub &'a RenderedEntry);

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.0;
        write!(
            f,
            "### {}\n\n{}\n\n{}\n\n{}\n\n{}{}",
            entry.title,
            entry.location,
            entry.institution,
            entry.timeline,
            description_block(&entry.descriptions),
            BLOCK_SEPARATOR
        )
    }
}

fn or_sentinel(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING_SENTINEL)
        .to_string()
}

/// Renders position records into section blocks.
///
/// Links found in titles and descriptions go through the caller's
/// [`LinkRegistry`]; document builds share one registry across sections so
/// footnote numbers keep increasing through the whole document and the
/// collected destinations line up with them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionRenderer;

impl SectionRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn entries(
        &self,
        records: &[PositionRecord],
        section_id: &str,
        links: &mut LinkRegistry,
    ) -> Vec<RenderedEntry> {
        select_section(records, section_id)
            .into_iter()
            .map(|record| Self::entry(record, links))
            .collect()
    }

    /// One block per matching record; empty when the section has no records.
    pub fn render(
        &self,
        records: &[PositionRecord],
        section_id: &str,
        links: &mut LinkRegistry,
    ) -> Vec<String> {
        let blocks: Vec<String> = self
            .entries(records, section_id, links)
            .iter()
            .map(|entry| Block(entry).to_string())
            .collect();

        tracing::debug!(
            "Rendered {} block(s) for section '{}'",
            blocks.len(),
            section_id
        );
        blocks
    }

    // Links are stripped before blank checks: `[](url)` leaves nothing behind.
    fn entry(record: &PositionRecord, links: &mut LinkRegistry) -> RenderedEntry {
        let title = or_sentinel(&record.title.as_deref().map(|t| links.sanitize(t.trim())));
        let descriptions = record
            .descriptions
            .iter()
            .flatten()
            .map(|d| links.sanitize(d.trim()))
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();

        RenderedEntry {
            title,
            location: or_sentinel(&record.location),
            institution: or_sentinel(&record.institution),
            timeline: timeline(record.start, record.end),
            descriptions,
        }
    }
}
