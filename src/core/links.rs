//! Inline markdown link handling.
//!
//! Rendered text never carries `[text](url)` syntax. Depending on the export
//! target the URL is either discarded or turned into a numbered footnote whose
//! destination is collected for a trailing link list.

use pulldown_cmark::{Event, LinkType, Parser, Tag, TagEnd};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Keep the link text, drop the destination.
    #[default]
    Drop,
    /// Keep the link text followed by `<sup>n</sup>`; record the destination.
    Footnote,
}

impl LinkMode {
    pub fn from_pdf_export(pdf_export: bool) -> Self {
        if pdf_export {
            LinkMode::Footnote
        } else {
            LinkMode::Drop
        }
    }
}

/// An inline link or image located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InlineLink {
    /// Whole `[label](destination "title")` span.
    span: Range<usize>,
    /// Label source between the brackets; empty for `[](url)`.
    label: Range<usize>,
    destination: String,
}

fn extend_label(open: &mut Option<InlineLink>, range: Range<usize>) {
    if let Some(link) = open.as_mut() {
        if link.label.is_empty() {
            link.label = range;
        } else {
            link.label.end = link.label.end.max(range.end);
        }
    }
}

/// Outermost inline links and images in source order, as CommonMark parses
/// them. Destinations may carry balanced parentheses, `<...>` delimiters and
/// an optional title.
fn inline_links(text: &str) -> Vec<InlineLink> {
    let mut found = Vec::new();
    let mut open: Option<InlineLink> = None;
    let mut depth = 0usize;

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                ..
            })
            | Event::Start(Tag::Image {
                link_type,
                dest_url,
                ..
            }) => {
                depth += 1;
                if depth > 1 {
                    extend_label(&mut open, range);
                } else if link_type == LinkType::Inline {
                    let label_start = text[range.clone()]
                        .find('[')
                        .map_or(range.start, |i| range.start + i + 1);
                    open = Some(InlineLink {
                        label: label_start..label_start,
                        span: range,
                        destination: dest_url.into_string(),
                    });
                }
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    extend_label(&mut open, range);
                } else if let Some(link) = open.take() {
                    found.push(link);
                }
            }
            _ => extend_label(&mut open, range),
        }
    }

    found
}

/// Collects footnote destinations across every section of one document.
///
/// Numbers are assigned in the order links are sanitized, starting at 1, and
/// every occurrence gets its own number even when the URL repeats.
#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    mode: LinkMode,
    links: Vec<String>,
}

impl LinkRegistry {
    pub fn new(mode: LinkMode) -> Self {
        Self {
            mode,
            links: Vec::new(),
        }
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }

    pub fn sanitize(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for link in inline_links(text) {
            out.push_str(&text[cursor..link.span.start]);
            // Labels may wrap an image, which is itself inline link syntax.
            let label = self.sanitize(&text[link.label.clone()]);
            out.push_str(&label);
            if self.mode == LinkMode::Footnote {
                self.links.push(link.destination);
                out.push_str(&format!("<sup>{}</sup>", self.links.len()));
            }
            cursor = link.span.end;
        }

        out.push_str(&text[cursor..]);
        out
    }
}

pub fn contains_inline_link(text: &str) -> bool {
    !inline_links(text).is_empty()
}
