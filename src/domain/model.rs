use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the positions sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub section: String,
    pub include_in_resume: bool,
    pub title: Option<String>,
    pub location: Option<String>,
    pub institution: Option<String>,
    pub start: Option<i32>,
    pub end: Option<i32>,
    /// `description_1..description_N` in column order; blank cells stay `None`.
    pub descriptions: Vec<Option<String>>,
}

impl PositionRecord {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            include_in_resume: true,
            title: None,
            location: None,
            institution: None,
            start: None,
            end: None,
            descriptions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill: String,
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillBarStyle {
    pub out_of: f64,
    pub bar_color: String,
    pub bar_background: String,
}

impl Default for SkillBarStyle {
    fn default() -> Self {
        Self {
            out_of: 5.0,
            bar_color: "#969696".to_string(),
            bar_background: "#d9d9d9".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Cv,
    Resume,
}

impl DocumentKind {
    /// Resumes only list rows flagged `in_resume`.
    pub fn admits(&self, record: &PositionRecord) -> bool {
        match self {
            DocumentKind::Cv => true,
            DocumentKind::Resume => record.include_in_resume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    pub heading: Option<String>,
}

impl SectionSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heading: None,
        }
    }

    /// Explicit heading, or the id with underscores as spaces and each word capitalized.
    pub fn display_heading(&self) -> String {
        if let Some(heading) = &self.heading {
            return heading.clone();
        }

        self.id
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub positions: Vec<PositionRecord>,
    pub skills: Vec<SkillRecord>,
}

/// A record after sentinel substitution, link stripping and timeline formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    pub title: String,
    pub location: String,
    pub institution: String,
    pub timeline: String,
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    pub id: String,
    pub heading: String,
    pub entries: Vec<RenderedEntry>,
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub sections: Vec<RenderedSection>,
    pub skills: Option<String>,
    pub links: Vec<String>,
    pub generated_on: NaiveDate,
}

impl RenderedDocument {
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n", section.heading));
            for block in &section.blocks {
                out.push_str(block);
            }
        }

        if let Some(skills) = &self.skills {
            out.push_str("## Skills\n\n");
            out.push_str(skills);
            out.push_str("\n\n");
        }

        if !self.links.is_empty() {
            out.push_str("## Links\n\n");
            for (i, link) in self.links.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, link));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "Last updated on {}.\n",
            self.generated_on.format("%Y-%m-%d")
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heading_from_id() {
        assert_eq!(
            SectionSpec::new("research_positions").display_heading(),
            "Research Positions"
        );
        assert_eq!(SectionSpec::new("education").display_heading(), "Education");

        let spec = SectionSpec {
            id: "industry_positions".to_string(),
            heading: Some("Industry Experience".to_string()),
        };
        assert_eq!(spec.display_heading(), "Industry Experience");
    }

    #[test]
    fn test_resume_kind_admits_flagged_rows_only() {
        let mut record = PositionRecord::new("education");
        assert!(DocumentKind::Resume.admits(&record));

        record.include_in_resume = false;
        assert!(!DocumentKind::Resume.admits(&record));
        assert!(DocumentKind::Cv.admits(&record));
    }

    #[test]
    fn test_document_markdown_layout() {
        let doc = RenderedDocument {
            kind: DocumentKind::Cv,
            sections: vec![RenderedSection {
                id: "education".to_string(),
                heading: "Education".to_string(),
                entries: vec![],
                blocks: vec!["### PhD\n\n".to_string()],
            }],
            skills: None,
            links: vec!["https://example.com".to_string()],
            generated_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };

        let md = doc.to_markdown();
        assert!(md.starts_with("## Education\n\n### PhD\n\n"));
        assert!(md.contains("## Links\n\n1. https://example.com\n"));
        assert!(md.ends_with("Last updated on 2024-03-01.\n"));
        assert!(!md.contains("## Skills"));
    }
}
