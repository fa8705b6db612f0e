use crate::core::ConfigProvider;
use crate::domain::model::{DocumentKind, SectionSpec, SkillBarStyle};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "cv-sections")]
#[command(about = "Render CV/resume sections from a positions spreadsheet")]
pub struct CliConfig {
    /// Positions sheet (CSV or TSV)
    #[arg(long)]
    pub positions: String,

    /// Optional skills sheet with `skill` and `level` columns
    #[arg(long)]
    pub skills: Option<String>,

    /// Sections to render, in document order
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "education,research_positions,industry_positions,teaching_positions,academic_articles"
    )]
    pub sections: Vec<String>,

    /// Only include rows flagged in_resume
    #[arg(long)]
    pub resume: bool,

    /// Turn links into numbered footnotes instead of dropping them
    #[arg(long)]
    pub pdf_export: bool,

    /// Value a skill level is measured against
    #[arg(long, default_value = "5")]
    pub skill_scale: f64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "cv.md")]
    pub filename: String,

    /// Also write a zip with the document and a JSON dump of the entries
    #[arg(long)]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn positions_file(&self) -> &str {
        &self.positions
    }

    fn skills_file(&self) -> Option<&str> {
        self.skills.as_deref()
    }

    fn sections(&self) -> Vec<SectionSpec> {
        self.sections.iter().map(SectionSpec::new).collect()
    }

    fn document_kind(&self) -> DocumentKind {
        if self.resume {
            DocumentKind::Resume
        } else {
            DocumentKind::Cv
        }
    }

    fn pdf_export(&self) -> bool {
        self.pdf_export
    }

    fn skill_bar_style(&self) -> SkillBarStyle {
        SkillBarStyle {
            out_of: self.skill_scale,
            ..SkillBarStyle::default()
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        &self.filename
    }

    fn bundle(&self) -> bool {
        self.bundle
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let mut inputs = vec![self.positions.clone()];
        inputs.extend(self.skills.iter().cloned());
        validation::validate_file_extensions("inputs", &inputs, &["csv", "tsv"])?;
        validation::validate_section_ids("sections", &self.sections)?;
        validation::validate_range("skill_scale", self.skill_scale, 1.0, 100.0)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_path("filename", &self.filename)?;
        Ok(())
    }
}
