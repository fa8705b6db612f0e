use crate::core::ConfigProvider;
use crate::domain::model::{DocumentKind, SectionSpec, SkillBarStyle};
use crate::utils::error::{CvError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

const DEFAULT_FILENAME: &str = "cv.md";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub document: DocumentConfig,
    pub source: SourceConfig,
    pub sections: Vec<SectionSpec>,
    pub skills: Option<SkillBarStyle>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub name: String,
    pub kind: Option<DocumentKind>,
    pub pdf_export: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub positions: String,
    pub skills: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename: Option<String>,
    pub bundle: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CvError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the config after replacing `${VAR}` with environment values.
    /// Unset variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CvError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("document.name", &self.document.name)?;

        let mut inputs = vec![self.source.positions.clone()];
        inputs.extend(self.source.skills.iter().cloned());
        validation::validate_file_extensions("source", &inputs, &["csv", "tsv"])?;

        let ids: Vec<String> = self.sections.iter().map(|s| s.id.clone()).collect();
        validation::validate_section_ids("sections", &ids)?;

        if let Some(style) = &self.skills {
            validation::validate_range("skills.out_of", style.out_of, 1.0, 100.0)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if let Some(filename) = &self.load.filename {
            validation::validate_path("load.filename", filename)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn positions_file(&self) -> &str {
        &self.source.positions
    }

    fn skills_file(&self) -> Option<&str> {
        self.source.skills.as_deref()
    }

    fn sections(&self) -> Vec<SectionSpec> {
        self.sections.clone()
    }

    fn document_kind(&self) -> DocumentKind {
        self.document.kind.unwrap_or_default()
    }

    fn pdf_export(&self) -> bool {
        self.document.pdf_export.unwrap_or(false)
    }

    fn skill_bar_style(&self) -> SkillBarStyle {
        self.skills.clone().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }

    fn bundle(&self) -> bool {
        self.load.bundle.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
