use crate::core::links::{LinkMode, LinkRegistry};
use crate::core::render::{Block, SectionRenderer};
use crate::core::skills::render_skill_bars;
use crate::core::table::{delimiter_for, read_positions, read_skills};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{PositionRecord, RenderedDocument, RenderedSection, SourceData};
use crate::utils::error::Result;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub struct CvPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CvPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn warn_unlisted_sections(&self, records: &[PositionRecord]) {
        let listed: BTreeSet<String> = self.config.sections().into_iter().map(|s| s.id).collect();
        let unlisted: BTreeSet<&str> = records
            .iter()
            .map(|r| r.section.as_str())
            .filter(|id| !id.is_empty() && !listed.contains(*id))
            .collect();

        if !unlisted.is_empty() {
            tracing::warn!(
                "Sections present in the sheet but not configured: {}",
                unlisted.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CvPipeline<S, C> {
    async fn extract(&self) -> Result<SourceData> {
        let positions_path = self.config.positions_file();
        tracing::debug!("Reading positions from: {}", positions_path);
        let bytes = self.storage.read_file(positions_path).await?;
        let positions = read_positions(bytes.as_slice(), delimiter_for(positions_path))?;

        let skills = match self.config.skills_file() {
            Some(skills_path) => {
                tracing::debug!("Reading skills from: {}", skills_path);
                let bytes = self.storage.read_file(skills_path).await?;
                read_skills(bytes.as_slice(), delimiter_for(skills_path))?
            }
            None => Vec::new(),
        };

        Ok(SourceData { positions, skills })
    }

    async fn transform(&self, data: SourceData) -> Result<RenderedDocument> {
        let kind = self.config.document_kind();
        let mode = LinkMode::from_pdf_export(self.config.pdf_export());

        self.warn_unlisted_sections(&data.positions);

        let admitted: Vec<PositionRecord> = data
            .positions
            .into_iter()
            .filter(|record| kind.admits(record))
            .collect();
        tracing::debug!("{} record(s) admitted for {:?}", admitted.len(), kind);

        let renderer = SectionRenderer::new();
        let mut links = LinkRegistry::new(mode);
        let mut sections = Vec::new();

        for spec in self.config.sections() {
            let entries = renderer.entries(&admitted, &spec.id, &mut links);
            if entries.is_empty() {
                tracing::debug!("Section '{}' has no entries, skipping", spec.id);
                continue;
            }

            let blocks = entries
                .iter()
                .map(|entry| Block(entry).to_string())
                .collect();
            sections.push(RenderedSection {
                heading: spec.display_heading(),
                id: spec.id,
                entries,
                blocks,
            });
        }

        let skills = if data.skills.is_empty() {
            None
        } else {
            Some(render_skill_bars(&data.skills, &self.config.skill_bar_style()))
        };

        Ok(RenderedDocument {
            kind,
            sections,
            skills,
            links: links.into_links(),
            generated_on: chrono::Local::now().date_naive(),
        })
    }

    async fn load(&self, document: RenderedDocument) -> Result<String> {
        let filename = self.config.output_filename();
        let markdown_path = self.output_file(filename);
        let markdown = document.to_markdown();

        tracing::debug!(
            "Writing {} section(s), {} entries to {}",
            document.sections.len(),
            document.entry_count(),
            markdown_path
        );
        self.storage
            .write_file(&markdown_path, markdown.as_bytes())
            .await?;

        if self.config.bundle() {
            let stem = Path::new(filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("cv");
            let bundle_path = self.output_file(&format!("{}.zip", stem));

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                zip.start_file::<_, ()>(filename, FileOptions::default())?;
                zip.write_all(markdown.as_bytes())?;

                zip.start_file::<_, ()>("entries.json", FileOptions::default())?;
                let json_data = serde_json::to_string_pretty(&document.sections)?;
                zip.write_all(json_data.as_bytes())?;

                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing bundle ({} bytes) to {}", zip_data.len(), bundle_path);
            self.storage.write_file(&bundle_path, &zip_data).await?;
        }

        Ok(markdown_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DocumentKind, SectionSpec, SkillBarStyle};
    use crate::utils::error::CvError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_files(files: &[(&str, &str)]) -> Self {
            let files = files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
                .collect();
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CvError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        skills_file: Option<String>,
        sections: Vec<SectionSpec>,
        kind: DocumentKind,
        pdf_export: bool,
        bundle: bool,
    }

    impl MockConfig {
        fn new(sections: &[&str]) -> Self {
            Self {
                skills_file: None,
                sections: sections.iter().map(|id| SectionSpec::new(*id)).collect(),
                kind: DocumentKind::Cv,
                pdf_export: false,
                bundle: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn positions_file(&self) -> &str {
            "positions.csv"
        }

        fn skills_file(&self) -> Option<&str> {
            self.skills_file.as_deref()
        }

        fn sections(&self) -> Vec<SectionSpec> {
            self.sections.clone()
        }

        fn document_kind(&self) -> DocumentKind {
            self.kind
        }

        fn pdf_export(&self) -> bool {
            self.pdf_export
        }

        fn skill_bar_style(&self) -> SkillBarStyle {
            SkillBarStyle::default()
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn output_filename(&self) -> &str {
            "cv.md"
        }

        fn bundle(&self) -> bool {
            self.bundle
        }
    }

    const POSITIONS: &str = "\
section,in_resume,title,loc,institution,start,end,description_1
education,TRUE,PhD Candidate,Nashville,Vanderbilt University,2015,2020,See [thesis](https://thesis.example)
education,FALSE,BS,Burlington,UVM,2008,2012,
research_positions,TRUE,[Lab](https://lab.example) Fellow,Nashville,VUMC,2017,,
awards,TRUE,Best Poster,NA,NA,,2018,
";

    fn storage() -> MockStorage {
        MockStorage::with_files(&[
            ("positions.csv", POSITIONS),
            ("skills.csv", "skill,level\nR,5\nRust,4\n"),
        ])
    }

    #[tokio::test]
    async fn test_extract_reads_positions_and_skills() {
        let mut config = MockConfig::new(&["education"]);
        config.skills_file = Some("skills.csv".to_string());
        let pipeline = CvPipeline::new(storage(), config);

        let data = pipeline.extract().await.unwrap();
        assert_eq!(data.positions.len(), 4);
        assert_eq!(data.skills.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let pipeline = CvPipeline::new(MockStorage::with_files(&[]), MockConfig::new(&["education"]));
        assert!(matches!(pipeline.extract().await, Err(CvError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_renders_sections_in_configured_order() {
        let pipeline = CvPipeline::new(
            storage(),
            MockConfig::new(&["research_positions", "teaching_positions", "education"]),
        );

        let data = pipeline.extract().await.unwrap();
        let doc = pipeline.transform(data).await.unwrap();

        let ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["research_positions", "education"]);
        assert_eq!(doc.sections[0].heading, "Research Positions");
        assert_eq!(doc.sections[0].entries[0].timeline, "Present - 2017");
        assert_eq!(doc.sections[1].entries.len(), 2);
        assert!(doc.links.is_empty());
        assert!(doc.skills.is_none());

        let md = doc.to_markdown();
        assert!(md.contains("### Lab Fellow"));
        assert!(md.contains("- See thesis"));
        assert!(!md.contains("## Links"));
    }

    #[tokio::test]
    async fn test_transform_resume_filters_and_footnotes() {
        let mut config = MockConfig::new(&["education", "research_positions"]);
        config.kind = DocumentKind::Resume;
        config.pdf_export = true;
        let pipeline = CvPipeline::new(storage(), config);

        let data = pipeline.extract().await.unwrap();
        let doc = pipeline.transform(data).await.unwrap();

        assert_eq!(doc.sections[0].entries.len(), 1);
        assert_eq!(doc.sections[0].entries[0].descriptions, vec!["See thesis<sup>1</sup>"]);
        assert_eq!(doc.sections[1].entries[0].title, "Lab<sup>2</sup> Fellow");
        assert_eq!(
            doc.links,
            vec!["https://thesis.example".to_string(), "https://lab.example".to_string()]
        );
        assert!(doc.to_markdown().contains("## Links\n\n1. https://thesis.example\n2. https://lab.example\n"));
    }

    #[tokio::test]
    async fn test_transform_includes_skill_bars() {
        let mut config = MockConfig::new(&["awards"]);
        config.skills_file = Some("skills.csv".to_string());
        let pipeline = CvPipeline::new(storage(), config);

        let data = pipeline.extract().await.unwrap();
        let doc = pipeline.transform(data).await.unwrap();

        assert_eq!(doc.sections[0].entries[0].location, "N/A");
        let skills = doc.skills.as_deref().unwrap();
        assert!(skills.contains("#969696 80%"));
        assert!(doc.to_markdown().contains("## Skills"));
    }

    #[tokio::test]
    async fn test_load_writes_markdown() {
        let storage = storage();
        let pipeline = CvPipeline::new(storage.clone(), MockConfig::new(&["education"]));

        let data = pipeline.extract().await.unwrap();
        let doc = pipeline.transform(data).await.unwrap();
        let path = pipeline.load(doc).await.unwrap();

        assert_eq!(path, Path::new("out").join("cv.md").to_string_lossy());
        let written = storage.get_file(&path).await.unwrap();
        let text = String::from_utf8(written).unwrap();
        assert!(text.starts_with("## Education\n\n### PhD Candidate\n"));

        let bundle = Path::new("out").join("cv.zip").to_string_lossy().into_owned();
        assert!(storage.get_file(&bundle).await.is_none());
    }

    #[tokio::test]
    async fn test_load_bundle_contains_markdown_and_entries() {
        let storage = storage();
        let mut config = MockConfig::new(&["education"]);
        config.bundle = true;
        let pipeline = CvPipeline::new(storage.clone(), config);

        let data = pipeline.extract().await.unwrap();
        let doc = pipeline.transform(data).await.unwrap();
        pipeline.load(doc).await.unwrap();

        let bundle = Path::new("out").join("cv.zip").to_string_lossy().into_owned();
        let zip_bytes = storage.get_file(&bundle).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["cv.md", "entries.json"]);

        let entries_json = {
            let mut file = archive.by_name("entries.json").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let parsed: serde_json::Value = serde_json::from_str(&entries_json).unwrap();
        assert_eq!(parsed[0]["id"], "education");
        assert_eq!(parsed[0]["entries"][0]["timeline"], "2020 - 2015");
    }
}
