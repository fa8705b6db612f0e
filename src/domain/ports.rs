use crate::domain::model::{DocumentKind, RenderedDocument, SectionSpec, SkillBarStyle, SourceData};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn positions_file(&self) -> &str;
    fn skills_file(&self) -> Option<&str>;
    fn sections(&self) -> Vec<SectionSpec>;
    fn document_kind(&self) -> DocumentKind;
    fn pdf_export(&self) -> bool;
    fn skill_bar_style(&self) -> SkillBarStyle;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn bundle(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceData>;
    async fn transform(&self, data: SourceData) -> Result<RenderedDocument>;
    async fn load(&self, document: RenderedDocument) -> Result<String>;
}
