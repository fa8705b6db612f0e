use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct BuildEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BuildEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting document build");

        tracing::info!("Reading source sheets...");
        let data = self.pipeline.extract().await?;
        tracing::info!(
            "Read {} position(s) and {} skill(s)",
            data.positions.len(),
            data.skills.len()
        );

        tracing::info!("Rendering sections...");
        let document = self.pipeline.transform(data).await?;
        tracing::info!(
            "Rendered {} section(s) with {} entries",
            document.sections.len(),
            document.entry_count()
        );
        if !document.links.is_empty() {
            tracing::info!("Collected {} footnote link(s)", document.links.len());
        }

        tracing::info!("Writing document...");
        let output_path = self.pipeline.load(document).await?;
        tracing::info!(
            "Document saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
