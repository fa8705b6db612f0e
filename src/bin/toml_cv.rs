use anyhow::Context;
use clap::Parser;
use cv_sections::core::{ConfigProvider, Pipeline};
use cv_sections::domain::model::DocumentKind;
use cv_sections::utils::error::ErrorSeverity;
use cv_sections::utils::{logger, validation::Validate};
use cv_sections::{BuildEngine, CvPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-cv")]
#[command(about = "Build a CV or resume from a TOML document configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "cv.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override pdf_export from config
    #[arg(long)]
    pdf_export: Option<bool>,

    /// Build a resume regardless of the configured kind
    #[arg(long)]
    resume: bool,

    /// Render and report what would be written without writing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML");
            std::process::exit(1);
        }
    };

    if let Some(pdf_export) = args.pdf_export {
        config.document.pdf_export = Some(pdf_export);
        tracing::info!("pdf_export overridden to: {}", pdf_export);
    }
    if args.resume {
        config.document.kind = Some(DocumentKind::Resume);
        tracing::info!("Document kind overridden to: resume");
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let storage = LocalStorage::new(".");
    let pipeline = CvPipeline::new(storage, config);

    if args.dry_run {
        tracing::info!("DRY RUN MODE - nothing will be written");
        return perform_dry_run(&pipeline).await;
    }

    let engine = BuildEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("Document saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("Document: {} ({:?})", config.document.name, config.document_kind());
    tracing::info!("Positions: {}", config.positions_file());
    if let Some(skills) = config.skills_file() {
        tracing::info!("Skills: {}", skills);
    }
    tracing::info!(
        "Sections: {}",
        config
            .sections()
            .iter()
            .map(|s| s.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("PDF export: {}", config.pdf_export());
    tracing::info!(
        "Output: {}/{}{}",
        config.output_path(),
        config.output_filename(),
        if config.bundle() { " (+ zip bundle)" } else { "" }
    );
}

async fn perform_dry_run(pipeline: &CvPipeline<LocalStorage, TomlConfig>) -> anyhow::Result<()> {
    let data = pipeline
        .extract()
        .await
        .context("failed to read source sheets")?;
    let document = pipeline
        .transform(data)
        .await
        .context("failed to render sections")?;

    for section in &document.sections {
        println!("{:<30} {} entries", section.heading, section.entries.len());
    }
    if !document.links.is_empty() {
        println!("{:<30} {} links", "Links", document.links.len());
    }
    println!("Rendered {} bytes of markdown", document.to_markdown().len());

    Ok(())
}
