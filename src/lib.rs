pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use core::{engine::BuildEngine, pipeline::CvPipeline, render::SectionRenderer};
pub use domain::model::{PositionRecord, RenderedDocument, RenderedEntry};
pub use utils::error::{CvError, Result};
