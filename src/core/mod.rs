pub mod engine;
pub mod links;
pub mod pipeline;
pub mod render;
pub mod skills;
pub mod table;

pub use crate::domain::model::{PositionRecord, RenderedDocument, SourceData};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
