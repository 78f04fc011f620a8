//! Tabular prep - подготовка табличных данных для обучения моделей

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PrepError, Result};
pub use pipeline::{prepare, run, PreparedData};
pub use preprocessing::*;
pub use types::*;
