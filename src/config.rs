/// Конфигурация конвейера подготовки данных

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::loader::LoadOptions;
use crate::preprocessing::OneHotEncoder;
use crate::types::ColumnSpec;

pub const AUTO_MPG_URL: &str =
    "http://archive.ics.uci.edu/ml/machine-learning-databases/auto-mpg/auto-mpg.data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// URL (http/https) или путь к файлу
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub load: LoadOptions,
    #[serde(default = "default_encoder")]
    pub encoder: Option<OneHotEncoder>,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source() -> String { AUTO_MPG_URL.to_string() }
fn default_label() -> String { "MPG".to_string() }
fn default_train_fraction() -> f64 { 0.8 }
fn default_timeout_secs() -> u64 { 30 }

fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::continuous("MPG"),
        ColumnSpec::continuous("Cylinders"),
        ColumnSpec::continuous("Displacement"),
        ColumnSpec::continuous("Horsepower"),
        ColumnSpec::continuous("Weight"),
        ColumnSpec::continuous("Acceleration"),
        ColumnSpec::continuous("Model Year"),
        ColumnSpec::categorical("Origin"),
    ]
}

fn default_encoder() -> Option<OneHotEncoder> {
    Some(OneHotEncoder::new(
        "Origin",
        [(1, "USA"), (2, "Europe"), (3, "Japan")],
    ))
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            columns: default_columns(),
            load: LoadOptions::default(),
            encoder: default_encoder(),
            label: default_label(),
            train_fraction: default_train_fraction(),
            seed: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Проверка ссылок на колонки и доли train до начала загрузки
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(PrepError::config("no columns specified"));
        }
        let mut names = HashSet::new();
        for column in &self.columns {
            if !names.insert(column.name.as_str()) {
                return Err(PrepError::config(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        if !self.columns.iter().any(|c| c.name == self.label) {
            return Err(PrepError::unknown_column(&self.label));
        }
        if let Some(encoder) = &self.encoder {
            if !self.columns.iter().any(|c| c.name == encoder.column) {
                return Err(PrepError::unknown_column(&encoder.column));
            }
            if encoder.column == self.label {
                return Err(PrepError::config("label column cannot be one-hot encoded"));
            }
        }

        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(PrepError::config(format!(
                "train fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        Ok(())
    }
}
