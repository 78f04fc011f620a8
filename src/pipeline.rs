//! Конвейер: загрузка -> очистка -> кодирование -> разбиение -> статистики

use linfa::Dataset;
use ndarray::{Array1, Ix1};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader;
use crate::preprocessing::{
    compute_stats, drop_missing, normalize, separate_label, train_test_split, NormalizationStats,
};
use crate::types::Table;

/// Результат подготовки: признаки и метки train/test плюс статистики train
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train_features: Table,
    pub test_features: Table,
    pub train_labels: Array1<f64>,
    pub test_labels: Array1<f64>,
    pub stats: NormalizationStats,
}

impl PreparedData {
    pub fn normalized_train(&self) -> Result<Table> {
        normalize(&self.train_features, &self.stats)
    }

    pub fn normalized_test(&self) -> Result<Table> {
        normalize(&self.test_features, &self.stats)
    }

    /// Датасеты linfa (train, test) для внешних моделей
    pub fn to_datasets(
        &self,
        normalized: bool,
    ) -> Result<(Dataset<f64, f64, Ix1>, Dataset<f64, f64, Ix1>)> {
        let (train, test) = if normalized {
            (self.normalized_train()?, self.normalized_test()?)
        } else {
            (self.train_features.clone(), self.test_features.clone())
        };

        let names: Vec<String> = train.column_names().iter().map(|s| s.to_string()).collect();
        let train_ds = Dataset::new(train.to_array()?, self.train_labels.clone())
            .with_feature_names(names.clone());
        let test_ds = Dataset::new(test.to_array()?, self.test_labels.clone())
            .with_feature_names(names);
        Ok((train_ds, test_ds))
    }
}

/// Загрузка по конфигурации и подготовка
pub fn run(config: &PipelineConfig) -> Result<PreparedData> {
    config.validate()?;
    let table = loader::load(&config.source, &config.columns, &config.load, config.timeout())?;
    prepare(table, config)
}

/// Очистка, кодирование, разбиение и статистики для уже загруженной таблицы
pub fn prepare(table: Table, config: &PipelineConfig) -> Result<PreparedData> {
    config.validate()?;

    let mut table = drop_missing(table);
    if let Some(encoder) = &config.encoder {
        table = encoder.encode(table)?;
    }

    let (mut train_features, mut test_features) =
        train_test_split(&table, config.train_fraction, config.seed)?;

    // Метку отделяем после разбиения
    let train_labels = separate_label(&mut train_features, &config.label)?;
    let test_labels = separate_label(&mut test_features, &config.label)?;

    let stats = compute_stats(&train_features)?;

    tracing::info!(
        "Prepared {} train / {} test rows with {} features",
        train_features.n_rows(),
        test_features.n_rows(),
        train_features.n_cols()
    );

    Ok(PreparedData {
        train_features,
        test_features,
        train_labels,
        test_labels,
        stats,
    })
}
