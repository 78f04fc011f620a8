//! Нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::types::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Среднее и стандартное отклонение по признакам, посчитанные только на train
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    features: Vec<FeatureStats>,
}

impl NormalizationStats {
    pub fn features(&self) -> &[FeatureStats] {
        &self.features
    }

    pub fn get(&self, name: &str) -> Option<&FeatureStats> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn mean(&self) -> Array1<f64> {
        self.features.iter().map(|f| f.mean).collect()
    }

    pub fn std(&self) -> Array1<f64> {
        self.features.iter().map(|f| f.std).collect()
    }

    /// (X - mean) / std для матрицы, колонки которой идут в порядке статистик
    pub fn transform_array(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        if X.ncols() != self.features.len() {
            return Err(PrepError::config(format!(
                "expected {} features, got {}",
                self.features.len(),
                X.ncols()
            )));
        }

        let mean = self.mean();
        let std = self.std();

        let mut normalized = X.clone();
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - mean[i]) / std[i];
            }
        }

        Ok(normalized)
    }
}

pub fn compute_stats(features: &Table) -> Result<NormalizationStats> {
    let names = features.column_names();
    compute_stats_for(features, &names)
}

/// Статистики только по указанным колонкам
pub fn compute_stats_for(features: &Table, columns: &[&str]) -> Result<NormalizationStats> {
    if columns.is_empty() {
        return Err(PrepError::EmptyTable(
            "no feature columns to compute statistics for".to_string(),
        ));
    }
    if features.n_rows() == 0 {
        return Err(PrepError::EmptyTable(
            "cannot compute statistics without rows".to_string(),
        ));
    }

    let X = features.select(columns)?.to_array()?;

    // Популяционное отклонение (ddof = 0)
    let mean = X
        .mean_axis(Axis(0))
        .ok_or_else(|| PrepError::EmptyTable("failed to compute mean".to_string()))?;
    let mut std = X.std_axis(Axis(0), 0.0);

    // Избегаем деления на ноль
    for val in std.iter_mut() {
        if *val < 1e-10 {
            *val = 1.0;
        }
    }

    let features = columns
        .iter()
        .zip(mean.iter().zip(std.iter()))
        .map(|(name, (&mean, &std))| FeatureStats {
            name: name.to_string(),
            mean,
            std,
        })
        .collect();

    let stats = NormalizationStats { features };
    tracing::debug!("Computed normalization stats for {} features", stats.len());
    Ok(stats)
}

/// (v - mean) / std для каждой колонки из `stats`, остальные колонки без изменений
pub fn normalize(features: &Table, stats: &NormalizationStats) -> Result<Table> {
    apply(features, stats, |v, s| (v - s.mean) / s.std)
}

pub fn denormalize(features: &Table, stats: &NormalizationStats) -> Result<Table> {
    apply(features, stats, |v, s| v * s.std + s.mean)
}

fn apply<F>(features: &Table, stats: &NormalizationStats, f: F) -> Result<Table>
where
    F: Fn(f64, &FeatureStats) -> f64,
{
    let mut out = features.clone();
    for feature in stats.features() {
        let column = out
            .column_mut(&feature.name)
            .ok_or_else(|| PrepError::unknown_column(&feature.name))?;
        for value in column.values.iter_mut() {
            *value = value.map(|v| f(v, feature));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn train() -> Table {
        Table::from_columns(vec![
            Column::continuous("x", vec![10.0, 20.0, 30.0]),
            Column::continuous("flag", vec![1.0, 1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn stats_use_population_std() {
        let stats = compute_stats(&train()).unwrap();
        let x = stats.get("x").unwrap();
        assert!((x.mean - 20.0).abs() < 1e-12);
        assert!((x.std - (200.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        // Константная колонка
        assert_eq!(stats.get("flag").unwrap().std, 1.0);
    }

    #[test]
    fn normalize_then_denormalize_round_trips() {
        let table = train();
        let stats = compute_stats(&table).unwrap();
        let normalized = normalize(&table, &stats).unwrap();

        let x: Vec<f64> = normalized.column("x").unwrap().dense().unwrap();
        assert!((x.iter().sum::<f64>()).abs() < 1e-12);
        assert!(x[0] < 0.0 && x[2] > 0.0);

        let restored = denormalize(&normalized, &stats).unwrap();
        for (a, b) in restored
            .column("x")
            .unwrap()
            .dense()
            .unwrap()
            .iter()
            .zip([10.0, 20.0, 30.0])
        {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn columns_outside_stats_pass_through() {
        let table = train();
        let stats = compute_stats_for(&table, &["x"]).unwrap();
        assert_eq!(stats.len(), 1);
        let normalized = normalize(&table, &stats).unwrap();
        assert_eq!(normalized.column("flag"), table.column("flag"));
    }

    #[test]
    fn test_set_uses_train_stats() {
        let stats = compute_stats(&train()).unwrap();
        let test = Table::from_columns(vec![
            Column::continuous("x", vec![20.0]),
            Column::continuous("flag", vec![3.0]),
        ])
        .unwrap();
        let normalized = normalize(&test, &stats).unwrap();
        assert_eq!(normalized.row(0), vec![Some(0.0), Some(2.0)]);
    }

    #[test]
    fn transform_array_matches_table_normalization() {
        let table = train();
        let stats = compute_stats(&table).unwrap();
        let from_array = stats.transform_array(&table.to_array().unwrap()).unwrap();
        let from_table = normalize(&table, &stats).unwrap().to_array().unwrap();
        assert_eq!(from_array, from_table);
        assert!(stats.transform_array(&Array2::zeros((1, 3))).is_err());
    }

    #[test]
    fn empty_or_incomplete_tables_are_rejected() {
        let empty = Table::from_columns(vec![Column::continuous("x", vec![])]).unwrap();
        assert!(matches!(compute_stats(&empty), Err(PrepError::EmptyTable(_))));

        let missing = Table::from_columns(vec![Column::new(
            "x",
            crate::types::ColumnKind::Continuous,
            vec![Some(1.0), None],
        )])
        .unwrap();
        assert!(matches!(
            compute_stats(&missing),
            Err(PrepError::MissingValue { .. })
        ));

        let stats = compute_stats(&train()).unwrap();
        let other = Table::from_columns(vec![Column::continuous("y", vec![1.0])]).unwrap();
        assert!(normalize(&other, &stats).is_err());
    }

    #[test]
    fn table_without_features_is_rejected() {
        let mut labels_only =
            Table::from_columns(vec![Column::continuous("MPG", vec![18.0, 26.0])]).unwrap();
        crate::preprocessing::separate_label(&mut labels_only, "MPG").unwrap();
        assert_eq!(labels_only.n_cols(), 0);

        match compute_stats(&labels_only) {
            Err(PrepError::EmptyTable(message)) => assert!(message.contains("no feature columns")),
            other => panic!("expected empty table error, got {other:?}"),
        }
        assert!(compute_stats_for(&train(), &[]).is_err());
    }
}
