//! Разделение на train/test и отделение целевой переменной

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PrepError, Result};
use crate::types::Table;

/// Случайная выборка `round(fraction * n)` строк без возвращения в train,
/// остальные строки (в исходном порядке) в test. Входная таблица не меняется.
pub fn train_test_split(table: &Table, fraction: f64, seed: u64) -> Result<(Table, Table)> {
    let mut rng = StdRng::seed_from_u64(seed);
    train_test_split_with_rng(table, fraction, &mut rng)
}

pub fn train_test_split_with_rng<R: Rng + ?Sized>(
    table: &Table,
    fraction: f64,
    rng: &mut R,
) -> Result<(Table, Table)> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(PrepError::config(format!(
            "train fraction must be in (0, 1), got {fraction}"
        )));
    }

    let n = table.n_rows();
    let n_train = (fraction * n as f64).round() as usize;

    let train_idx = rand::seq::index::sample(rng, n, n_train).into_vec();
    let mut in_train = vec![false; n];
    for &i in &train_idx {
        in_train[i] = true;
    }
    let test_idx: Vec<usize> = (0..n).filter(|&i| !in_train[i]).collect();

    let train = table.take_rows(&train_idx)?;
    let test = table.take_rows(&test_idx)?;
    tracing::info!("Split {} rows into {} train / {} test", n, train.n_rows(), test.n_rows());
    Ok((train, test))
}

/// Удаляет колонку метки из таблицы и возвращает её значения.
/// Вызывать после разделения, иначе метка попадет в статистику признаков.
pub fn separate_label(table: &mut Table, label: &str) -> Result<Array1<f64>> {
    let column = table
        .column(label)
        .ok_or_else(|| PrepError::unknown_column(label))?;
    let values = column.dense()?;
    table.drop_column(label)?;
    Ok(Array1::from(values))
}
