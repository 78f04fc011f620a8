/// Типы данных: таблица с именованными типизированными колонками

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Continuous,
    /// Небольшое число целочисленных кодов, кандидат на one-hot
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Continuous,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
        }
    }
}

/// Колонка: `None` означает пропущенное значение
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn continuous(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(
            name,
            ColumnKind::Continuous,
            values.into_iter().map(Some).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Значения без пропусков, иначе ошибка
    pub fn dense(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| {
                v.ok_or_else(|| PrepError::MissingValue {
                    column: self.name.clone(),
                })
            })
            .collect()
    }
}

/// Упорядоченный набор колонок одинаковой длины
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    /// Сборка таблицы из строк; длина каждой строки должна совпадать с числом колонок
    pub fn from_rows(specs: &[ColumnSpec], rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let mut columns: Vec<Column> = specs
            .iter()
            .map(|s| Column::new(s.name.clone(), s.kind, Vec::with_capacity(rows.len())))
            .collect();

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != specs.len() {
                return Err(PrepError::config(format!(
                    "row {i} has {} values, expected {}",
                    row.len(),
                    specs.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Self::from_columns(columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.position(&column.name).is_some() {
            return Err(PrepError::config(format!(
                "column '{}' already exists",
                column.name
            )));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PrepError::config(format!(
                "column '{}' has {} values, table has {} rows",
                column.name,
                column.len(),
                self.n_rows
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| PrepError::unknown_column(name))?;
        Ok(self.columns.remove(idx))
    }

    pub fn row(&self, index: usize) -> Vec<Option<f64>> {
        self.columns.iter().map(|c| c.values[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<f64>>> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Оставляет только строки, для которых `keep` вернул true.
    /// Возвращает число удаленных строк.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Option<f64>]) -> bool,
    {
        let mask: Vec<bool> = self.rows().map(|row| keep(&row)).collect();
        for column in &mut self.columns {
            let mut flags = mask.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&false));
        }
        let kept = mask.iter().filter(|k| **k).count();
        let removed = self.n_rows - kept;
        self.n_rows = kept;
        removed
    }

    /// Новая таблица из строк с указанными индексами (в их порядке)
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(PrepError::config(format!(
                "row index {bad} out of range for {} rows",
                self.n_rows
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    c.kind,
                    indices.iter().map(|&i| c.values[i]).collect(),
                )
            })
            .collect();
        Ok(Table {
            columns,
            n_rows: indices.len(),
        })
    }

    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| PrepError::unknown_column(name))
            })
            .collect::<Result<Vec<_>>>()?;
        Table::from_columns(columns)
    }

    /// Плотная матрица (строки x колонки) для передачи в модели
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let mut array = Array2::zeros((self.n_rows, self.columns.len()));
        for (j, column) in self.columns.iter().enumerate() {
            for (i, value) in column.dense()?.into_iter().enumerate() {
                array[[i, j]] = value;
            }
        }
        Ok(array)
    }

    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.missing_count()))
            .collect()
    }

    /// Описательная статистика по колонкам (пропуски игнорируются)
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns.iter().map(ColumnSummary::from_column).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Выборочное отклонение (n - 1)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn from_column(column: &Column) -> Self {
        let mut values: Vec<f64> = column.values.iter().flatten().copied().collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            name: column.name.clone(),
            count,
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

// Линейная интерполяция между соседними элементами отсортированного массива
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
