//! One-hot кодирование категориальной колонки

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::types::{Column, ColumnKind, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub code: i64,
    pub label: String,
}

/// Соответствие код -> метка. Порядок вставки определяет порядок новых колонок.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    pub mapping: Vec<CategoryEntry>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub prefix_sep: String,
}

impl OneHotEncoder {
    pub fn new<L: Into<String>>(
        column: impl Into<String>,
        mapping: impl IntoIterator<Item = (i64, L)>,
    ) -> Self {
        Self {
            column: column.into(),
            mapping: mapping
                .into_iter()
                .map(|(code, label)| CategoryEntry {
                    code,
                    label: label.into(),
                })
                .collect(),
            prefix: None,
            prefix_sep: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, sep: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.prefix_sep = sep.into();
        self
    }

    /// Имена новых колонок в порядке mapping
    pub fn output_names(&self) -> Vec<String> {
        self.mapping
            .iter()
            .map(|e| match &self.prefix {
                Some(prefix) => format!("{}{}{}", prefix, self.prefix_sep, e.label),
                None => e.label.clone(),
            })
            .collect()
    }

    fn validate(&self, table: &Table) -> Result<()> {
        let column = table
            .column(&self.column)
            .ok_or_else(|| PrepError::unknown_column(&self.column))?;
        if column.kind != ColumnKind::Categorical {
            return Err(PrepError::config(format!(
                "column '{}' is not categorical",
                self.column
            )));
        }
        if self.mapping.is_empty() {
            return Err(PrepError::config("empty category mapping"));
        }

        let mut codes = HashSet::new();
        for entry in &self.mapping {
            if !codes.insert(entry.code) {
                return Err(PrepError::config(format!(
                    "duplicate category code {}",
                    entry.code
                )));
            }
        }

        let mut names = HashSet::new();
        for name in self.output_names() {
            if !names.insert(name.clone()) {
                return Err(PrepError::config(format!("duplicate category label '{name}'")));
            }
            if name != self.column && table.position(&name).is_some() {
                return Err(PrepError::config(format!(
                    "encoded column '{name}' collides with an existing column"
                )));
            }
        }
        Ok(())
    }

    /// Заменяет исходную колонку набором бинарных колонок, добавленных в конец таблицы.
    /// Пропуск остается пропуском во всех новых колонках.
    pub fn encode(&self, mut table: Table) -> Result<Table> {
        self.validate(&table)?;

        let source = table.drop_column(&self.column)?;
        let unmapped = source
            .values
            .iter()
            .flatten()
            .filter(|v| !self.mapping.iter().any(|e| e.code as f64 == **v))
            .count();
        if unmapped > 0 {
            tracing::warn!(
                "Column '{}': {} values not present in mapping",
                self.column,
                unmapped
            );
        }

        for (entry, name) in self.mapping.iter().zip(self.output_names()) {
            let values = source
                .values
                .iter()
                .map(|v| v.map(|code| if code == entry.code as f64 { 1.0 } else { 0.0 }))
                .collect();
            table.add_column(Column::new(name, ColumnKind::Continuous, values))?;
        }

        tracing::info!(
            "Encoded '{}' into {} columns",
            self.column,
            self.mapping.len()
        );
        Ok(table)
    }
}
