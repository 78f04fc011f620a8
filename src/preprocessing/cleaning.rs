//! Очистка: удаление строк с пропусками

use crate::types::Table;

/// Удаляет каждую строку, в которой есть хотя бы один пропуск. Без импутации.
pub fn drop_missing(mut table: Table) -> Table {
    for (name, count) in table.missing_counts() {
        if count > 0 {
            tracing::debug!("Column '{}': {} missing values", name, count);
        }
    }

    let removed = table.retain_rows(|row| row.iter().all(Option::is_some));
    tracing::info!(
        "Dropped {} rows with missing values, {} remain",
        removed,
        table.n_rows()
    );
    table
}
