//! Перенос записи банка в столбец отчета.

use crate::error::Error;
use crate::report::ReportTemplate;
use crate::types::{FeeRecord, FieldKey};

/// Записывает все поля записи в столбец `column`, включая пустые.
/// Возвращает поля, для которых в отчете нет строки.
pub fn map_record(
    template: &mut ReportTemplate,
    bank: &str,
    column: usize,
    record: &FeeRecord,
) -> Vec<FieldKey> {
    let mut unmapped = Vec::new();
    for (key, value) in record.iter() {
        match template.row_of(key) {
            Some(row) => template.set(row, column, value),
            None => {
                let err = Error::MissingFieldMapping {
                    field: key,
                    bank: bank.to_string(),
                };
                tracing::warn!("{}", err);
                unmapped.push(key);
            }
        }
    }
    unmapped
}
