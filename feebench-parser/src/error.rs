//! Модуль обработки ошибок библиотеки.
//!
//! Ошибки делятся на два уровня. [`Error`] описывает отказы уровня банка или
//! прогона (нет файла выгрузки, нет координаты в отчете, не удалось построить
//! сетку отчета). [`Miss`] описывает промах при извлечении отдельного поля:
//! он никогда не выходит за пределы своего яруса и превращается в пустую строку.

use std::path::PathBuf;

use crate::types::FieldKey;

/// Основной тип ошибки библиотеки.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Ошибка ввода/вывода
    #[error("Ошибка ввода/вывода: {0}")]
    Io(#[from] std::io::Error),

    /// Файл выгрузки банка отсутствует
    #[error("Файл выгрузки не найден: {}", path.display())]
    MissingDumpFile { path: PathBuf },

    /// Для поля нет строки/столбца в отчете
    #[error("Нет координаты в отчете для поля '{field}' (банк: {bank})")]
    MissingFieldMapping { field: FieldKey, bank: String },

    /// Заголовок банка отсутствует в первой строке отчета
    #[error("Столбец '{header}' не найден в отчете")]
    MissingBankColumn { header: String },

    /// Не удалось построить сетку отчета (фатально)
    #[error("Не удалось построить отчет: {0}")]
    ReportConstruction(String),

    /// Ошибка записи CSV
    #[error("Ошибка записи CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// true, если ошибка прерывает весь прогон, а не только один банк.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ReportConstruction(_) | Error::Csv(_))
    }
}

/// Тип Result с ошибкой библиотеки.
pub type Result<T> = std::result::Result<T, Error>;

/// Промах при извлечении одного поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Miss {
    /// Якорный заголовок не найден
    #[error("заголовок не найден")]
    MissingHeading,
    /// В области заголовка нет строки с нужным каналом
    #[error("канал не найден в области заголовка")]
    UnmatchedChannel,
    /// Найденный текст не разбирается как сумма/процент
    #[error("значение не разбирается")]
    MalformedAmount,
}

/// Результат вычисления одного правила.
pub type Extracted = std::result::Result<String, Miss>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_report_errors_are_fatal() {
        assert!(Error::ReportConstruction("пустая сетка".into()).is_fatal());
        assert!(!Error::MissingDumpFile { path: PathBuf::from("fees_x.txt") }.is_fatal());
        assert!(!Error::MissingBankColumn { header: "AKBANK".into() }.is_fatal());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io).is_fatal());
    }

    #[test]
    fn test_miss_messages() {
        assert_ne!(Miss::MissingHeading.to_string(), Miss::MalformedAmount.to_string());
    }
}
