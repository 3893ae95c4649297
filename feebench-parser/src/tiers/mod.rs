//! Каскад ярусов извлечения.
//!
//! Каждый ярус - чистая функция над неизменяемой выгрузкой, возвращающая
//! частичную запись тарифов. Ярусы отличаются только параметрами разметки
//! ([`Layout`]), набором якорей и способом поиска ценовых диапазонов.

pub mod bank_override;
pub mod engine;
pub mod generic;
pub mod strict;
pub mod tolerant;

pub use engine::Extractor;

use std::borrow::Cow;

use crate::money::{CurrencyPolicy, PercentStyle};

/// Режим сравнения текста заголовков и каналов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

impl Case {
    /// true, если `haystack` содержит `needle`.
    pub fn contains(self, haystack: &str, needle: &str) -> bool {
        match self {
            Case::Sensitive => haystack.contains(needle),
            Case::Insensitive => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    /// true, если ячейка называет метку: совпадает с ней или начинается с нее
    /// целым словом.
    pub fn names(self, cell: &str, label: &str) -> bool {
        let (cell, label): (Cow<'_, str>, Cow<'_, str>) = match self {
            Case::Sensitive => (cell.into(), label.into()),
            Case::Insensitive => (cell.to_lowercase().into(), label.to_lowercase().into()),
        };
        match cell.strip_prefix(label.as_ref()) {
            Some(rest) => rest.is_empty() || rest.starts_with(' '),
            None => false,
        }
    }
}

/// Позиция ячейки с суммой.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPos {
    /// Последняя ячейка строки
    Last,
    /// Ячейка с фиксированным индексом
    Index(usize),
}

impl CellPos {
    /// Ячейка в этой позиции.
    pub fn pick(self, cells: &[String]) -> Option<&str> {
        match self {
            CellPos::Last => cells.last(),
            CellPos::Index(i) => cells.get(i),
        }
        .map(String::as_str)
    }
}

/// Способ распознавания строк ценовых диапазонов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandDetection {
    /// Фиксированные границы: 1-6.300, 6.300,01-304.800, от 304.800,01
    Lexical,
    /// Форма границ без конкретных чисел: "1 TRY - N TRY", "N,01 TRY - M TRY",
    /// "N,01 TRY -"; поиск останавливается на соседнем канале
    Shaped,
}

/// Параметры разметки, под которые настроен ярус.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub name: &'static str,
    pub currency: CurrencyPolicy,
    pub case: Case,
    pub amount_cell: CellPos,
    pub bands: BandDetection,
    pub percent: PercentStyle,
}

impl Layout {
    /// Разметка строгого яруса.
    pub const STRICT: Layout = Layout {
        name: "strict",
        currency: CurrencyPolicy::Strict,
        case: Case::Sensitive,
        amount_cell: CellPos::Last,
        bands: BandDetection::Lexical,
        percent: PercentStyle::Prefix,
    };

    /// Разметка терпимого яруса.
    pub const TOLERANT: Layout = Layout {
        name: "tolerant",
        currency: CurrencyPolicy::Tolerant,
        case: Case::Insensitive,
        amount_cell: CellPos::Last,
        bands: BandDetection::Lexical,
        percent: PercentStyle::Prefix,
    };
}
