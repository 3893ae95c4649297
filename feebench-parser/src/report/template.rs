//! Сетка отчета и карты координат.

use std::collections::HashMap;

use crate::config::REPORT_COLUMNS;
use crate::error::{Error, Result};
use crate::types::{FieldKey, SECTIONS};

/// Первый столбец с данными банка.
pub const FIRST_BANK_COLUMN: usize = 2;

/// Сетка отчета. Строка 0 - заголовки: `BENCHMARKING-<год>`, пустая ячейка,
/// затем банки. Далее по строке на каждую подпись поля; метка раздела стоит в
/// столбце 0 первой строки своей группы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate {
    grid: Vec<Vec<String>>,
    columns: HashMap<String, usize>,
    rows: HashMap<String, usize>,
}

impl ReportTemplate {
    /// Сетка со стандартным набором столбцов банков.
    pub fn build(year: i32) -> Result<Self> {
        Self::with_columns(year, &REPORT_COLUMNS)
    }

    pub fn with_columns(year: i32, headers: &[&str]) -> Result<Self> {
        let width = FIRST_BANK_COLUMN + headers.len();
        let mut grid = Vec::with_capacity(FieldKey::COUNT + 1);

        let mut header_row = vec![format!("BENCHMARKING-{year}"), String::new()];
        header_row.extend(headers.iter().map(|h| h.to_string()));
        grid.push(header_row);

        for section in SECTIONS {
            let keys = FieldKey::ALL.into_iter().filter(|k| k.section() == section);
            for (i, key) in keys.enumerate() {
                let mut row = vec![String::new(); width];
                if i == 0 {
                    row[0] = section.to_string();
                }
                row[1] = key.sub_label().to_string();
                grid.push(row);
            }
        }

        Self::from_grid(grid)
    }

    /// Строит карты координат по готовой сетке: столбцы по строке заголовков,
    /// строки по подписи (или по метке раздела, если подписи нет).
    pub fn from_grid(grid: Vec<Vec<String>>) -> Result<Self> {
        let header = grid
            .first()
            .ok_or_else(|| Error::ReportConstruction("пустая сетка".into()))?;

        let mut columns = HashMap::new();
        for (col, name) in header.iter().enumerate().skip(FIRST_BANK_COLUMN) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if columns.insert(name.to_string(), col).is_some() {
                return Err(Error::ReportConstruction(format!(
                    "повторяется заголовок столбца '{name}'"
                )));
            }
        }

        let mut rows = HashMap::new();
        for (r, row) in grid.iter().enumerate().skip(1) {
            let section = row.first().map(|s| s.trim()).unwrap_or_default();
            let sub = row.get(1).map(|s| s.trim()).unwrap_or_default();
            let label = if sub.is_empty() { section } else { sub };
            if label.is_empty() {
                continue;
            }
            if rows.insert(label.to_string(), r).is_some() {
                return Err(Error::ReportConstruction(format!(
                    "повторяется подпись строки '{label}'"
                )));
            }
        }

        Ok(ReportTemplate {
            grid,
            columns,
            rows,
        })
    }

    /// Столбец банка по заголовку.
    pub fn column_of(&self, header: &str) -> Option<usize> {
        self.columns.get(header.trim()).copied()
    }

    /// Столбец банка; отсутствие - [`Error::MissingBankColumn`].
    pub fn column(&self, header: &str) -> Result<usize> {
        self.column_of(header).ok_or_else(|| Error::MissingBankColumn {
            header: header.to_string(),
        })
    }

    /// Строка поля.
    pub fn row_of(&self, key: FieldKey) -> Option<usize> {
        self.rows.get(key.row_label()).copied()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.get(row)?.get(col).map(String::as_str)
    }

    /// Записывает значение в ячейку, дополняя строку пустыми ячейками.
    /// Строки за пределами сетки игнорируются.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        let Some(cells) = self.grid.get_mut(row) else {
            return;
        };
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.into();
    }

    pub fn grid(&self) -> &[Vec<String>] {
        &self.grid
    }
}
