//! Модуль разбора текстовой выгрузки тарифов.
//!
//! Выгрузка - один текстовый файл на банк: вкладки, внутри них таблицы,
//! разделенные строками-маркерами, строки таблиц с ячейками через `|`.

pub mod parser;

pub use parser::{Block, Dump, Row, Section, Table, TableRef};
