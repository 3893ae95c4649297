//! Парсер текстовой выгрузки.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::money::normalize_text;

const BANK_PREFIX: &str = "=== BANK:";
const TAB_PREFIX: &str = "===== TAB:";
const TABLE_PREFIX: &str = "--- TABLE";
const SECTION_PREFIX: &str = "SECTION:";
const SUB_HEADING_PREFIX: &str = "SUB-HEADING:";
const HEADERS_PREFIX: &str = "HEADERS:";
const FALLBACK_NOTE_PREFIX: &str = "(no .card tables found";
const NO_SECTION_TITLE: &str = "(no section title)";
const NO_SUB_HEADING: &str = "(no sub-heading)";

/// Разделитель ячеек в строке таблицы.
pub const CELL_DELIMITER: char = '|';

/// Выгрузка одного банка.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dump {
    /// Имя банка из строки `=== BANK: ... ===`.
    pub bank: Option<String>,
    /// Вкладки в порядке следования.
    pub sections: Vec<Section>,
}

/// Вкладка страницы тарифов.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Заголовок вкладки.
    pub title: String,
    /// Якорь вкладки (`#tab-1`).
    pub anchor: Option<String>,
    /// Блоки таблиц.
    pub blocks: Vec<Block>,
}

/// Группа подряд идущих таблиц с одинаковыми меткой раздела и подзаголовком.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Метка раздела (строка `SECTION:`).
    pub section_label: Option<String>,
    /// Подзаголовок (строка `SUB-HEADING:`).
    pub sub_heading: Option<String>,
    /// Таблицы блока.
    pub tables: Vec<Table>,
}

/// Таблица выгрузки.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Номер таблицы из маркера `--- TABLE n ---`.
    pub number: usize,
    /// Строка заголовков (`HEADERS:`).
    pub headers: Option<Row>,
    /// Строки данных.
    pub rows: Vec<Row>,
}

/// Строка таблицы.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Ячейки, нормализованные и обрезанные.
    pub cells: Vec<String>,
}

impl Row {
    /// Разбирает строку по разделителю ячеек.
    pub fn parse(line: &str) -> Self {
        Row {
            cells: line
                .split(CELL_DELIMITER)
                .map(normalize_text)
                .collect(),
        }
    }

    /// Ячейка по индексу.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Текст строки, ячейки через " | ".
    pub fn text(&self) -> String {
        self.cells.join(" | ")
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(String::is_empty)
    }
}

/// Таблица вместе с блоком и вкладкой, в которых она находится.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    pub section: &'a Section,
    pub block: &'a Block,
    pub table: &'a Table,
}

impl<'a> TableRef<'a> {
    /// Тексты уровня блока, относящиеся ко всей таблице:
    /// метка раздела, подзаголовок, заголовки.
    pub fn context_lines(&self) -> impl Iterator<Item = String> + 'a {
        self.block
            .section_label
            .iter()
            .cloned()
            .chain(self.block.sub_heading.iter().cloned())
            .chain(self.table.headers.iter().map(Row::text))
    }
}

/// Таблица в процессе сборки, до группировки в блоки.
#[derive(Default)]
struct PendingTable {
    section_label: Option<String>,
    sub_heading: Option<String>,
    table: Table,
}

impl Dump {
    /// Парсит выгрузку из любого источника, реализующего трейт Read.
    /// Некорректные последовательности UTF-8 заменяются.
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Читает выгрузку из файла.
    ///
    /// Отсутствующий файл дает [`Error::MissingDumpFile`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::MissingDumpFile {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Self::from_read(&mut file)
    }

    /// Парсит выгрузку из строки. Никогда не завершается ошибкой:
    /// нераспознанные строки вне таблиц пропускаются.
    pub fn parse(content: &str) -> Self {
        let mut dump = Dump::default();
        let mut section: Option<Section> = None;
        let mut pending: Vec<PendingTable> = Vec::new();
        let mut current: Option<PendingTable> = None;

        for raw in content.lines() {
            let line = normalize_text(raw);
            if line.is_empty() || line.starts_with(FALLBACK_NOTE_PREFIX) {
                continue;
            }

            if let Some(rest) = line.strip_prefix(TAB_PREFIX) {
                pending.extend(current.take());
                if let Some(done) = section.take() {
                    dump.sections.push(Self::finish_section(done, &mut pending));
                }
                section = Some(Self::parse_tab_title(rest));
                continue;
            }

            if let Some(rest) = line.strip_prefix(BANK_PREFIX) {
                let name = rest.trim_end_matches('=').trim();
                if !name.is_empty() {
                    dump.bank = Some(name.to_string());
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix(TABLE_PREFIX) {
                pending.extend(current.take());
                let number = rest
                    .trim_end_matches('-')
                    .trim()
                    .parse()
                    .unwrap_or(pending.len() + 1);
                current = Some(PendingTable {
                    table: Table {
                        number,
                        ..Table::default()
                    },
                    ..PendingTable::default()
                });
                continue;
            }

            let Some(table) = current.as_mut() else {
                tracing::trace!("Строка вне таблицы пропущена: {}", line);
                continue;
            };

            if let Some(rest) = line.strip_prefix(SECTION_PREFIX) {
                table.section_label = Self::label(rest, NO_SECTION_TITLE);
            } else if let Some(rest) = line.strip_prefix(SUB_HEADING_PREFIX) {
                table.sub_heading = Self::label(rest, NO_SUB_HEADING);
            } else if let Some(rest) = line.strip_prefix(HEADERS_PREFIX) {
                table.table.headers = Some(Row::parse(rest));
            } else {
                let row = Row::parse(&line);
                if !row.is_blank() {
                    table.table.rows.push(row);
                }
            }
        }

        pending.extend(current.take());
        if section.is_some() || !pending.is_empty() {
            let done = section.unwrap_or_default();
            dump.sections.push(Self::finish_section(done, &mut pending));
        }

        dump
    }

    /// Все таблицы выгрузки в порядке следования.
    pub fn tables(&self) -> impl Iterator<Item = TableRef<'_>> {
        self.sections.iter().flat_map(|section| {
            section.blocks.iter().flat_map(move |block| {
                block.tables.iter().map(move |table| TableRef {
                    section,
                    block,
                    table,
                })
            })
        })
    }

    /// true, если в выгрузке нет ни одной строки данных.
    pub fn is_empty(&self) -> bool {
        self.tables().all(|t| t.table.rows.is_empty())
    }

    fn parse_tab_title(rest: &str) -> Section {
        let rest = rest.trim_end_matches('=').trim();
        match rest.rfind(" (") {
            Some(pos) if rest.ends_with(')') => Section {
                title: rest[..pos].trim().to_string(),
                anchor: Some(rest[pos + 2..rest.len() - 1].to_string()),
                blocks: Vec::new(),
            },
            _ => Section {
                title: rest.to_string(),
                anchor: None,
                blocks: Vec::new(),
            },
        }
    }

    fn label(rest: &str, placeholder: &str) -> Option<String> {
        let rest = rest.trim();
        if rest.is_empty() || rest == placeholder {
            None
        } else {
            Some(rest.to_string())
        }
    }

    fn finish_section(mut section: Section, pending: &mut Vec<PendingTable>) -> Section {
        for item in pending.drain(..) {
            match section.blocks.last_mut() {
                Some(block)
                    if block.section_label == item.section_label
                        && block.sub_heading == item.sub_heading =>
                {
                    block.tables.push(item.table);
                }
                _ => section.blocks.push(Block {
                    section_label: item.section_label,
                    sub_heading: item.sub_heading,
                    tables: vec![item.table],
                }),
            }
        }
        section
    }
}
