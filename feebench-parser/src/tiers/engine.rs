//! Вычисление правил над выгрузкой: поиск якоря и разбор формы значения.

use std::sync::OnceLock;

use regex::Regex;

use crate::dump::{Dump, Row, TableRef};
use crate::error::{Extracted, Miss};
use crate::money::{find_percent, normalize_money, CurrencyPolicy, MoneyToken};
use crate::rules::{
    AnchorKind, FieldRule, PairStyle, RuleSet, ValueShape, CHANNELS, MAX_COLUMN, MIN_COLUMN,
};
use crate::tiers::{BandDetection, Case, Layout};
use crate::types::{FeeRecord, FieldKey};

/// Разделитель ценовых диапазонов и пар границ.
pub const BAND_SEPARATOR: &str = " - ";
/// Разделитель подписанных частей поля.
pub const PART_SEPARATOR: &str = "; ";
/// Разделитель списка сумм одной строки.
pub const LIST_SEPARATOR: &str = " / ";

/// Найденный якорь: таблица, строка и ячейка, с которой начинается значение.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hit<'a> {
    pub table: TableRef<'a>,
    /// Строка заголовка/канала; None, если заголовок найден на уровне блока.
    pub row: Option<usize>,
    /// Первая ячейка после заголовка или канала.
    pub cell: usize,
    pub heading: &'a str,
    pub channel: Option<&'a str>,
}

impl<'a> Hit<'a> {
    pub(crate) fn rows(&self) -> &'a [Row] {
        &self.table.table.rows
    }

    /// Строки после строки якоря (все строки, если якорь на уровне блока).
    fn following(&self) -> &'a [Row] {
        match self.row {
            Some(i) => &self.rows()[i + 1..],
            None => self.rows(),
        }
    }

    /// Ячейки строки якоря после заголовка/канала.
    fn anchor_cells(&self) -> &'a [String] {
        match self.row {
            Some(i) => {
                let cells = &self.rows()[i].cells;
                &cells[self.cell.min(cells.len())..]
            }
            None => &[],
        }
    }
}

/// Индексы колонок "Asgari Tutar" и "Azami Tutar".
#[derive(Debug, Clone, Copy)]
struct BoundColumns {
    min: usize,
    max: usize,
    /// Строка таблицы с заголовками колонок; None для строки HEADERS.
    header_row: Option<usize>,
}

/// Вычислитель правил под заданную разметку.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    layout: Layout,
}

impl Extractor {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Вычисляет каждое поле набора правил.
    pub fn record(&self, dump: &Dump, rules: &RuleSet, kind: AnchorKind) -> FeeRecord {
        self.record_for(dump, rules, kind, FieldKey::ALL)
    }

    /// Вычисляет только перечисленные поля; остальные остаются пустыми.
    pub fn record_for(
        &self,
        dump: &Dump,
        rules: &RuleSet,
        kind: AnchorKind,
        keys: impl IntoIterator<Item = FieldKey>,
    ) -> FeeRecord {
        keys.into_iter()
            .map(|key| (key, self.field(dump, rules, key, kind)))
            .collect()
    }

    /// Значение поля: подписанные части соединяются через "; ",
    /// пустые части пропускаются.
    pub fn field(&self, dump: &Dump, rules: &RuleSet, key: FieldKey, kind: AnchorKind) -> String {
        let parts: Vec<String> = rules
            .rules_for(key)
            .filter_map(|rule| match self.evaluate(dump, rule, kind) {
                Ok(value) => Some(Self::decorate(rule, value)),
                Err(miss) => {
                    tracing::trace!("{} [{}]: {}", key, self.layout.name, miss);
                    None
                }
            })
            .collect();
        parts.join(PART_SEPARATOR)
    }

    fn decorate(rule: &FieldRule, value: String) -> String {
        let value = match rule.note {
            Some(note) => format!("{value} {note}"),
            None => value,
        };
        match rule.label {
            Some(label) => format!("{label}: {value}"),
            None => value,
        }
    }

    /// Перебирает варианты заголовка и канала якоря; первый непустой результат
    /// выигрывает.
    pub fn evaluate(&self, dump: &Dump, rule: &FieldRule, kind: AnchorKind) -> Extracted {
        let anchor = rule.anchor(kind);
        let mut last = Miss::MissingHeading;
        let channels: Vec<Option<&str>> = if anchor.channels.is_empty() {
            vec![None]
        } else {
            anchor.channels.iter().copied().map(Some).collect()
        };

        for heading in anchor.headings {
            for channel in &channels {
                let result = self
                    .locate(dump, heading, *channel)
                    .and_then(|hit| self.shape(&hit, rule));
                match result {
                    Ok(value) if !value.is_empty() => return Ok(value),
                    Ok(_) => last = Miss::MalformedAmount,
                    Err(miss) => last = Self::deeper(last, miss),
                }
            }
        }
        Err(last)
    }

    /// Из двух промахов оставляет тот, что случился ближе к значению.
    fn deeper(a: Miss, b: Miss) -> Miss {
        fn depth(m: Miss) -> u8 {
            match m {
                Miss::MissingHeading => 0,
                Miss::UnmatchedChannel => 1,
                Miss::MalformedAmount => 2,
            }
        }
        if depth(b) >= depth(a) {
            b
        } else {
            a
        }
    }

    // -------------------------------------------------------------------------
    // Поиск якоря
    // -------------------------------------------------------------------------

    /// Находит первое в порядке документа вхождение заголовка, в таблице
    /// которого есть строка с каналом. Поиск никогда не выходит за таблицу.
    pub(crate) fn locate<'a>(
        &self,
        dump: &'a Dump,
        heading: &'a str,
        channel: Option<&'a str>,
    ) -> Result<Hit<'a>, Miss> {
        let case = self.layout.case;
        let mut heading_seen = false;

        for table in dump.tables() {
            let Some((row, cell)) = Self::heading_position(&table, heading, case) else {
                continue;
            };
            heading_seen = true;

            let Some(channel) = channel else {
                return Ok(Hit {
                    table,
                    row,
                    cell,
                    heading,
                    channel: None,
                });
            };

            let found = table
                .table
                .rows
                .iter()
                .enumerate()
                .skip(row.unwrap_or(0))
                .find_map(|(i, r)| find_channel(r, channel, case).map(|after| (i, after)));

            if let Some((i, after)) = found {
                return Ok(Hit {
                    table,
                    row: Some(i),
                    cell: after,
                    heading,
                    channel: Some(channel),
                });
            }
        }

        Err(if heading_seen {
            Miss::UnmatchedChannel
        } else {
            Miss::MissingHeading
        })
    }

    fn heading_position(
        table: &TableRef<'_>,
        heading: &str,
        case: Case,
    ) -> Option<(Option<usize>, usize)> {
        if table.context_lines().any(|line| case.contains(&line, heading)) {
            return Some((None, 0));
        }
        table.table.rows.iter().enumerate().find_map(|(i, row)| {
            row.cells
                .iter()
                .position(|c| case.contains(c, heading))
                .map(|pos| (Some(i), pos + 1))
        })
    }

    // -------------------------------------------------------------------------
    // Формы значений
    // -------------------------------------------------------------------------

    pub(crate) fn shape(&self, hit: &Hit<'_>, rule: &FieldRule) -> Extracted {
        match rule.shape {
            ValueShape::SingleAmount => self.single_amount(hit),
            ValueShape::AmountList => self.amount_list(hit),
            ValueShape::Percentage => self.percentage(hit),
            ValueShape::MinMax => self.min_max(hit, rule.pair),
            ValueShape::PercentBounds => self.percent_bounds(hit),
            ValueShape::Tiered => self.tiered(hit),
            ValueShape::FeeCell => self.fee_cell(hit),
            ValueShape::OpenBracketFee => self.open_bracket_fee(hit),
        }
    }

    /// Тексты от якоря до конца таблицы: остаток строки якоря, затем строки.
    fn tail_texts<'a>(&self, hit: &Hit<'a>) -> impl Iterator<Item = String> + 'a {
        std::iter::once(hit.anchor_cells().join(" | "))
            .chain(hit.following().iter().map(Row::text))
    }

    fn single_amount(&self, hit: &Hit<'_>) -> Extracted {
        let policy = self.layout.currency;
        self.tail_texts(hit)
            .find_map(|text| MoneyToken::find_first(&text, policy))
            .map(|token| token.to_string())
            .ok_or(Miss::MalformedAmount)
    }

    fn amount_list(&self, hit: &Hit<'_>) -> Extracted {
        let policy = self.layout.currency;
        let tokens = self
            .tail_texts(hit)
            .map(|text| MoneyToken::find_all(&text, policy))
            .find(|tokens| !tokens.is_empty())
            .ok_or(Miss::MalformedAmount)?;
        Ok(tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR))
    }

    fn percentage(&self, hit: &Hit<'_>) -> Extracted {
        self.tail_texts(hit)
            .find_map(|text| find_percent(&text, self.layout.percent))
            .ok_or(Miss::MalformedAmount)
    }

    fn min_max(&self, hit: &Hit<'_>, pair: PairStyle) -> Extracted {
        let (min, max) = self.bounds(hit)?;
        let value = pair.join(&min, &max);
        if value.is_empty() {
            Err(Miss::MalformedAmount)
        } else {
            Ok(value)
        }
    }

    fn percent_bounds(&self, hit: &Hit<'_>) -> Extracted {
        let (index, from) = self.value_row(hit, |_, row| {
            let text = row.text();
            find_percent(&text, self.layout.percent).is_some()
                || MoneyToken::find_first(&text, self.layout.currency).is_some()
        })?;
        let value_text = hit.rows()[index].cells[from..].join(" | ");
        let percent = find_percent(&value_text, self.layout.percent);
        let (min, max) = self.bounds(hit).unwrap_or_default();

        let mut parts = Vec::new();
        if let Some(percent) = percent {
            parts.push(percent);
        }
        if !min.is_empty() {
            parts.push(format!("{MIN_COLUMN}: {min}"));
        }
        if !max.is_empty() {
            parts.push(format!("{MAX_COLUMN}: {max}"));
        }
        if parts.is_empty() {
            Err(Miss::MalformedAmount)
        } else {
            Ok(parts.join(" "))
        }
    }

    /// Ячейка тарифа считается от ячейки канала (или заголовка).
    fn fee_cell(&self, hit: &Hit<'_>) -> Extracted {
        let row = hit.row.map(|i| &hit.rows()[i]).ok_or(Miss::MalformedAmount)?;
        let width = hit.channel.map_or(1, |c| c.split(" | ").count());
        let start = hit.cell.saturating_sub(width).min(row.cells.len());
        let value = self
            .layout
            .amount_cell
            .pick(&row.cells[start..])
            .map(normalize_money)
            .unwrap_or_default();
        if value.is_empty() {
            Err(Miss::MalformedAmount)
        } else {
            Ok(value)
        }
    }

    /// Сумма после открытого диапазона ("1 TRY - |  | 2,50 TRY"): позиция
    /// ячейки суммы считается от ячейки диапазона.
    fn open_bracket_fee(&self, hit: &Hit<'_>) -> Extracted {
        let policy = self.layout.currency;
        std::iter::once(hit.anchor_cells())
            .chain(hit.following().iter().map(|row| row.cells.as_slice()))
            .find_map(|cells| {
                let start = cells.iter().position(|c| {
                    c.ends_with('-') && MoneyToken::find_first(c, policy).is_some()
                })?;
                let cell = self.layout.amount_cell.pick(&cells[start..])?;
                MoneyToken::find_first(cell, policy)
            })
            .map(|token| token.to_string())
            .ok_or(Miss::MalformedAmount)
    }

    /// Нижняя и верхняя граница строки значения. Колонки берутся из строки
    /// заголовков ("Asgari Tutar" / "Azami Tutar"), иначе - первые две суммы.
    fn bounds(&self, hit: &Hit<'_>) -> Result<(String, String), Miss> {
        let policy = self.layout.currency;
        let columns = self.bound_columns(hit);
        let header_row = columns.and_then(|c| c.header_row);
        let (index, from) = self.value_row(hit, |i, row| {
            Some(i) != header_row && MoneyToken::find_first(&row.text(), policy).is_some()
        })?;
        let row = &hit.rows()[index];

        if let Some(columns) = columns {
            let at = |col: usize| {
                row.cell(col)
                    .and_then(|c| MoneyToken::find_first(c, policy))
                    .map(|t| t.to_string())
                    .unwrap_or_default()
            };
            let (min, max) = (at(columns.min), at(columns.max));
            if !min.is_empty() || !max.is_empty() {
                return Ok((min, max));
            }
        }

        let mut tokens = MoneyToken::find_all(&row.cells[from..].join(" | "), policy)
            .into_iter()
            .map(|t| t.to_string());
        Ok((
            tokens.next().unwrap_or_default(),
            tokens.next().unwrap_or_default(),
        ))
    }

    /// Колонки границ из строки HEADERS или из строки таблицы не ниже якоря.
    fn bound_columns(&self, hit: &Hit<'_>) -> Option<BoundColumns> {
        let case = self.layout.case;
        let columns = |row: &Row, header_row: Option<usize>| {
            let min = row.cells.iter().position(|c| case.names(c, MIN_COLUMN))?;
            let max = row.cells.iter().position(|c| case.names(c, MAX_COLUMN))?;
            Some(BoundColumns { min, max, header_row })
        };

        if let Some(found) = hit.table.table.headers.as_ref().and_then(|h| columns(h, None)) {
            return Some(found);
        }
        let until = hit.row.map_or(hit.rows().len(), |i| i + 1);
        hit.rows()[..until]
            .iter()
            .enumerate()
            .find_map(|(i, row)| columns(row, Some(i)))
    }

    /// Строка значения: строка канала, если он задан, иначе первая строка
    /// от якоря, удовлетворяющая условию. Возвращает индекс строки и первую
    /// ячейку значения.
    fn value_row(
        &self,
        hit: &Hit<'_>,
        accept: impl Fn(usize, &Row) -> bool,
    ) -> Result<(usize, usize), Miss> {
        let rows = hit.rows();
        if let (Some(i), Some(_)) = (hit.row, hit.channel) {
            return Ok((i, hit.cell.min(rows[i].cells.len())));
        }
        rows.iter()
            .enumerate()
            .skip(hit.row.unwrap_or(0))
            .find(|(i, row)| accept(*i, row))
            .map(|(i, row)| {
                let from = if Some(i) == hit.row {
                    hit.cell.min(row.cells.len())
                } else {
                    0
                };
                (i, from)
            })
            .ok_or(Miss::MalformedAmount)
    }

    // -------------------------------------------------------------------------
    // Ценовые диапазоны
    // -------------------------------------------------------------------------

    fn tiered(&self, hit: &Hit<'_>) -> Extracted {
        let policy = self.layout.currency;
        let (brackets, stop_at_sibling) = match self.layout.bands {
            BandDetection::Lexical => (lexical_brackets(policy), false),
            BandDetection::Shaped => (shaped_brackets(policy), true),
        };
        let mut views = Vec::new();
        if !hit.anchor_cells().is_empty() {
            views.push(hit.anchor_cells());
        }
        views.extend(band_views(hit, self.layout.case, stop_at_sibling));

        let mut cursor = 0;
        let mut parts = Vec::new();
        for bracket in brackets {
            let Some(offset) = views[cursor..]
                .iter()
                .position(|view| view.first().is_some_and(|c| bracket.is_match(c)))
            else {
                continue;
            };
            let view = views[cursor + offset];
            cursor += offset + 1;
            match self
                .layout
                .amount_cell
                .pick(view)
                .and_then(|cell| MoneyToken::parse_cell(cell, policy))
            {
                Some(token) => parts.push(token.to_string()),
                None => tracing::trace!("Диапазон без суммы: {}", view.join(" | ")),
            }
        }

        if parts.is_empty() {
            Err(Miss::MalformedAmount)
        } else {
            Ok(parts.join(BAND_SEPARATOR))
        }
    }
}

/// Строки таблицы после строки якоря, относящиеся к тому же каналу.
///
/// Без `stop_at_sibling` строка, повторяющая заголовок и тот же канал,
/// продолжает диапазоны ячейками после канала; повтор заголовка с другим
/// каналом завершает просмотр. При `stop_at_sibling` просмотр завершает любой
/// повтор заголовка и строка, вторая ячейка которой называет другой
/// распознаваемый канал.
pub(crate) fn band_views<'a>(
    hit: &Hit<'a>,
    case: Case,
    stop_at_sibling: bool,
) -> Vec<&'a [String]> {
    let matched = hit.channel.map(|c| c.rsplit(" | ").next().unwrap_or(c));
    let mut views = Vec::new();
    for row in hit.following() {
        if row.cells.iter().any(|c| case.contains(c, hit.heading)) {
            let repeated = hit
                .channel
                .filter(|_| !stop_at_sibling)
                .and_then(|channel| find_channel(row, channel, case));
            match repeated {
                Some(after) => {
                    views.push(&row.cells[after..]);
                    continue;
                }
                None => break,
            }
        }
        if stop_at_sibling && names_other_channel(row, matched, case) {
            break;
        }
        views.push(row.cells.as_slice());
    }
    views
}

fn names_other_channel(row: &Row, matched: Option<&str>, case: Case) -> bool {
    let Some(second) = row.cell(1) else {
        return false;
    };
    let same = matched.is_some_and(|m| case.names(second, m));
    !same && CHANNELS.iter().any(|ch| Case::Insensitive.names(second, ch))
}

/// Возвращает индекс ячейки после канала. Канал-путь "A | B" требует
/// соседних ячеек A и B.
pub(crate) fn find_channel(row: &Row, channel: &str, case: Case) -> Option<usize> {
    let parts: Vec<&str> = channel.split(" | ").collect();
    (0..row.cells.len()).find_map(|start| {
        let window = row.cells.get(start..start + parts.len())?;
        window
            .iter()
            .zip(&parts)
            .all(|(cell, part)| case.names(cell, part))
            .then_some(start + parts.len())
    })
}

fn lexical_brackets(policy: CurrencyPolicy) -> &'static [Regex; 3] {
    static STRICT: OnceLock<[Regex; 3]> = OnceLock::new();
    static TOLERANT: OnceLock<[Regex; 3]> = OnceLock::new();
    let build = || {
        let c = policy.try_marker_pattern();
        [
            format!(r"^1\s*{c}\s*-\s*6\.?300\s*{c}"),
            format!(r"^6\.?300,?01\s*{c}\s*-\s*304\.?800\s*{c}"),
            format!(r"^304\.?800,?01\s*{c}"),
        ]
        .map(|p| Regex::new(&p).unwrap())
    };
    match policy {
        CurrencyPolicy::Strict => STRICT.get_or_init(build),
        CurrencyPolicy::Tolerant => TOLERANT.get_or_init(build),
    }
}

fn shaped_brackets(policy: CurrencyPolicy) -> &'static [Regex; 3] {
    static STRICT: OnceLock<[Regex; 3]> = OnceLock::new();
    static TOLERANT: OnceLock<[Regex; 3]> = OnceLock::new();
    let build = || {
        let c = policy.try_marker_pattern();
        [
            format!(r"^1\s*{c}\s*-\s*[\d.,]+\s*{c}$"),
            format!(r"^[\d.,]+,01\s*{c}\s*-\s*[\d.,]+\s*{c}$"),
            format!(r"^[\d.,]+,01\s*{c}\s*-?$"),
        ]
        .map(|p| Regex::new(&p).unwrap())
    };
    match policy {
        CurrencyPolicy::Strict => STRICT.get_or_init(build),
        CurrencyPolicy::Tolerant => TOLERANT.get_or_init(build),
    }
}
