//! Денежные суммы, проценты и нормализация текста выгрузки.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Канонический маркер лиры.
pub const CANONICAL_TRY: &str = "TRY";
/// Синоним маркера лиры, переписывается в [`CANONICAL_TRY`].
pub const SYNONYM_TRY: &str = "TL";

/// Валюта суммы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    /// Турецкая лира (TRY / TL)
    Try,
    /// Доллар США
    Usd,
}

impl Currency {
    /// Канонический маркер валюты.
    pub fn marker(self) -> &'static str {
        match self {
            Currency::Try => CANONICAL_TRY,
            Currency::Usd => "USD",
        }
    }

    /// Распознает маркер валюты без учета регистра, включая синоним TL.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_uppercase().as_str() {
            CANONICAL_TRY | SYNONYM_TRY => Some(Currency::Try),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

/// Какие написания маркера валюты принимаются.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPolicy {
    /// Только TRY/USD в точном написании
    Strict,
    /// TRY, TL и USD без учета регистра
    Tolerant,
}

impl CurrencyPolicy {
    fn money_regex(self) -> &'static Regex {
        static STRICT: OnceLock<Regex> = OnceLock::new();
        static TOLERANT: OnceLock<Regex> = OnceLock::new();
        match self {
            CurrencyPolicy::Strict => STRICT
                .get_or_init(|| Regex::new(r"(\d[\d.,]*)\s*(TRY|USD)\b").unwrap()),
            CurrencyPolicy::Tolerant => TOLERANT
                .get_or_init(|| Regex::new(r"(?i)(\d[\d.,]*)\s*(TRY|TL|USD)\b").unwrap()),
        }
    }

    /// Фрагмент регулярного выражения для маркера лиры.
    pub(crate) fn try_marker_pattern(self) -> &'static str {
        match self {
            CurrencyPolicy::Strict => "TRY",
            CurrencyPolicy::Tolerant => "(?i:TRY|TL)",
        }
    }
}

/// Сумма: числовой текст как в источнике и валюта.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyToken {
    /// Число в написании источника ("6.300,01").
    pub number: String,
    /// Валюта.
    pub currency: Currency,
}

impl MoneyToken {
    /// Разбирает ячейку, целиком состоящую из суммы.
    pub fn parse_cell(cell: &str, policy: CurrencyPolicy) -> Option<Self> {
        let cell = cell.trim();
        let caps = policy.money_regex().captures(cell)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != cell.len() {
            return None;
        }
        Self::from_captures(&caps)
    }

    /// Первая сумма в тексте.
    pub fn find_first(text: &str, policy: CurrencyPolicy) -> Option<Self> {
        policy
            .money_regex()
            .captures(text)
            .and_then(|caps| Self::from_captures(&caps))
    }

    /// Все суммы в тексте в порядке следования.
    pub fn find_all(text: &str, policy: CurrencyPolicy) -> Vec<Self> {
        policy
            .money_regex()
            .captures_iter(text)
            .filter_map(|caps| Self::from_captures(&caps))
            .collect()
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let number = collapse_whitespace(caps.get(1)?.as_str());
        let currency = Currency::from_marker(caps.get(2)?.as_str())?;
        Some(MoneyToken { number, currency })
    }
}

impl fmt::Display for MoneyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency.marker())
    }
}

/// Формат записи процента.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentStyle {
    /// "%5" или "% 5,25"
    Prefix,
    /// "%  5.25" и "5,25 %"
    Loose,
}

/// Первый процент в тексте в виде "%<число>".
pub fn find_percent(text: &str, style: PercentStyle) -> Option<String> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    static LOOSE: OnceLock<Regex> = OnceLock::new();
    let re = match style {
        PercentStyle::Prefix => {
            PREFIX.get_or_init(|| Regex::new(r"% ?(\d+(?:,\d+)?)").unwrap())
        }
        PercentStyle::Loose => LOOSE.get_or_init(|| {
            Regex::new(r"%\s*(\d(?:[\d.,]*\d)?)|(\d(?:[\d.,]*\d)?)\s*%").unwrap()
        }),
    };
    let caps = re.captures(text)?;
    let number = caps.get(1).or_else(|| caps.get(2))?;
    Some(format!("%{}", number.as_str()))
}

// =============================================================================
// Нормализация
// =============================================================================

/// Сжимает любые последовательности пробельных символов до одного пробела
/// и обрезает края.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Нормализует строку выгрузки: неразрывные пробелы, длинные тире,
/// повторные пробелы.
pub fn normalize_text(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| match c {
            '\u{00a0}' => ' ',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    collapse_whitespace(&replaced)
}

/// Нормализует денежный текст: пробелы сжаты, синоним TL переписан в TRY,
/// края обрезаны.
pub fn normalize_money(s: &str) -> String {
    static SYNONYM: OnceLock<Regex> = OnceLock::new();
    let re = SYNONYM.get_or_init(|| Regex::new(r"(?i)\b(?:TRY|TL)\b").unwrap());
    let text = normalize_text(s);
    re.replace_all(&text, CANONICAL_TRY).into_owned()
}
