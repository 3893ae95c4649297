//! Статическая конфигурация: банки, столбцы отчета, профиль Ziraat.

use std::sync::OnceLock;

use regex::Regex;

use crate::money::{CurrencyPolicy, PercentStyle};
use crate::rules::{RuleSet, ZIRAAT_RULES};
use crate::tiers::{BandDetection, Case, CellPos, Layout};

/// Отдельный конвейер для банка с нестандартной разметкой.
#[derive(Debug)]
pub struct OverrideProfile {
    pub layout: Layout,
    pub rules: &'static RuleSet,
}

/// Разметка Ziraat: сумма через пустую ячейку после границ диапазона,
/// проценты вида "%  5.25".
pub const ZIRAAT_LAYOUT: Layout = Layout {
    name: "ziraat",
    currency: CurrencyPolicy::Strict,
    case: Case::Sensitive,
    amount_cell: CellPos::Index(2),
    bands: BandDetection::Shaped,
    percent: PercentStyle::Loose,
};

pub static ZIRAAT_OVERRIDE: OverrideProfile = OverrideProfile {
    layout: ZIRAAT_LAYOUT,
    rules: &ZIRAAT_RULES,
};

/// Банк: имя в выгрузке и столбец отчета.
#[derive(Debug)]
pub struct BankProfile {
    /// Полное имя банка, как в списке на сайте.
    pub display_name: &'static str,
    /// Заголовок столбца в отчете.
    pub column_header: &'static str,
    pub override_profile: Option<&'static OverrideProfile>,
}

impl BankProfile {
    const fn new(display_name: &'static str, column_header: &'static str) -> Self {
        BankProfile {
            display_name,
            column_header,
            override_profile: None,
        }
    }

    /// Имя файла выгрузки: `fees_<safe name>.txt`.
    pub fn dump_file_name(&self) -> String {
        format!("fees_{}.txt", safe_name(self.display_name))
    }
}

/// Банки в порядке обработки.
pub static BANKS: [BankProfile; 9] = [
    BankProfile::new("Akbank T.A.Ş.", "AKBANK"),
    BankProfile::new("Türkiye Garanti Bankası A.Ş.", "GARANTI"),
    BankProfile::new("Türkiye İş Bankası A.Ş.", "İŞBANKASI"),
    BankProfile::new("Yapı ve Kredi Bankası A.Ş.", "YKB"),
    BankProfile {
        display_name: "Türkiye Cumhuriyeti Ziraat Bankası A.Ş.",
        column_header: "ZİRAAT",
        override_profile: Some(&ZIRAAT_OVERRIDE),
    },
    BankProfile::new("Türkiye Halk Bankası A.Ş.", "HALKBANK"),
    BankProfile::new("Türkiye Vakıflar Bankası T.A.O.", "VAKIFBANK"),
    BankProfile::new("Denizbank A.Ş.", "DENIZBANK"),
    BankProfile::new("QNB Bank A.Ş.", "FINASNBANK"),
];

/// Заголовки столбцов банков в порядке столбцов отчета.
pub const REPORT_COLUMNS: [&str; 9] = [
    "GARANTI",
    "AKBANK",
    "İŞBANKASI",
    "YKB",
    "ZİRAAT",
    "HALKBANK",
    "VAKIFBANK",
    "DENIZBANK",
    "FINASNBANK",
];

/// Ищет банк по полному имени или заголовку столбца (без учета регистра).
pub fn find_bank(name: &str) -> Option<&'static BankProfile> {
    let name = name.trim().to_lowercase();
    BANKS.iter().find(|bank| {
        bank.display_name.to_lowercase() == name || bank.column_header.to_lowercase() == name
    })
}

/// Заменяет каждую последовательность символов вне `[\w\-.]` на `_`.
pub fn safe_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new(r"[^\w\-.]+").unwrap());
    re.replace_all(name.trim(), "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_file_name() {
        assert_eq!(BANKS[0].dump_file_name(), "fees_Akbank_T.A.Ş..txt");
        assert_eq!(
            BANKS[4].dump_file_name(),
            "fees_Türkiye_Cumhuriyeti_Ziraat_Bankası_A.Ş..txt"
        );
    }

    #[test]
    fn test_every_bank_has_report_column() {
        for bank in &BANKS {
            assert!(REPORT_COLUMNS.contains(&bank.column_header), "{}", bank.display_name);
        }
    }

    #[test]
    fn test_only_ziraat_has_override() {
        let overridden: Vec<_> = BANKS
            .iter()
            .filter(|b| b.override_profile.is_some())
            .map(|b| b.column_header)
            .collect();
        assert_eq!(overridden, vec!["ZİRAAT"]);
    }

    #[test]
    fn test_find_bank() {
        assert_eq!(find_bank("akbank").map(|b| b.column_header), Some("AKBANK"));
        assert_eq!(find_bank("QNB Bank A.Ş.").map(|b| b.column_header), Some("FINASNBANK"));
        assert!(find_bank("Unknown").is_none());
    }
}
