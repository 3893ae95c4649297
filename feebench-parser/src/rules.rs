//! Декларативные правила извлечения полей.
//!
//! Каждое правило задает поле, форму значения и якоря: заголовки и каналы,
//! перебираемые по порядку. Новые варианты разметки добавляются правкой этих
//! таблиц, а не кода ярусов.

use crate::types::FieldKey;

/// Версия набора правил. Увеличивается при любом изменении таблиц.
pub const RULESET_VERSION: u32 = 1;

/// Каналы обслуживания, распознаваемые как начало соседней подтаблицы.
pub const CHANNELS: &[&str] = &[
    "Şube",
    "ATM",
    "İnternet",
    "Internet",
    "Mobil Kanal",
    "Mobil",
    "Çağrı Merkezi",
    "Dijital Kanallar",
    "Dijital",
];

/// Заголовки колонок нижней и верхней границы.
pub const MIN_COLUMN: &str = "Asgari Tutar";
pub const MAX_COLUMN: &str = "Azami Tutar";

// =============================================================================
// Структуры правил
// =============================================================================

/// Форма значения поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Одна сумма: "5 TRY"
    SingleAmount,
    /// Все суммы строки через " / "
    AmountList,
    /// Процент: "%0,5"
    Percentage,
    /// Нижняя и верхняя граница: "1 TRY - 100 TRY"
    MinMax,
    /// Процент с границами: "%0,2 Asgari Tutar: 10 TRY Azami Tutar: 250 TRY"
    PercentBounds,
    /// Три ценовых диапазона по объему операции: "5 TRY - 10 TRY - 15 TRY"
    Tiered,
    /// Текст ячейки тарифа целиком
    FeeCell,
    /// Сумма на позиции ячейки суммы от открытого диапазона "1 TRY -"
    OpenBracketFee,
}

/// Запись пары границ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStyle {
    /// "1 TRY - 5 TRY"
    Spaced,
    /// "8 USD–45 USD"
    Tight,
    /// "Asgari 5 TRY | Azami 50 TRY"
    Labeled,
}

impl PairStyle {
    /// Соединяет границы; отсутствующая граница пропускается вместе с
    /// разделителем.
    pub fn join(self, min: &str, max: &str) -> String {
        match self {
            PairStyle::Spaced => join_present(&[min, max], " - "),
            PairStyle::Tight => join_present(&[min, max], "\u{2013}"),
            PairStyle::Labeled => {
                let labeled = |label: &str, value: &str| {
                    if value.is_empty() {
                        String::new()
                    } else {
                        format!("{label} {value}")
                    }
                };
                join_present(&[&labeled("Asgari", min), &labeled("Azami", max)], " | ")
            }
        }
    }
}

fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Якорь: варианты заголовка и варианты канала, перебираемые по порядку.
///
/// Канал может быть путем из соседних ячеек через " | "
/// ("Hesaptan - Hesaba | İnternet").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub headings: &'static [&'static str],
    pub channels: &'static [&'static str],
}

impl Anchor {
    /// Пустой якорь.
    pub const NONE: Anchor = Anchor {
        headings: &[],
        channels: &[],
    };

    pub const fn new(headings: &'static [&'static str], channels: &'static [&'static str]) -> Self {
        Anchor { headings, channels }
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}

/// Какой из якорей правила использует ярус.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Strict,
    Tolerant,
    Generic,
}

/// Правило извлечения одного поля (или одной подписанной части поля).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub key: FieldKey,
    pub shape: ValueShape,
    pub strict: Anchor,
    pub tolerant: Anchor,
    pub generic: Anchor,
    /// Подпись части значения ("WU"); части поля соединяются через "; ".
    pub label: Option<&'static str>,
    /// Фиксированное примечание после значения.
    pub note: Option<&'static str>,
    /// Запись пары границ для `MinMax`.
    pub pair: PairStyle,
}

impl FieldRule {
    pub const fn new(
        key: FieldKey,
        shape: ValueShape,
        headings: &'static [&'static str],
        channels: &'static [&'static str],
    ) -> Self {
        FieldRule {
            key,
            shape,
            strict: Anchor::new(headings, channels),
            tolerant: Anchor::NONE,
            generic: Anchor::NONE,
            label: None,
            note: None,
            pair: PairStyle::Spaced,
        }
    }

    pub const fn or_tolerant(
        self,
        headings: &'static [&'static str],
        channels: &'static [&'static str],
    ) -> Self {
        FieldRule {
            tolerant: Anchor::new(headings, channels),
            ..self
        }
    }

    pub const fn or_generic(
        self,
        headings: &'static [&'static str],
        channels: &'static [&'static str],
    ) -> Self {
        FieldRule {
            generic: Anchor::new(headings, channels),
            ..self
        }
    }

    pub const fn labeled(self, label: &'static str) -> Self {
        FieldRule {
            label: Some(label),
            ..self
        }
    }

    pub const fn paired(self, pair: PairStyle) -> Self {
        FieldRule { pair, ..self }
    }

    pub const fn with_note(self, note: &'static str) -> Self {
        FieldRule {
            note: Some(note),
            ..self
        }
    }

    /// Якорь для яруса. Незаданный якорь заменяется предыдущим по строгости.
    pub fn anchor(&self, kind: AnchorKind) -> &Anchor {
        match kind {
            AnchorKind::Strict => &self.strict,
            AnchorKind::Tolerant if !self.tolerant.is_empty() => &self.tolerant,
            AnchorKind::Tolerant => &self.strict,
            AnchorKind::Generic if !self.generic.is_empty() => &self.generic,
            AnchorKind::Generic => self.anchor(AnchorKind::Tolerant),
        }
    }
}

/// Именованный версионированный набор правил.
#[derive(Debug)]
pub struct RuleSet {
    pub name: &'static str,
    pub version: u32,
    pub rules: &'static [FieldRule],
}

impl RuleSet {
    /// Правила поля в порядке объявления.
    pub fn rules_for(&self, key: FieldKey) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter().filter(move |rule| rule.key == key)
    }
}

// =============================================================================
// Общий набор правил
// =============================================================================

const EFT: &str = "EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi";
const EFT_RECURRING: &str = "EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - Düzenli EFT Gönderimi";
const HAVALE: &str = "Havale Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - Havale Gönderimi";
const HAVALE_RECURRING: &str = "Havale Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - Düzenli Havale Gönderimi";
const HAVALE_RECURRING_CASH: &str = "Havale Gönderilmesi - Kasadan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta-Cebe - Düzenli Havale Gönderimi";
const GAMES: &str = "Şans Oyunu Ödemeleri Aracılık";
const SWIFT_OUT: &str = "Uluslararası Para transferi";
const SWIFT_IN: &str = "Uluslararası Para Transferi Ödenmesi";
const CHECK_COLLECTION: &str = "Çek Tahsilat Ücreti";
const CHECKBOOK: &str = "Çek Defteri ve Çek Düzenleme Ücreti";

const EFT_HEADINGS: &[&str] = &[EFT, "EFT Gönderilmesi"];
const HAVALE_HEADINGS: &[&str] = &[HAVALE, "Havale Gönderilmesi"];
const MOBILE: &[&str] = &["Mobil Kanal", "Mobil"];
const ONLINE: &[&str] = &["İnternet", "Internet", "Mobil Kanal", "Mobil"];
const DIGITAL: &[&str] = &[
    "İnternet",
    "Internet",
    "Mobil Kanal",
    "Mobil",
    "İnternet/Mobil",
    "İnternet - Mobil",
    "Dijital Kanallar",
    "Dijital",
];

use FieldKey::*;
use ValueShape::*;

static GENERAL: &[FieldRule] = &[
    FieldRule::new(GamesOfChance, MinMax, &[GAMES], &[])
        .or_tolerant(&[GAMES, "Şans Oyunu", "Şans Oyun"], &[]),
    FieldRule::new(EftBranch, Tiered, &[EFT], &["Şube"]).or_tolerant(EFT_HEADINGS, &["Şube"]),
    FieldRule::new(EftAtm, Tiered, &[EFT], &["ATM"]).or_tolerant(EFT_HEADINGS, &["ATM"]),
    FieldRule::new(EftMobile, Tiered, &[EFT], &["Mobil Kanal"]).or_tolerant(EFT_HEADINGS, MOBILE),
    FieldRule::new(RecurringEft, Tiered, &[EFT_RECURRING], &["İnternet", "Mobil Kanal"])
        .or_tolerant(&[EFT_RECURRING, "Düzenli EFT Gönderimi"], ONLINE)
        .or_generic(&[EFT_RECURRING, "Düzenli EFT Gönderimi", "Düzenli EFT"], DIGITAL),
    FieldRule::new(
        CardBillPayment,
        Percentage,
        &["Fatura Ödeme / Kurum Ödeme - Düzenli Ödemeler"],
        &[],
    ),
    FieldRule::new(HavaleBranch, Tiered, &[HAVALE], &["Şube"])
        .or_tolerant(HAVALE_HEADINGS, &["Şube"]),
    FieldRule::new(HavaleAtm, Tiered, &[HAVALE], &["ATM"]).or_tolerant(HAVALE_HEADINGS, &["ATM"]),
    FieldRule::new(HavaleMobile, Tiered, &[HAVALE], &["Mobil Kanal"])
        .or_tolerant(HAVALE_HEADINGS, MOBILE),
    FieldRule::new(RecurringHavale, Tiered, &[HAVALE_RECURRING], &["İnternet", "Mobil Kanal"])
        .or_tolerant(&[HAVALE_RECURRING, "Düzenli Havale Gönderimi"], ONLINE),
    FieldRule::new(OutgoingSwift, MinMax, &["Western Union"], &[])
        .labeled("WU")
        .paired(PairStyle::Tight),
    FieldRule::new(OutgoingSwift, MinMax, &["Diğer Aracı Firmalar"], &[])
        .labeled("Diğer")
        .paired(PairStyle::Tight),
    FieldRule::new(IncomingSwift, MinMax, &[SWIFT_IN], &["Hesaba Gelen - Yurtdışı Bankadan"])
        .labeled("Hesaba")
        .paired(PairStyle::Labeled),
    FieldRule::new(OutgoingSwiftMobile, MinMax, &[SWIFT_OUT], &["Hesaptan - Hesaba | Mobil Kanal"])
        .or_tolerant(
            &[SWIFT_OUT],
            &[
                "Hesaptan - Hesaba | Mobil Kanal",
                "Hesaptan - Hesaba | Mobil",
                "Mobil Kanal",
            ],
        ),
    FieldRule::new(
        CheckCollectionOtherBank,
        PercentBounds,
        &[CHECK_COLLECTION],
        &["Diğer Banka Çeki -"],
    ),
    FieldRule::new(CheckCollectionGb, Percentage, &["Çek Tahsili GB", "Çek Tahsili G.B"], &[]),
    FieldRule::new(
        SameBranchCheckCollection,
        PercentBounds,
        &[CHECK_COLLECTION],
        &["Aynı Banka Çeki -"],
    ),
    FieldRule::new(OtherBranchCheckCollection, Percentage, &["Başka Şube Çek Tahsili"], &[]),
    FieldRule::new(BlockedCheckPayment, SingleAmount, &["Bloke Çek Ödeme"], &[]),
    FieldRule::new(ReturnedCheck, SingleAmount, &["Çek İade Ücreti"], &[]),
    FieldRule::new(BlockedCheckIssuance, PercentBounds, &["Çek Düzenleme -"], &[]),
    FieldRule::new(
        FxCheckClearing,
        PercentBounds,
        &["Döviz Çekleri Tahsilatı (Diğer Banka) -"],
        &[],
    ),
    FieldRule::new(CheckbookPage, SingleAmount, &["Çek Defteri (Yaprak Başı)"], &[]),
    FieldRule::new(
        PromissoryNoteCollection,
        SingleAmount,
        &["Aynı Banka Senet Tahsili -", "Senet Tahsile Alma"],
        &[],
    )
    .or_tolerant(&["Senet Tahsile Alma", "Aynı Banka Senet Tahsili -"], &[]),
    FieldRule::new(PromissoryNoteReturn, SingleAmount, &["Senet İade Ücreti"], &[]),
];

/// Общий набор правил для всех банков.
pub static GENERAL_RULES: RuleSet = RuleSet {
    name: "general",
    version: RULESET_VERSION,
    rules: GENERAL,
};

// =============================================================================
// Набор правил Ziraat
// =============================================================================

static ZIRAAT: &[FieldRule] = &[
    FieldRule::new(GamesOfChance, MinMax, &[GAMES], &[]),
    FieldRule::new(EftBranch, Tiered, &[EFT], &["Şube"]),
    FieldRule::new(EftAtm, Tiered, &[EFT], &["ATM"]),
    FieldRule::new(EftMobile, Tiered, &[EFT], &["Mobil Kanal"]),
    FieldRule::new(RecurringEft, Tiered, &[EFT_RECURRING], &["Mobil Kanal"]),
    FieldRule::new(
        CardBillPayment,
        OpenBracketFee,
        &["Fatura Ödeme / Kurum Ödeme - Anlık Ödemeler"],
        &[],
    )
    .with_note("(Kredi kartı ile ödemelerde ek olarak nakit avans faizi uygulanır.)"),
    FieldRule::new(HavaleBranch, Tiered, &[HAVALE], &["Şube"]),
    FieldRule::new(HavaleAtm, Tiered, &[HAVALE], &["ATM"]),
    FieldRule::new(HavaleMobile, Tiered, &[HAVALE], &["Mobil Kanal"]),
    FieldRule::new(RecurringHavale, Tiered, &[HAVALE_RECURRING_CASH], &["Şube"]),
    FieldRule::new(OutgoingSwift, Percentage, &[SWIFT_OUT], &["Kasadan - Hesaba"])
        .labeled("Şube (Kasadan)"),
    FieldRule::new(OutgoingSwift, Percentage, &[SWIFT_OUT], &["Hesaptan - Hesaba"])
        .labeled("Şube (Hesaptan)"),
    FieldRule::new(OutgoingSwift, AmountList, &[SWIFT_OUT], &["Hesaptan - Hesaba | İnternet"])
        .labeled("İnternet"),
    FieldRule::new(
        OutgoingSwiftMobile,
        AmountList,
        &[SWIFT_OUT],
        &["Hesaptan - Hesaba | İnternet"],
    ),
    FieldRule::new(
        CheckCollectionOtherBank,
        SingleAmount,
        &[CHECK_COLLECTION],
        &["Diğer Banka Çeki -"],
    ),
    FieldRule::new(
        SameBranchCheckCollection,
        SingleAmount,
        &[CHECK_COLLECTION],
        &["Aynı Banka Çeki -"],
    ),
    FieldRule::new(BlockedCheckIssuance, Percentage, &[CHECKBOOK], &["Çek Düzenleme -"]),
    FieldRule::new(CheckbookPage, SingleAmount, &[CHECKBOOK], &["Çek Defteri (Yaprak Başı)"]),
    FieldRule::new(
        PromissoryNoteCollection,
        FeeCell,
        &["Senet Tahsile Alma Ücreti"],
        &["Aynı Banka Senet Tahsili -"],
    ),
];

/// Правила для Ziraat: таблицы этого банка размечены иначе.
pub static ZIRAAT_RULES: RuleSet = RuleSet {
    name: "ziraat",
    version: RULESET_VERSION,
    rules: ZIRAAT,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_general_rule() {
        for key in FieldKey::ALL {
            assert!(GENERAL_RULES.rules_for(key).next().is_some(), "нет правила для {key}");
        }
    }

    #[test]
    fn test_anchor_fallback() {
        let rule = FieldRule::new(ReturnedCheck, SingleAmount, &["Çek İade Ücreti"], &[]);
        assert_eq!(rule.anchor(AnchorKind::Tolerant), &rule.strict);
        assert_eq!(rule.anchor(AnchorKind::Generic), &rule.strict);

        let recurring = GENERAL_RULES.rules_for(RecurringEft).next().unwrap();
        assert!(recurring.anchor(AnchorKind::Generic).channels.contains(&"Dijital Kanallar"));
        assert!(!recurring.anchor(AnchorKind::Tolerant).channels.contains(&"Dijital Kanallar"));
    }

    #[test]
    fn test_labeled_parts_declared_in_order() {
        let labels: Vec<_> = GENERAL_RULES
            .rules_for(OutgoingSwift)
            .filter_map(|r| r.label)
            .collect();
        assert_eq!(labels, vec!["WU", "Diğer"]);
    }

    #[test]
    fn test_pair_styles() {
        assert_eq!(PairStyle::Spaced.join("1 TRY", "5 TRY"), "1 TRY - 5 TRY");
        assert_eq!(PairStyle::Spaced.join("", "5 TRY"), "5 TRY");
        assert_eq!(PairStyle::Tight.join("8 USD", "45 USD"), "8 USD\u{2013}45 USD");
        assert_eq!(PairStyle::Tight.join("8 USD", ""), "8 USD");
        assert_eq!(
            PairStyle::Labeled.join("5 TRY", "50 TRY"),
            "Asgari 5 TRY | Azami 50 TRY"
        );
        assert_eq!(PairStyle::Labeled.join("", "50 TRY"), "Azami 50 TRY");
        assert_eq!(PairStyle::Labeled.join("", ""), "");
    }
}
