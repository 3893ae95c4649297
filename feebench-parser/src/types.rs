//! Базовые типы данных: канонические поля, запись тарифов банка, ярусы извлечения.

use std::fmt;

// =============================================================================
// Разделы отчета
// =============================================================================

/// Метка раздела «Şans Oyunları» (единственный раздел без подписи строки).
pub const SECTION_SANS: &str = "ŞANS OYUNLARI";
/// Метка раздела EFT.
pub const SECTION_EFT: &str = "EFT";
/// Метка раздела «Havale».
pub const SECTION_HAVALE: &str = "HAVALE";
/// Метка раздела SWIFT.
pub const SECTION_SWIFT: &str = "SWIFT";
/// Метка раздела «Çek».
pub const SECTION_CEK: &str = "ÇEK";
/// Метка раздела «Senet».
pub const SECTION_SENET: &str = "SENET";

/// Разделы отчета в порядке следования строк.
pub const SECTIONS: [&str; 6] = [
    SECTION_SANS,
    SECTION_EFT,
    SECTION_HAVALE,
    SECTION_SWIFT,
    SECTION_CEK,
    SECTION_SENET,
];

// =============================================================================
// Канонические поля
// =============================================================================

/// Каноническое поле тарифа.
///
/// Порядок вариантов фиксирован: он задает и порядок слияния, и порядок строк
/// в итоговом отчете.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    GamesOfChance,
    EftBranch,
    EftAtm,
    EftMobile,
    RecurringEft,
    CardBillPayment,
    HavaleBranch,
    HavaleAtm,
    HavaleMobile,
    RecurringHavale,
    OutgoingSwift,
    IncomingSwift,
    OutgoingSwiftMobile,
    CheckCollectionOtherBank,
    CheckCollectionGb,
    SameBranchCheckCollection,
    OtherBranchCheckCollection,
    BlockedCheckPayment,
    ReturnedCheck,
    BlockedCheckIssuance,
    FxCheckClearing,
    CheckbookPage,
    PromissoryNoteCollection,
    PromissoryNoteReturn,
}

impl FieldKey {
    /// Количество канонических полей.
    pub const COUNT: usize = 24;

    /// Все поля в каноническом порядке.
    pub const ALL: [FieldKey; FieldKey::COUNT] = [
        FieldKey::GamesOfChance,
        FieldKey::EftBranch,
        FieldKey::EftAtm,
        FieldKey::EftMobile,
        FieldKey::RecurringEft,
        FieldKey::CardBillPayment,
        FieldKey::HavaleBranch,
        FieldKey::HavaleAtm,
        FieldKey::HavaleMobile,
        FieldKey::RecurringHavale,
        FieldKey::OutgoingSwift,
        FieldKey::IncomingSwift,
        FieldKey::OutgoingSwiftMobile,
        FieldKey::CheckCollectionOtherBank,
        FieldKey::CheckCollectionGb,
        FieldKey::SameBranchCheckCollection,
        FieldKey::OtherBranchCheckCollection,
        FieldKey::BlockedCheckPayment,
        FieldKey::ReturnedCheck,
        FieldKey::BlockedCheckIssuance,
        FieldKey::FxCheckClearing,
        FieldKey::CheckbookPage,
        FieldKey::PromissoryNoteCollection,
        FieldKey::PromissoryNoteReturn,
    ];

    /// Позиция поля в каноническом порядке.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Раздел отчета, к которому относится поле.
    pub fn section(self) -> &'static str {
        use FieldKey::*;
        match self {
            GamesOfChance => SECTION_SANS,
            EftBranch | EftAtm | EftMobile | RecurringEft | CardBillPayment => SECTION_EFT,
            HavaleBranch | HavaleAtm | HavaleMobile | RecurringHavale => SECTION_HAVALE,
            OutgoingSwift | IncomingSwift | OutgoingSwiftMobile => SECTION_SWIFT,
            CheckCollectionOtherBank
            | CheckCollectionGb
            | SameBranchCheckCollection
            | OtherBranchCheckCollection
            | BlockedCheckPayment
            | ReturnedCheck
            | BlockedCheckIssuance
            | FxCheckClearing
            | CheckbookPage => SECTION_CEK,
            PromissoryNoteCollection | PromissoryNoteReturn => SECTION_SENET,
        }
    }

    /// Подпись строки отчета (пустая для полей без подписи).
    pub fn sub_label(self) -> &'static str {
        use FieldKey::*;
        match self {
            GamesOfChance => "",
            EftBranch => "HESAPTAN EFT - Şube",
            EftAtm => "HESAPTAN EFT - ATM",
            EftMobile => "HESAPTAN EFT - Mobil",
            RecurringEft => "DÜZENLİ EFT",
            CardBillPayment => "KREDİ KARTINDAN FATURA ÖDEME",
            HavaleBranch => "HESAPTAN HAVALE - Şube",
            HavaleAtm => "HESAPTAN HAVALE - ATM",
            HavaleMobile => "HESAPTAN HAVALE - Mobil",
            RecurringHavale => "DÜZENLİ HAVALE",
            OutgoingSwift => "GİDEN SWIFT",
            IncomingSwift => "GELEN SWIFT",
            OutgoingSwiftMobile => "GİDEN SWIFT - Mobil",
            CheckCollectionOtherBank => "ÇEK TAHSİLİ BAŞKA BANKA",
            CheckCollectionGb => "ÇEK TAHSİLİ GB",
            SameBranchCheckCollection => "AYNI ŞUBE ÇEK TAHSİLATI",
            OtherBranchCheckCollection => "BAŞKA ŞUBE ÇEK TAHSİLATI",
            BlockedCheckPayment => "BLOKE ÇEK ÖDEME",
            ReturnedCheck => "ÇEK İADE",
            BlockedCheckIssuance => "BLOKE ÇEK DÜZENLEME",
            FxCheckClearing => "YP ÇEK TAKASA GÖNDERME",
            CheckbookPage => "ÇEK KARNESİ SAYFA ÜCRETİ",
            PromissoryNoteCollection => "SENET TAHSİLE ALMA",
            PromissoryNoteReturn => "MUAMELESİZ SENET İADESİ",
        }
    }

    /// Текст, по которому поле ищется в строках отчета:
    /// подпись строки, а при ее отсутствии метка раздела.
    pub fn row_label(self) -> &'static str {
        match self.sub_label() {
            "" => self.section(),
            label => label,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.row_label())
    }
}

// =============================================================================
// Ярусы извлечения
// =============================================================================

/// Ярус каскада извлечения, в порядке приоритета.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Строгий разбор по якорям
    Strict,
    /// Терпимый разбор по спискам синонимов
    Tolerant,
    /// Позиционный разбор ценовых диапазонов
    Generic,
    /// Отдельный разбор для банка с нестандартной разметкой
    Override,
}

impl Tier {
    /// Короткое имя яруса для логов и диагностики.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Strict => "strict",
            Tier::Tolerant => "tolerant",
            Tier::Generic => "generic",
            Tier::Override => "override",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Запись тарифов
// =============================================================================

/// Тарифы одного банка: значение для каждого канонического поля.
///
/// Отсутствующее значение хранится как пустая строка.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeRecord {
    values: [String; FieldKey::COUNT],
}

impl FeeRecord {
    /// Создает запись, в которой все поля пусты.
    pub fn new() -> Self {
        Self::default()
    }

    /// Значение поля.
    pub fn get(&self, key: FieldKey) -> &str {
        &self.values[key.index()]
    }

    /// Устанавливает значение поля.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values[key.index()] = value.into();
    }

    /// true, если поле пусто.
    pub fn is_empty(&self, key: FieldKey) -> bool {
        self.values[key.index()].is_empty()
    }

    /// true, если пусты все поля.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Количество заполненных полей.
    pub fn filled(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }

    /// Пустые поля в каноническом порядке.
    pub fn empty_keys(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .into_iter()
            .filter(|key| self.is_empty(*key))
            .collect()
    }

    /// Пары (поле, значение) в каноническом порядке.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        FieldKey::ALL
            .into_iter()
            .map(move |key| (key, self.get(key)))
    }
}

impl FromIterator<(FieldKey, String)> for FeeRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        let mut record = FeeRecord::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

/// Для каждого поля: ярус, который дал итоговое значение.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provenance {
    sources: [Option<Tier>; FieldKey::COUNT],
}

impl Provenance {
    /// Ярус-источник поля (None, если поле осталось пустым).
    pub fn source(&self, key: FieldKey) -> Option<Tier> {
        self.sources[key.index()]
    }

    pub(crate) fn record(&mut self, key: FieldKey, tier: Tier) {
        self.sources[key.index()] = Some(tier);
    }
}
