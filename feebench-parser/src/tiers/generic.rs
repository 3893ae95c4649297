//! Обобщенный ярус: восстановление ценовых диапазонов по положению строк.
//!
//! Применяется только к полям с диапазонами, пустым после строгого и
//! терпимого ярусов. Текст границ диапазонов не проверяется: после строки
//! канала берется сумма из последней ячейки каждой строки, пока не начнется
//! соседняя подтаблица или не повторится заголовок.

use crate::dump::Dump;
use crate::error::{Extracted, Miss};
use crate::money::{CurrencyPolicy, MoneyToken, PercentStyle};
use crate::rules::{AnchorKind, FieldRule, RuleSet, ValueShape, GENERAL_RULES};
use crate::tiers::engine::{band_views, Hit, BAND_SEPARATOR};
use crate::tiers::{BandDetection, Case, CellPos, Extractor, Layout};
use crate::types::{FeeRecord, FieldKey};

/// Сколько сумм собирается не больше.
pub const MAX_BANDS: usize = 3;
/// Строка считается строкой диапазона, только если в ней не меньше ячеек.
pub const MIN_BAND_CELLS: usize = 3;

const LAYOUT: Layout = Layout {
    name: "generic",
    currency: CurrencyPolicy::Tolerant,
    case: Case::Insensitive,
    amount_cell: CellPos::Last,
    bands: BandDetection::Shaped,
    percent: PercentStyle::Prefix,
};

/// Вычисляет пустые в `prior` поля с диапазонами по общему набору правил.
pub fn extract(dump: &Dump, prior: &FeeRecord) -> FeeRecord {
    extract_with(dump, &GENERAL_RULES, prior)
}

pub fn extract_with(dump: &Dump, rules: &RuleSet, prior: &FeeRecord) -> FeeRecord {
    let extractor = Extractor::new(LAYOUT);
    let record: FeeRecord = FieldKey::ALL
        .into_iter()
        .filter(|key| prior.is_empty(*key))
        .filter_map(|key| {
            let value = rules
                .rules_for(key)
                .filter(|rule| rule.shape == ValueShape::Tiered)
                .find_map(|rule| match positional_bands(&extractor, dump, rule) {
                    Ok(value) => Some(value),
                    Err(miss) => {
                        tracing::trace!("{} [generic]: {}", key, miss);
                        None
                    }
                })?;
            Some((key, value))
        })
        .collect();
    tracing::debug!("generic: {} полей", record.filled());
    record
}

fn positional_bands(extractor: &Extractor, dump: &Dump, rule: &FieldRule) -> Extracted {
    let anchor = rule.anchor(AnchorKind::Generic);
    let mut last = Miss::MissingHeading;
    for heading in anchor.headings {
        for channel in anchor.channels {
            match extractor.locate(dump, heading, Some(*channel)) {
                Ok(hit) => {
                    let amounts = collect_amounts(&hit);
                    if !amounts.is_empty() {
                        return Ok(amounts.join(BAND_SEPARATOR));
                    }
                    last = Miss::MalformedAmount;
                }
                Err(Miss::UnmatchedChannel) if last == Miss::MissingHeading => {
                    last = Miss::UnmatchedChannel;
                }
                Err(_) => {}
            }
        }
    }
    Err(last)
}

/// Суммы строки канала и следующих за ней строк той же подтаблицы.
pub(crate) fn collect_amounts(hit: &Hit<'_>) -> Vec<String> {
    let Some(channel_row) = hit.row.map(|i| hit.rows()[i].cells.as_slice()) else {
        return Vec::new();
    };
    std::iter::once(channel_row)
        .chain(band_views(hit, LAYOUT.case, true))
        .filter(|cells| cells.len() >= MIN_BAND_CELLS)
        .filter_map(|cells| LAYOUT.amount_cell.pick(cells))
        .filter_map(|cell| MoneyToken::parse_cell(cell, LAYOUT.currency))
        .take(MAX_BANDS)
        .map(|token| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recurring_eft(body: &str) -> String {
        let dump = Dump::parse(body);
        extract(&dump, &FeeRecord::new())
            .get(FieldKey::RecurringEft)
            .to_string()
    }

    #[test]
    fn test_three_rows_in_order() {
        let value = recurring_eft(
            "--- TABLE 1 ---\n\
             SUB-HEADING: Düzenli EFT Gönderimi\n\
             Düzenli EFT | Dijital Kanallar | 0-6.300 TL arası | 4,50 TL\n\
             Düzenli EFT | Dijital Kanallar | 6.300-304.800 TL arası | 9 TL\n\
             Düzenli EFT | Dijital Kanallar | 304.800 TL üstü | 13,50 TL\n",
        );
        assert_eq!(value, "4,50 TRY - 9 TRY - 13,50 TRY");
    }

    #[test]
    fn test_stops_at_sibling_channel() {
        let value = recurring_eft(
            "--- TABLE 1 ---\n\
             SUB-HEADING: Düzenli EFT Gönderimi\n\
             Düzenli EFT | Dijital Kanallar | alt dilim | 4,50 TL\n\
             Düzenli EFT | Dijital Kanallar | üst dilim | 9 TL\n\
             Düzenli EFT | Şube | alt dilim | 20 TL\n\
             Düzenli EFT | Şube | üst dilim | 30 TL\n",
        );
        assert_eq!(value, "4,50 TRY - 9 TRY");
    }

    #[test]
    fn test_stops_at_repeated_heading() {
        let value = recurring_eft(
            "--- TABLE 1 ---\n\
             Düzenli EFT Gönderimi | Mobil | alt dilim | 2 TRY\n\
             Düzenli EFT Gönderimi | Mobil | üst dilim | 3 TRY\n",
        );
        assert_eq!(value, "2 TRY");
    }

    #[test]
    fn test_collects_unrelated_price_like_rows() {
        // Строка без канала, похожая на строку цены, тоже попадает в результат.
        let value = recurring_eft(
            "--- TABLE 1 ---\n\
             SUB-HEADING: Düzenli EFT Gönderimi\n\
             Düzenli EFT | İnternet | tek dilim | 5 TL\n\
             Not | bilgi | 1 TL\n\
             Ek | bilgi | 2 TL\n\
             Ek | bilgi | 3 TL\n",
        );
        assert_eq!(value, "5 TRY - 1 TRY - 2 TRY");
    }

    #[test]
    fn test_only_empty_tiered_fields() {
        let body = "--- TABLE 1 ---\n\
                    SUB-HEADING: Düzenli EFT Gönderimi\n\
                    Düzenli EFT | Dijital | dilim | 4 TL\n\
                    --- TABLE 2 ---\n\
                    Çek İade Ücreti | a | 75 TL\n";
        let dump = Dump::parse(body);

        let mut prior = FeeRecord::new();
        prior.set(FieldKey::RecurringEft, "1 TRY");
        let record = extract(&dump, &prior);
        assert_eq!(record.get(FieldKey::RecurringEft), "");
        assert_eq!(record.get(FieldKey::ReturnedCheck), "");
    }
}
