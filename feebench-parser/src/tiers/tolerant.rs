//! Терпимый ярус: синоним TL, регистр не важен, альтернативные заголовки
//! и каналы. Пересчитывает только поля, пустые после строгого яруса.

use crate::dump::Dump;
use crate::rules::{AnchorKind, RuleSet, GENERAL_RULES};
use crate::tiers::{Extractor, Layout};
use crate::types::FeeRecord;

/// Вычисляет пустые в `prior` поля по общему набору правил.
pub fn extract(dump: &Dump, prior: &FeeRecord) -> FeeRecord {
    extract_with(dump, &GENERAL_RULES, prior)
}

/// Вычисляет пустые в `prior` поля; заполненные остаются пустыми в результате.
pub fn extract_with(dump: &Dump, rules: &RuleSet, prior: &FeeRecord) -> FeeRecord {
    let pending = prior.empty_keys();
    let record = Extractor::new(Layout::TOLERANT).record_for(
        dump,
        rules,
        AnchorKind::Tolerant,
        pending.iter().copied(),
    );
    tracing::debug!("tolerant: {} из {} пустых полей", record.filled(), pending.len());
    record
}
