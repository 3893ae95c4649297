//! Строгий ярус: точные заголовки, каналы и маркер TRY.

use crate::dump::Dump;
use crate::rules::{AnchorKind, RuleSet, GENERAL_RULES};
use crate::tiers::{Extractor, Layout};
use crate::types::FeeRecord;

/// Вычисляет все поля по общему набору правил.
pub fn extract(dump: &Dump) -> FeeRecord {
    extract_with(dump, &GENERAL_RULES)
}

/// Вычисляет все поля по заданному набору правил.
pub fn extract_with(dump: &Dump, rules: &RuleSet) -> FeeRecord {
    let record = Extractor::new(Layout::STRICT).record(dump, rules, AnchorKind::Strict);
    tracing::debug!("strict: {} из {} полей", record.filled(), crate::types::FieldKey::COUNT);
    record
}
