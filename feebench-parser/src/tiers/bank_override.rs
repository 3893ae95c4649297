//! Отдельный конвейер для банка с нестандартной разметкой таблиц.
//!
//! Использует собственный набор правил и разметку профиля; общие ярусы
//! при этом не ослабляются.

use crate::config::OverrideProfile;
use crate::dump::Dump;
use crate::rules::AnchorKind;
use crate::tiers::Extractor;
use crate::types::FeeRecord;

/// Полная запись по правилам профиля.
pub fn extract(dump: &Dump, profile: &OverrideProfile) -> FeeRecord {
    let record = Extractor::new(profile.layout).record(dump, profile.rules, AnchorKind::Strict);
    tracing::debug!(
        "override ({} v{}): {} полей",
        profile.rules.name,
        profile.rules.version,
        record.filled()
    );
    record
}
