//! Слияние результатов ярусов в итоговую запись банка.

use crate::types::{FeeRecord, FieldKey, Provenance, Tier};

/// Частичная запись одного яруса.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierOutput {
    pub tier: Tier,
    pub record: FeeRecord,
}

impl TierOutput {
    pub fn new(tier: Tier, record: FeeRecord) -> Self {
        TierOutput { tier, record }
    }
}

/// Левостороннее объединение: для каждого поля берется значение первого по
/// порядку яруса, давшего непустую строку. Более поздний ярус может только
/// заполнить пустое поле.
pub fn merge(outputs: &[TierOutput]) -> (FeeRecord, Provenance) {
    outputs.iter().fold(
        (FeeRecord::new(), Provenance::default()),
        |(mut record, mut provenance), output| {
            for key in FieldKey::ALL {
                let value = output.record.get(key);
                if record.is_empty(key) && !value.is_empty() {
                    record.set(key, value);
                    provenance.record(key, output.tier);
                }
            }
            (record, provenance)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(FieldKey, &str)]) -> FeeRecord {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_earlier_tier_wins() {
        let outputs = [
            TierOutput::new(Tier::Strict, record(&[(FieldKey::ReturnedCheck, "50 TRY")])),
            TierOutput::new(
                Tier::Tolerant,
                record(&[(FieldKey::ReturnedCheck, "60 TRY"), (FieldKey::CheckbookPage, "2 TRY")]),
            ),
            TierOutput::new(Tier::Override, record(&[(FieldKey::CheckbookPage, "3 TRY")])),
        ];
        let (merged, provenance) = merge(&outputs);
        assert_eq!(merged.get(FieldKey::ReturnedCheck), "50 TRY");
        assert_eq!(merged.get(FieldKey::CheckbookPage), "2 TRY");
        assert_eq!(provenance.source(FieldKey::ReturnedCheck), Some(Tier::Strict));
        assert_eq!(provenance.source(FieldKey::CheckbookPage), Some(Tier::Tolerant));
        assert_eq!(provenance.source(FieldKey::EftAtm), None);
    }

    #[test]
    fn test_override_fills_only_blanks() {
        let outputs = [
            TierOutput::new(Tier::Strict, record(&[(FieldKey::EftBranch, "5 TRY")])),
            TierOutput::new(
                Tier::Override,
                record(&[(FieldKey::EftBranch, "7 TRY"), (FieldKey::EftAtm, "3 TRY")]),
            ),
        ];
        let (merged, provenance) = merge(&outputs);
        assert_eq!(merged.get(FieldKey::EftBranch), "5 TRY");
        assert_eq!(merged.get(FieldKey::EftAtm), "3 TRY");
        assert_eq!(provenance.source(FieldKey::EftAtm), Some(Tier::Override));
    }

    #[test]
    fn test_merge_nothing() {
        let (merged, _) = merge(&[]);
        assert!(merged.is_blank());
    }
}
