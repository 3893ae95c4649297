//! Обработка одного банка: выгрузка, каскад ярусов, слияние, перенос в отчет.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::BankProfile;
use crate::dump::Dump;
use crate::error::{Error, Result};
use crate::merge::{merge, TierOutput};
use crate::report::{map_record, ReportTemplate};
use crate::status::StatusWriter;
use crate::tiers::{bank_override, generic, strict, tolerant};
use crate::types::{FeeRecord, FieldKey, Provenance, Tier};

/// Состояние обработки банка.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    Unparsed,
    StrictApplied,
    TolerantApplied,
    GenericApplied,
    OverrideApplied,
    Merged,
    /// Запись перенесена в отчет полностью
    Mapped,
    /// Файл выгрузки отсутствует
    SkippedMissingDump,
    /// Нет столбца банка или строки поля; разрешимые поля записаны
    SkippedMissingMapping,
}

impl BankState {
    /// Состояние после применения яруса.
    pub fn after(tier: Tier) -> Self {
        match tier {
            Tier::Strict => BankState::StrictApplied,
            Tier::Tolerant => BankState::TolerantApplied,
            Tier::Generic => BankState::GenericApplied,
            Tier::Override => BankState::OverrideApplied,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BankState::Mapped | BankState::SkippedMissingDump | BankState::SkippedMissingMapping
        )
    }
}

/// Результат каскада для одной выгрузки.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Частичные записи ярусов в порядке приоритета.
    pub tiers: Vec<TierOutput>,
    pub record: FeeRecord,
    pub provenance: Provenance,
}

impl Extraction {
    /// Частичная запись яруса, если ярус применялся.
    pub fn tier(&self, tier: Tier) -> Option<&FeeRecord> {
        self.tiers.iter().find(|t| t.tier == tier).map(|t| &t.record)
    }
}

/// Прогоняет каскад ярусов над выгрузкой. Выгрузка не изменяется;
/// результат зависит только от выгрузки и профиля банка.
pub fn extract(dump: &Dump, bank: &BankProfile) -> Extraction {
    let strict = TierOutput::new(Tier::Strict, strict::extract(dump));
    let tolerant = TierOutput::new(Tier::Tolerant, tolerant::extract(dump, &strict.record));
    let (resolved, _) = merge(&[strict.clone(), tolerant.clone()]);
    let generic = TierOutput::new(Tier::Generic, generic::extract(dump, &resolved));

    let mut tiers = vec![strict, tolerant, generic];
    if let Some(profile) = bank.override_profile {
        tiers.push(TierOutput::new(Tier::Override, bank_override::extract(dump, profile)));
    }

    let (record, provenance) = merge(&tiers);
    Extraction {
        tiers,
        record,
        provenance,
    }
}

/// Прогон одного банка.
#[derive(Debug)]
pub struct BankRun {
    pub bank: &'static BankProfile,
    pub file: PathBuf,
    pub state: BankState,
    /// Пройденные состояния, начиная с `Unparsed`.
    pub history: Vec<BankState>,
    pub extraction: Option<Extraction>,
    /// Поля без строки в отчете.
    pub unmapped: Vec<FieldKey>,
}

impl BankRun {
    fn new(bank: &'static BankProfile, dumps: &Path) -> Self {
        BankRun {
            bank,
            file: dumps.join(bank.dump_file_name()),
            state: BankState::Unparsed,
            history: vec![BankState::Unparsed],
            extraction: None,
            unmapped: Vec::new(),
        }
    }

    fn advance(&mut self, next: BankState) {
        tracing::debug!("{}: {:?} -> {:?}", self.bank.column_header, self.state, next);
        self.state = next;
        self.history.push(next);
    }
}

/// Обрабатывает один банк и заполняет его столбец в отчете.
///
/// Отсутствующая выгрузка, столбец или строка не являются ошибкой: банк
/// пропускается (или заполняется частично) с `[WARN]` в протоколе.
pub fn run_bank<W: Write>(
    bank: &'static BankProfile,
    dumps: &Path,
    template: &mut ReportTemplate,
    status: &mut StatusWriter<W>,
) -> Result<BankRun> {
    let mut run = BankRun::new(bank, dumps);

    let column = match template.column(bank.column_header) {
        Ok(column) => column,
        Err(err) => {
            tracing::warn!("{}", err);
            status.warn(format_args!("Header '{}' not found in report.", bank.column_header))?;
            run.advance(BankState::SkippedMissingMapping);
            return Ok(run);
        }
    };

    let dump = match Dump::from_path(&run.file) {
        Ok(dump) => dump,
        Err(err @ Error::MissingDumpFile { .. }) => {
            tracing::warn!("{}", err);
            status.warn(format_args!("Dump not found: {} (skipping)", run.file.display()))?;
            run.advance(BankState::SkippedMissingDump);
            return Ok(run);
        }
        Err(err) => return Err(err),
    };
    if dump.is_empty() {
        tracing::warn!("{}: выгрузка не содержит строк таблиц", bank.display_name);
    }

    let extraction = extract(&dump, bank);
    for output in &extraction.tiers {
        run.advance(BankState::after(output.tier));
    }
    run.advance(BankState::Merged);

    status.preview(bank.display_name, bank.column_header, &run.file, &extraction.record)?;

    run.unmapped = map_record(template, bank.display_name, column, &extraction.record);
    for key in &run.unmapped {
        status.warn(format_args!("No report row for '{}' ({})", key, bank.column_header))?;
    }
    status.ok(bank.column_header, &run.file)?;

    run.advance(if run.unmapped.is_empty() {
        BankState::Mapped
    } else {
        BankState::SkippedMissingMapping
    });
    run.extraction = Some(extraction);
    Ok(run)
}

/// Обрабатывает банки по порядку. Ошибка одного банка пишется в протокол и
/// не останавливает прогон; фатальная ошибка прерывает его.
pub fn run_banks<W: Write>(
    banks: impl IntoIterator<Item = &'static BankProfile>,
    dumps: &Path,
    template: &mut ReportTemplate,
    status: &mut StatusWriter<W>,
) -> Result<Vec<BankRun>> {
    let mut runs = Vec::new();
    for bank in banks {
        match run_bank(bank, dumps, template, status) {
            Ok(run) => runs.push(run),
            Err(err) if !err.is_fatal() => {
                tracing::warn!("{}: {}", bank.display_name, err);
                status.warn(format_args!("{}: {}", bank.display_name, err))?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(runs)
}
