//! # Feebench Parser
//!
//! Библиотека для извлечения тарифов розничных банковских услуг из текстовых
//! выгрузок страниц тарифов и сведения их в сравнительный отчет.
//!
//! ## Каскад ярусов
//!
//! - **strict** - точные заголовки, каналы и маркер TRY
//! - **tolerant** - синоним TL, регистр, альтернативные формулировки
//! - **generic** - ценовые диапазоны по положению строк
//! - **override** - отдельный набор правил для банка с иной разметкой
//!
//! Ярусы - чистые функции над выгрузкой. Итоговая запись получается
//! левосторонним слиянием их результатов: более поздний ярус заполняет только
//! пустые поля.
//!
//! ## Пример использования
//!
//! ```rust,ignore
//! use feebench_parser::{config, pipeline, Dump};
//! use std::path::Path;
//!
//! let dump = Dump::from_path(Path::new("fees_Akbank_T.A.Ş..txt"))?;
//! let extraction = pipeline::extract(&dump, &config::BANKS[0]);
//! println!("{}", extraction.record.get(feebench_parser::FieldKey::EftBranch));
//! ```

pub mod config;
pub mod dump;
pub mod error;
pub mod merge;
pub mod money;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod status;
pub mod tiers;
pub mod types;

pub use config::{find_bank, BankProfile, OverrideProfile, BANKS};
pub use dump::Dump;
pub use error::{Error, Miss, Result};
pub use merge::{merge, TierOutput};
pub use pipeline::{extract, run_bank, run_banks, BankRun, BankState, Extraction};
pub use report::{ReportTemplate, ReportWriter};
pub use rules::{RuleSet, RULESET_VERSION};
pub use status::StatusWriter;
pub use types::*;
