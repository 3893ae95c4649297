//! Интеграционные тесты для feebench-parser.

use std::fs;

use feebench_parser::config::{find_bank, BANKS};
use feebench_parser::{
    extract, merge, run_bank, run_banks, BankState, Dump, FeeRecord, FieldKey, ReportTemplate,
    ReportWriter, StatusWriter, Tier, TierOutput,
};

const SAMPLE_AKBANK: &str = r#"=== BANK: Akbank T.A.Ş. ===


===== TAB: Para Transferleri (#tab-2) =====

--- TABLE 1 ---
SECTION: EFT İşlemleri
SUB-HEADING: EFT Gönderilmesi
HEADERS: Ürün | Kanal | Tutar Aralığı | Ücret
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | Şube | 1 TRY - 6.300 TRY | 5 TRY
6.300,01 TRY - 304.800 TRY | 10 TRY
304.800,01 TRY ve üzeri | 15 TRY
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | ATM | 1 TRY - 6.300 TRY | 3 TRY
6.300,01 TRY - 304.800 TRY | 6 TRY
304.800,01 TRY ve üzeri | 9 TRY

--- TABLE 2 ---
SECTION: Havale İşlemleri
SUB-HEADING: Havale Gönderilmesi
Havale Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - Havale Gönderimi | Şube | 1 TL - 6.300 TL | 2,50 TL
6.300,01 TL - 304.800 TL | 4 TL
304.800,01 TL üzeri | 6 TL

--- TABLE 3 ---
SECTION: Yurt Dışı Para Transferi
SUB-HEADING: Western Union
HEADERS: İşlem | Asgari Tutar | Azami Tutar
Gönderim | 8 USD | 45 USD

===== TAB: Çek ve Senet (#tab-5) =====

--- TABLE 1 ---
SECTION: (no section title)
SUB-HEADING: Çek Tahsilat Ücreti
HEADERS: İşlem | Oran | Asgari Tutar | Azami Tutar
Diğer Banka Çeki - Takas | % 0,2 | 10 TRY | 250 TRY
Aynı Banka Çeki - Takas | % 0,1 | 5 TRY | 100 TRY

--- TABLE 2 ---
SECTION: (no section title)
SUB-HEADING: (no sub-heading)
Çek İade Ücreti | Çek başına | 75 TRY
Senet İade Ücreti | Senet başına | 20 TRY
"#;

const SAMPLE_ZIRAAT: &str = r#"=== BANK: Türkiye Cumhuriyeti Ziraat Bankası A.Ş. ===

--- TABLE 1 ---
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | Şube | 1 TRY - 6.300 TRY |  | 7 TRY | 5 TRY
6.300,01 TRY - 304.800 TRY |  | 12 TRY | 10 TRY
304.800,01 TRY |  | 20 TRY | 15 TRY

--- TABLE 2 ---
SUB-HEADING: Uluslararası Para transferi
Uluslararası Para transferi | Kasadan - Hesaba | Şube | %  0.3
"#;

fn akbank() -> &'static feebench_parser::BankProfile {
    find_bank("AKBANK").unwrap()
}

fn ziraat() -> &'static feebench_parser::BankProfile {
    find_bank("ZİRAAT").unwrap()
}

#[test]
fn test_end_to_end_branch_bands() {
    let extraction = extract(&Dump::parse(SAMPLE_AKBANK), akbank());
    let record = &extraction.record;

    assert_eq!(record.get(FieldKey::EftBranch), "5 TRY - 10 TRY - 15 TRY");
    assert_eq!(record.get(FieldKey::EftAtm), "3 TRY - 6 TRY - 9 TRY");
    assert_eq!(record.get(FieldKey::OutgoingSwift), "WU: 8 USD\u{2013}45 USD");
    assert_eq!(
        record.get(FieldKey::CheckCollectionOtherBank),
        "%0,2 Asgari Tutar: 10 TRY Azami Tutar: 250 TRY"
    );
    assert_eq!(record.get(FieldKey::ReturnedCheck), "75 TRY");
    assert_eq!(record.get(FieldKey::PromissoryNoteReturn), "20 TRY");
    assert_eq!(record.get(FieldKey::EftMobile), "");
    assert_eq!(extraction.provenance.source(FieldKey::EftBranch), Some(Tier::Strict));
}

#[test]
fn test_synonym_marker_resolved_by_tolerant_tier() {
    let extraction = extract(&Dump::parse(SAMPLE_AKBANK), akbank());

    assert_eq!(extraction.tier(Tier::Strict).unwrap().get(FieldKey::HavaleBranch), "");
    assert_eq!(extraction.record.get(FieldKey::HavaleBranch), "2,50 TRY - 4 TRY - 6 TRY");
    assert_eq!(
        extraction.provenance.source(FieldKey::HavaleBranch),
        Some(Tier::Tolerant)
    );
}

#[test]
fn test_empty_dump_gives_empty_record() {
    for bank in &BANKS {
        let extraction = extract(&Dump::parse(""), bank);
        assert!(extraction.record.is_blank(), "{}", bank.display_name);
        for key in FieldKey::ALL {
            assert_eq!(extraction.provenance.source(key), None);
        }
    }
}

#[test]
fn test_strict_value_always_wins() {
    let dump = Dump::parse(SAMPLE_AKBANK);
    let strict = extract(&dump, akbank()).tier(Tier::Strict).unwrap().clone();

    let noise: FeeRecord = FieldKey::ALL
        .into_iter()
        .map(|key| (key, format!("noise {key}")))
        .collect();
    let outputs = [
        TierOutput::new(Tier::Strict, strict.clone()),
        TierOutput::new(Tier::Tolerant, noise.clone()),
        TierOutput::new(Tier::Generic, noise.clone()),
        TierOutput::new(Tier::Override, noise),
    ];
    let (merged, provenance) = merge(&outputs);

    for (key, value) in strict.iter() {
        if !value.is_empty() {
            assert_eq!(merged.get(key), value);
            assert_eq!(provenance.source(key), Some(Tier::Strict));
        } else {
            assert_eq!(provenance.source(key), Some(Tier::Tolerant));
        }
    }
}

#[test]
fn test_override_fills_only_blanks() {
    let extraction = extract(&Dump::parse(SAMPLE_ZIRAAT), ziraat());
    let overridden = extraction.tier(Tier::Override).unwrap();

    assert_eq!(overridden.get(FieldKey::EftBranch), "7 TRY - 12 TRY - 20 TRY");
    assert_eq!(extraction.record.get(FieldKey::EftBranch), "5 TRY - 10 TRY - 15 TRY");
    assert_eq!(extraction.provenance.source(FieldKey::EftBranch), Some(Tier::Strict));

    assert_eq!(extraction.record.get(FieldKey::OutgoingSwift), "Şube (Kasadan): %0.3");
    assert_eq!(
        extraction.provenance.source(FieldKey::OutgoingSwift),
        Some(Tier::Override)
    );
}

#[test]
fn test_override_not_applied_to_other_banks() {
    let extraction = extract(&Dump::parse(SAMPLE_ZIRAAT), akbank());
    assert!(extraction.tier(Tier::Override).is_none());
    assert_eq!(extraction.record.get(FieldKey::OutgoingSwift), "");
}

#[test]
fn test_extraction_is_idempotent() {
    let dump = Dump::parse(SAMPLE_AKBANK);
    let first = extract(&dump, akbank());
    let second = extract(&dump, akbank());
    assert_eq!(first.record, second.record);
    assert_eq!(first.provenance, second.provenance);
    assert_eq!(Dump::parse(SAMPLE_AKBANK), dump);
}

#[test]
fn test_missing_dump_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut template = ReportTemplate::build(2025).unwrap();
    let mut status = StatusWriter::new(Vec::new());

    let run = run_bank(akbank(), dir.path(), &mut template, &mut status).unwrap();
    assert_eq!(run.state, BankState::SkippedMissingDump);
    assert!(run.extraction.is_none());

    let out = String::from_utf8(status.into_inner()).unwrap();
    assert!(out.starts_with("[WARN] Dump not found: "));
    assert!(out.trim_end().ends_with("(skipping)"));
}

#[test]
fn test_missing_column_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(akbank().dump_file_name()), SAMPLE_AKBANK).unwrap();
    let mut template = ReportTemplate::with_columns(2025, &["GARANTI"]).unwrap();
    let mut status = StatusWriter::new(Vec::new());

    let run = run_bank(akbank(), dir.path(), &mut template, &mut status).unwrap();
    assert_eq!(run.state, BankState::SkippedMissingMapping);
    let out = String::from_utf8(status.into_inner()).unwrap();
    assert_eq!(out, "[WARN] Header 'AKBANK' not found in report.\n");
}

#[test]
fn test_run_fills_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(akbank().dump_file_name()), SAMPLE_AKBANK).unwrap();

    let mut template = ReportTemplate::build(2025).unwrap();
    let mut status = StatusWriter::new(Vec::new());
    let banks = [akbank(), find_bank("GARANTI").unwrap()];
    let runs = run_banks(banks, dir.path(), &mut template, &mut status).unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].state, BankState::Mapped);
    assert_eq!(
        runs[0].history,
        vec![
            BankState::Unparsed,
            BankState::StrictApplied,
            BankState::TolerantApplied,
            BankState::GenericApplied,
            BankState::Merged,
            BankState::Mapped,
        ]
    );
    assert_eq!(runs[1].state, BankState::SkippedMissingDump);

    let column = template.column_of("AKBANK").unwrap();
    let row = template.row_of(FieldKey::EftBranch).unwrap();
    assert_eq!(template.cell(row, column), Some("5 TRY - 10 TRY - 15 TRY"));

    let out = String::from_utf8(status.into_inner()).unwrap();
    assert!(out.contains("[PREVIEW] Akbank T.A.Ş. -> column 'AKBANK' (from "));
    assert!(out.contains("  HESAPTAN EFT - Mobil: (empty)\n"));
    assert!(out.contains("[/PREVIEW]\n[OK] Filled column 'AKBANK' from "));
    assert!(out.contains("[WARN] Dump not found: "));

    let path = dir.path().join("Benchmark_Results.csv");
    ReportWriter::save(&template, &path).unwrap();
    let csv = fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("BENCHMARKING-2025,,GARANTI,AKBANK,"));
    assert!(csv.contains("EFT,HESAPTAN EFT - Şube,,5 TRY - 10 TRY - 15 TRY,"));
}

const SAMPLE_REPEATED_HEADING: &str = r#"=== BANK: Akbank T.A.Ş. ===

--- TABLE 1 ---
SUB-HEADING: EFT Gönderilmesi
HEADERS: Ürün | Kanal | Tutar Aralığı | Ücret
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | Şube | 1 TRY - 6.300 TRY | 5 TRY
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | Şube | 6.300,01 TRY - 304.800 TRY | 10 TRY
EFT Gönderilmesi - Hesaptan / Hesaba-İsme-Kredi Kartına-Banka Kartına-Ön Ödemeli Karta - EFT Gönderimi | Şube | 304.800,01 TRY ve üzeri | 15 TRY
"#;

#[test]
fn test_heading_on_every_band_row_merges_all_bands() {
    let extraction = extract(&Dump::parse(SAMPLE_REPEATED_HEADING), akbank());

    assert_eq!(extraction.record.get(FieldKey::EftBranch), "5 TRY - 10 TRY - 15 TRY");
    assert_eq!(extraction.provenance.source(FieldKey::EftBranch), Some(Tier::Strict));
}

#[test]
fn test_report_without_row_marks_bank_unmapped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(akbank().dump_file_name()), SAMPLE_AKBANK).unwrap();

    let base = ReportTemplate::build(2025).unwrap();
    let mobile = base.row_of(FieldKey::EftMobile).unwrap();
    let mut grid = base.grid().to_vec();
    grid[mobile][0].clear();
    grid[mobile][1].clear();
    let mut template = ReportTemplate::from_grid(grid).unwrap();
    assert_eq!(template.row_of(FieldKey::EftMobile), None);

    let mut status = StatusWriter::new(Vec::new());
    let run = run_bank(akbank(), dir.path(), &mut template, &mut status).unwrap();

    assert_eq!(run.state, BankState::SkippedMissingMapping);
    assert_eq!(run.unmapped, vec![FieldKey::EftMobile]);
    assert!(run.extraction.is_some());

    let column = template.column_of("AKBANK").unwrap();
    let row = template.row_of(FieldKey::EftBranch).unwrap();
    assert_eq!(template.cell(row, column), Some("5 TRY - 10 TRY - 15 TRY"));

    let out = String::from_utf8(status.into_inner()).unwrap();
    assert!(out.contains("[WARN] No report row for 'HESAPTAN EFT - Mobil' (AKBANK)\n"));
    assert!(out.contains("[OK] Filled column 'AKBANK' from "));
}
