//! CLI-утилита для сведения тарифов банков в сравнительный отчет.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use chrono::Datelike;
use clap::Parser;

use feebench_parser::config::{find_bank, BANKS};
use feebench_parser::{run_banks, BankProfile, BankRun, ReportTemplate, ReportWriter, StatusWriter};

/// Feebench Runner - сравнительный отчет по тарифам банков.
///
/// Читает выгрузки `fees_<банк>.txt`, извлекает тарифы и записывает
/// заполненный отчет в CSV.
#[derive(Parser)]
#[command(name = "feebench-runner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Каталог с файлами выгрузок
    #[arg(long, default_value = ".")]
    dumps: PathBuf,

    /// Итоговый файл отчета
    #[arg(short, long, default_value = "Benchmark_Results.csv")]
    output: PathBuf,

    /// Не записывать отчет, только показать предпросмотр
    #[arg(long)]
    dry_run: bool,

    /// Обработать только указанные банки (имя или заголовок столбца)
    #[arg(long = "bank")]
    banks: Vec<String>,

    /// Год в заголовке отчета (по умолчанию текущий)
    #[arg(long)]
    year: Option<i32>,

    /// Подробный вывод
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "feebench_parser=debug,feebench_runner=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn select_banks(names: &[String]) -> anyhow::Result<Vec<&'static BankProfile>> {
    if names.is_empty() {
        return Ok(BANKS.iter().collect());
    }
    names
        .iter()
        .map(|name| find_bank(name).with_context(|| format!("Неизвестный банк: '{}'", name)))
        .collect()
}

/// Проверяет, что каталог выгрузок существует.
fn check_dumps_dir(args: &Args) -> anyhow::Result<()> {
    if !args.dumps.is_dir() {
        bail!("Каталог выгрузок не найден: {}", args.dumps.display());
    }
    Ok(())
}

fn run<W: Write>(args: &Args, out: W) -> anyhow::Result<Vec<BankRun>> {
    check_dumps_dir(args)?;
    let banks = select_banks(&args.banks)?;
    let year = args.year.unwrap_or_else(|| chrono::Local::now().year());

    let mut template = ReportTemplate::build(year).context("Не удалось построить шаблон отчета")?;
    let mut status = StatusWriter::new(out);

    let runs = run_banks(banks, &args.dumps, &mut template, &mut status)?;

    if args.dry_run {
        status.done(None)?;
    } else {
        ReportWriter::save(&template, &args.output)
            .with_context(|| format!("Не удалось записать отчет '{}'", args.output.display()))?;
        status.done(Some(&args.output))?;
    }

    Ok(runs)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let stdout = io::stdout();
    match run(&args, stdout.lock()) {
        Ok(runs) => {
            let filled = runs.iter().filter(|r| r.extraction.is_some()).count();
            tracing::info!("Обработано банков: {} из {}", filled, runs.len());
        }
        Err(e) => {
            eprintln!("Ошибка: {:#}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feebench_parser::BankState;
    use std::fs;

    const SAMPLE: &str = "=== BANK: Yapı ve Kredi Bankası A.Ş. ===
--- TABLE 1 ---
SUB-HEADING: Düzenli EFT Gönderimi
Düzenli EFT | Dijital Kanallar | 0-6.300 TL | 4,50 TL
Düzenli EFT | Dijital Kanallar | 6.300-304.800 TL | 9 TL
Düzenli EFT | Dijital Kanallar | 304.800 TL üstü | 13,50 TL
";

    fn args(dir: &std::path::Path, extra: &[&str]) -> Args {
        let mut argv = vec![
            "feebench-runner".to_string(),
            "--dumps".to_string(),
            dir.display().to_string(),
            "--output".to_string(),
            dir.join("out.csv").display().to_string(),
            "--year".to_string(),
            "2025".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::parse_from(argv)
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ykb = find_bank("YKB").unwrap();
        fs::write(dir.path().join(ykb.dump_file_name()), SAMPLE).unwrap();

        let mut out = Vec::new();
        let runs = run(&args(dir.path(), &["--dry-run", "--bank", "YKB"]), &mut out).unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].state, BankState::Mapped);
        assert!(!dir.path().join("out.csv").exists());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  DÜZENLİ EFT: 4,50 TRY - 9 TRY - 13,50 TRY\n"));
        assert!(text.ends_with("[DONE] Dry run, nothing written\n"));
    }

    #[test]
    fn test_full_run_saves_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let runs = run(&args(dir.path(), &[]), &mut out).unwrap();

        assert_eq!(runs.len(), BANKS.len());
        assert!(runs.iter().all(|r| r.state == BankState::SkippedMissingDump));
        let report = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert!(report.starts_with("BENCHMARKING-2025,"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().last().unwrap().starts_with("[DONE] Saved filled report -> "));
    }

    #[test]
    fn test_unknown_bank_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(dir.path(), &["--bank", "NOBANK"]), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("NOBANK"));
    }

    #[test]
    fn test_missing_dumps_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(check_dumps_dir(&args(&missing, &[])).is_err());
        assert!(check_dumps_dir(&args(dir.path(), &[])).is_ok());
    }
}
