//! CLI-утилита для разбора одной выгрузки по ярусам.
//!
//! Показывает для каждого поля значение каждого яруса и ярус, давший
//! итоговое значение.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use feebench_parser::config::{find_bank, BANKS};
use feebench_parser::{extract, BankProfile, Dump, Extraction, FieldKey, Tier};

/// Feebench Inspector - диагностика извлечения тарифов.
#[derive(Parser)]
#[command(name = "feebench-inspector")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Файл выгрузки ("-" для стандартного ввода)
    file: PathBuf,

    /// Банк (имя или заголовок столбца); по умолчанию из строки `=== BANK:`
    #[arg(long)]
    bank: Option<String>,

    /// Показать только поля, оставшиеся пустыми
    #[arg(long)]
    only_empty: bool,

    /// Подробный вывод
    #[arg(short, long)]
    verbose: bool,
}

const TIERS: [Tier; 4] = [Tier::Strict, Tier::Tolerant, Tier::Generic, Tier::Override];

fn resolve_bank(args: &Args, dump: &Dump) -> anyhow::Result<&'static BankProfile> {
    match (&args.bank, &dump.bank) {
        (Some(name), _) => find_bank(name).with_context(|| format!("Неизвестный банк: '{}'", name)),
        (None, Some(name)) => Ok(find_bank(name).unwrap_or(&BANKS[0])),
        (None, None) => Ok(&BANKS[0]),
    }
}

fn print_report<W: Write>(
    out: &mut W,
    bank: &BankProfile,
    extraction: &Extraction,
    only_empty: bool,
) -> io::Result<()> {
    writeln!(out, "Банк: {} ({})", bank.display_name, bank.column_header)?;
    writeln!(
        out,
        "Заполнено: {} из {}",
        extraction.record.filled(),
        FieldKey::COUNT
    )?;

    for key in FieldKey::ALL {
        let value = extraction.record.get(key);
        if only_empty && !value.is_empty() {
            continue;
        }
        let source = extraction
            .provenance
            .source(key)
            .map(|t| t.name())
            .unwrap_or("-");
        writeln!(out)?;
        writeln!(out, "{} [{}]", key, source)?;
        for tier in TIERS {
            let Some(record) = extraction.tier(tier) else {
                continue;
            };
            let tier_value = record.get(key);
            let shown = if tier_value.is_empty() {
                "(empty)"
            } else {
                tier_value
            };
            writeln!(out, "  {:<9} {}", tier.name(), shown)?;
        }
    }
    Ok(())
}

fn load_dump(args: &Args) -> anyhow::Result<Dump> {
    if args.file.as_os_str() == "-" {
        return Dump::from_read(&mut io::stdin().lock())
            .context("Не удалось прочитать стандартный ввод");
    }
    Dump::from_path(&args.file)
        .with_context(|| format!("Не удалось прочитать '{}'", args.file.display()))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let dump = load_dump(args)?;
    let bank = resolve_bank(args, &dump)?;
    let extraction = extract(&dump, bank);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_report(&mut out, bank, &extraction, args.only_empty)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default = if args.verbose {
        "feebench_parser=trace"
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

    if let Err(e) = run(&args) {
        eprintln!("Ошибка: {:#}", e);
        process::exit(1);
    }
}
