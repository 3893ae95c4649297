//! Строки прогресса прогона на stdout.
//!
//! Каждое событие - отдельная строка с префиксом `[OK]`, `[WARN]`, `[DONE]`
//! или блок `[PREVIEW]` ... `[/PREVIEW]`. Логи идут в stderr и с этими
//! строками не смешиваются.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use crate::types::FeeRecord;

/// Подстановка для пустого поля в предпросмотре.
pub const EMPTY_MARKER: &str = "(empty)";

/// Writer протокола прогресса.
pub struct StatusWriter<W: Write> {
    out: W,
}

impl<W: Write> StatusWriter<W> {
    pub fn new(out: W) -> Self {
        StatusWriter { out }
    }

    pub fn ok(&mut self, header: &str, file: &Path) -> io::Result<()> {
        self.line(format_args!("[OK] Filled column '{}' from {}", header, file.display()))
    }

    pub fn warn(&mut self, message: impl Display) -> io::Result<()> {
        self.line(format_args!("[WARN] {message}"))
    }

    pub fn done(&mut self, output: Option<&Path>) -> io::Result<()> {
        match output {
            Some(path) => {
                self.line(format_args!("[DONE] Saved filled report -> {}", path.display()))
            }
            None => self.line(format_args!("[DONE] Dry run, nothing written")),
        }
    }

    /// Предпросмотр записи банка: по строке на поле в каноническом порядке.
    pub fn preview(
        &mut self,
        bank: &str,
        header: &str,
        file: &Path,
        record: &FeeRecord,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "[PREVIEW] {} -> column '{}' (from {})",
            bank,
            header,
            file.display()
        )?;
        for (key, value) in record.iter() {
            let value = if value.is_empty() {
                EMPTY_MARKER
            } else {
                value
            };
            writeln!(self.out, "  {}: {}", key, value)?;
        }
        self.line(format_args!("[/PREVIEW]"))
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.out, "{args}")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKey;

    fn text(status: StatusWriter<Vec<u8>>) -> String {
        String::from_utf8(status.into_inner()).unwrap()
    }

    #[test]
    fn test_preview_lists_every_field() {
        let mut record = FeeRecord::new();
        record.set(FieldKey::ReturnedCheck, "50 TRY");
        let mut status = StatusWriter::new(Vec::new());
        status
            .preview("Akbank T.A.Ş.", "AKBANK", Path::new("fees_Akbank_T.A.Ş..txt"), &record)
            .unwrap();

        let out = text(status);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), FieldKey::COUNT + 2);
        assert_eq!(
            lines[0],
            "[PREVIEW] Akbank T.A.Ş. -> column 'AKBANK' (from fees_Akbank_T.A.Ş..txt)"
        );
        assert_eq!(lines[1], "  ŞANS OYUNLARI: (empty)");
        assert_eq!(lines[19], "  ÇEK İADE: 50 TRY");
        assert_eq!(lines[FieldKey::COUNT + 1], "[/PREVIEW]");
    }

    #[test]
    fn test_one_line_per_event() {
        let mut status = StatusWriter::new(Vec::new());
        status.ok("YKB", Path::new("fees_x.txt")).unwrap();
        status.warn("Dump not found: fees_y.txt (skipping)").unwrap();
        status.done(None).unwrap();
        assert_eq!(
            text(status),
            "[OK] Filled column 'YKB' from fees_x.txt\n\
             [WARN] Dump not found: fees_y.txt (skipping)\n\
             [DONE] Dry run, nothing written\n"
        );
    }
}
