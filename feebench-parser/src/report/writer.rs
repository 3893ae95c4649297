//! Запись отчета в CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::report::ReportTemplate;

/// Writer отчета в формате CSV.
pub struct ReportWriter;

impl ReportWriter {
    /// Записывает сетку в любой приемник, реализующий трейт Write.
    pub fn write_to<W: Write>(template: &ReportTemplate, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in template.grid() {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Сохраняет сетку в файл.
    pub fn save(template: &ReportTemplate, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        Self::write_to(template, BufWriter::new(file))
    }
}

impl ReportTemplate {
    /// Записывает отчет в любой приемник, реализующий трейт Write.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        ReportWriter::write_to(self, writer)
    }
}
