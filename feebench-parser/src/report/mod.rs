//! Итоговый отчет: сетка строк и столбцов, перенос записей банков в сетку,
//! запись в CSV.

pub mod mapper;
pub mod template;
pub mod writer;

pub use mapper::map_record;
pub use template::ReportTemplate;
pub use writer::ReportWriter;
