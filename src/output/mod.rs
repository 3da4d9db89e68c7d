//! Presentation and export of ranked batches

pub mod formatter;
pub mod report;

pub use formatter::{
    save_report_to_file, suggest_filename, ConsoleFormatter, CsvFormatter, JsonFormatter,
    OutputFormatter, ReportGenerator,
};
pub use report::{BatchReport, ExportRow};
