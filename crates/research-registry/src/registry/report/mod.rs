//! Tabular report formatting. Rendering to PDF or spreadsheets happens behind
//! [`TableRenderer`].

mod format;
mod labels;
mod render;
mod tables;

pub use format::{
    ellipsize, format_amount, format_date, format_money, format_percent, format_period,
    truncate_chars,
};
pub use labels::{EnglishLabels, Translator};
pub use render::{CsvRenderer, ReportError, TableRenderer};
pub use tables::{
    build_report, ReportBuilder, ReportDocument, ReportKind, ReportTable, UnknownReportKind,
};
