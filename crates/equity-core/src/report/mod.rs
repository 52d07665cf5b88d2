//! Research report generation, rendering and persistence

mod formatter;
mod generator;
mod writer;

pub use formatter::{
    Formatter, FormatterFactory, HtmlFormatter, ReportFormat, TextFormatter, escape_html,
};
pub use generator::{ReportGenerator, ReportSection, ResearchReport, SectionKind};
pub use writer::{report_file_name, save_report};
