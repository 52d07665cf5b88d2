//! Persisting rendered reports

use super::formatter::{Formatter, TextFormatter};
use super::generator::ResearchReport;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// File name for a report: `{TICKER}_{industry}_{YYYYmmdd_HHMMSS}.txt`
pub fn report_file_name(report: &ResearchReport) -> String {
    format!(
        "{}_{}_{}.txt",
        report.symbol,
        report.industry.code(),
        report.generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Render `report` as text into `dir`, creating the directory if needed.
pub async fn save_report(dir: &Path, report: &ResearchReport) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_file_name(report));
    tokio::fs::write(&path, TextFormatter.render(report)).await?;
    tracing::info!(symbol = %report.symbol, path = %path.display(), "Report saved");
    Ok(path)
}
