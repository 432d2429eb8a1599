use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::pdf::export_pdf;
use crate::export::{Report, ReportFormat};
use std::path::{Path, PathBuf};

pub struct ReportLogic;

impl ReportLogic {
    /// `<Name>_Attendance.<ext>`, spaces folded to underscores.
    pub fn default_file_name(student: &str, format: ReportFormat) -> PathBuf {
        let stem: String = student
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
            .collect();
        PathBuf::from(format!("{stem}_Attendance.{}", format.as_str()))
    }

    /// Write `report` to `path`, asking before overwriting unless `force`.
    pub fn export(report: &Report, format: ReportFormat, path: &Path, force: bool) -> AppResult<()> {
        ensure_writable(path, force)?;

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        match format {
            ReportFormat::Pdf => export_pdf(report, path),
            ReportFormat::Csv => export_csv(report, path),
            ReportFormat::Json => export_json(report, path),
        }
    }
}
