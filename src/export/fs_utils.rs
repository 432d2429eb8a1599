use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, prompt, warning};
use std::path::Path;

/// Whether `path` may be (over)written.
///
/// A missing file or `force` pass straight through; an existing file needs
/// an explicit "y" on stdin.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    let ans = prompt("Overwrite? [y/N]:")?.to_ascii_lowercase();
    if ans == "y" || ans == "yes" {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::Export(
            "export cancelled: existing file not overwritten".into(),
        ))
    }
}
