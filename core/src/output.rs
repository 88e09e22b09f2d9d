use crate::error::ReportError;
use crate::report::ReportDocument;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the rendered document, replacing any previous report at `path`.
pub fn write_report(path: &Path, document: &ReportDocument) -> Result<PathBuf, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let contents = document.render();
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    info!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(path.to_path_buf())
}
