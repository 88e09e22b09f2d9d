use crate::config::resolve_against;
use crate::error::ReportError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files a scan run is expected to leave in its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Headers,
    Testssl,
    Nikto,
    ApiAllowlist,
    ZapJson,
    ZapHtml,
}

impl ArtifactKind {
    pub fn relative_path(&self) -> &'static str {
        match self {
            ArtifactKind::Headers => "headers.txt",
            ArtifactKind::Testssl => "testssl.txt",
            ArtifactKind::Nikto => "nikto.txt",
            ArtifactKind::ApiAllowlist => "api_allowlist_checks.txt",
            ArtifactKind::ZapJson => "zap/zap_baseline_report.json",
            ArtifactKind::ZapHtml => "zap/zap_baseline_report.html",
        }
    }
}

/// The run directory named by the pointer file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReference {
    raw: String,
    dir: PathBuf,
}

impl RunReference {
    pub fn new(raw: impl Into<String>, root: &Path) -> Self {
        let raw = raw.into();
        let dir = resolve_against(root, Path::new(&raw));
        Self { raw, dir }
    }

    /// Path text exactly as the scan driver wrote it (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.relative_path())
    }
}

/// Resolves the latest run from the pointer file. A missing pointer is the one
/// condition the pipeline cannot recover from.
pub fn locate_run(pointer: &Path, root: &Path) -> Result<RunReference, ReportError> {
    if !pointer.exists() {
        return Err(ReportError::MissingRunPointer {
            path: pointer.to_path_buf(),
        });
    }
    let contents =
        try_read_text(pointer, None).map_err(|source| ReportError::PointerUnreadable {
            path: pointer.to_path_buf(),
            source,
        })?;
    let raw = contents.trim();
    if raw.is_empty() {
        warn!(pointer = %pointer.display(), "run pointer is empty; reading artifacts from the root");
    }
    debug!(run = raw, "located scan run");
    Ok(RunReference::new(raw, root))
}

/// Single read attempt. Invalid UTF-8 sequences are dropped, so they never
/// count toward `limit`.
pub fn try_read_text(path: &Path, limit: Option<usize>) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    Ok(match limit {
        Some(limit) => truncate_chars(&text, limit),
        None => text,
    })
}

/// Like [`try_read_text`] but an unreadable artifact is just empty content.
pub fn read_text(path: &Path, limit: Option<usize>) -> String {
    match try_read_text(path, limit) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "artifact unavailable, using empty content");
            String::new()
        }
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
