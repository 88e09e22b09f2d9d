use std::env;
use std::path::{Path, PathBuf};

pub const TARGET_URL_ENV: &str = "TARGET_URL";
pub const DEFAULT_TARGET_URL: &str = "https://proud-ground-0ba6dc70f.1.azurestaticapps.net/";
pub const DEFAULT_TITLE: &str = "Security Test Report — The Syndicate (SWA)";
pub const DEFAULT_POINTER_PATH: &str = "reports/raw/LATEST_RUN_PATH.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "reports/derived/final-security-report.md";

/// Character ceiling for free-form tool excerpts (testssl, nikto, allowlist probe).
pub const DEFAULT_EXCERPT_LIMIT: usize = 12_000;
/// Character ceiling for the raw header dump embedded in the report.
pub const DEFAULT_HEADER_EXCERPT_LIMIT: usize = 4_000;
pub const DEFAULT_ZAP_ROW_CAP: usize = 50;

/// Everything the pipeline needs to know about where to read and write.
///
/// Built once at the process boundary and handed to [`crate::ReportGenerator`];
/// nothing below this reads the environment.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub root: PathBuf,
    pub pointer_path: PathBuf,
    pub output_path: PathBuf,
    pub target_url: String,
    pub title: String,
    pub excerpt_limit: usize,
    pub header_excerpt_limit: usize,
    pub zap_row_cap: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pointer_path: PathBuf::from(DEFAULT_POINTER_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            target_url: DEFAULT_TARGET_URL.to_string(),
            title: DEFAULT_TITLE.to_string(),
            excerpt_limit: DEFAULT_EXCERPT_LIMIT,
            header_excerpt_limit: DEFAULT_HEADER_EXCERPT_LIMIT,
            zap_row_cap: DEFAULT_ZAP_ROW_CAP,
        }
    }
}

impl ReportConfig {
    /// Defaults, with the target URL taken from `TARGET_URL` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(target) = env::var(TARGET_URL_ENV) {
            config.target_url = target;
        }
        config
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn resolved_pointer_path(&self) -> PathBuf {
        resolve_against(&self.root, &self.pointer_path)
    }

    pub fn resolved_output_path(&self) -> PathBuf {
        resolve_against(&self.root, &self.output_path)
    }
}

pub(crate) fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_root() {
        let config = ReportConfig::default().with_root("/srv/site");
        assert_eq!(
            config.resolved_pointer_path(),
            PathBuf::from("/srv/site/reports/raw/LATEST_RUN_PATH.txt")
        );
        assert_eq!(
            config.resolved_output_path(),
            PathBuf::from("/srv/site/reports/derived/final-security-report.md")
        );
    }

    #[test]
    fn absolute_output_path_is_kept() {
        let mut config = ReportConfig::default().with_root("/srv/site");
        config.output_path = PathBuf::from("/tmp/out.md");
        assert_eq!(config.resolved_output_path(), PathBuf::from("/tmp/out.md"));
    }
}
