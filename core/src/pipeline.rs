use crate::artifact::{locate_run, read_text, truncate_chars, ArtifactKind, RunReference};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::headers::{parse_headers, summarize_headers, HeaderCheck};
use crate::output::write_report;
use crate::report::{assemble_report, format_timestamp, ReportInputs};
use crate::zap::{extract_alerts, sort_by_risk, ZapAlert};
use serde::Serialize;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::debug;

/// Parsed view of a run, as printed by `secreport summary` and `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub target: String,
    pub run: String,
    pub generated_at: String,
    pub headers: Vec<HeaderCheck>,
    pub alerts: Vec<ZapAlert>,
}

#[derive(Debug, Clone)]
pub struct CollectedRun {
    pub run: RunReference,
    pub inputs: ReportInputs,
}

impl CollectedRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            target: self.inputs.target_url.clone(),
            run: self.run.as_str().to_string(),
            generated_at: self.inputs.generated_at.clone(),
            headers: self.inputs.header_checks.clone(),
            alerts: sort_by_risk(&self.inputs.zap_alerts, self.inputs.zap_row_cap),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub output_path: PathBuf,
    pub summary: RunSummary,
}

#[derive(Debug, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Locates the latest run and reads every artifact. Only a missing or
    /// unreadable run pointer fails; absent artifacts become empty sections.
    pub fn collect(&self) -> Result<CollectedRun, ReportError> {
        self.collect_at(OffsetDateTime::now_utc())
    }

    pub fn collect_at(&self, now: OffsetDateTime) -> Result<CollectedRun, ReportError> {
        let config = &self.config;
        let run = locate_run(&config.resolved_pointer_path(), &config.root)?;
        let excerpt =
            |kind: ArtifactKind| read_text(&run.artifact_path(kind), Some(config.excerpt_limit));

        let raw_headers = read_text(&run.artifact_path(ArtifactKind::Headers), None);
        let header_checks = summarize_headers(&parse_headers(&raw_headers));
        let zap_json = read_text(&run.artifact_path(ArtifactKind::ZapJson), None);
        let zap_alerts = extract_alerts(&zap_json);
        debug!(
            run = run.as_str(),
            alerts = zap_alerts.len(),
            "collected scan artifacts"
        );

        let inputs = ReportInputs {
            title: config.title.clone(),
            target_url: config.target_url.clone(),
            run: run.as_str().to_string(),
            generated_at: format_timestamp(now),
            header_checks,
            raw_headers: truncate_chars(&raw_headers, config.header_excerpt_limit),
            api_allowlist: excerpt(ArtifactKind::ApiAllowlist),
            testssl: excerpt(ArtifactKind::Testssl),
            nikto: excerpt(ArtifactKind::Nikto),
            zap_alerts,
            zap_row_cap: config.zap_row_cap,
        };

        Ok(CollectedRun { run, inputs })
    }

    pub fn generate(&self) -> Result<GeneratedReport, ReportError> {
        self.generate_at(OffsetDateTime::now_utc())
    }

    pub fn generate_at(&self, now: OffsetDateTime) -> Result<GeneratedReport, ReportError> {
        let collected = self.collect_at(now)?;
        let document = assemble_report(&collected.inputs);
        let output_path = write_report(&self.config.resolved_output_path(), &document)?;
        Ok(GeneratedReport {
            output_path,
            summary: collected.summary(),
        })
    }
}
