pub mod artifact;
pub mod config;
pub mod error;
pub mod headers;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod zap;

pub use artifact::{
    locate_run, read_text, truncate_chars, try_read_text, ArtifactKind, RunReference,
};
pub use config::ReportConfig;
pub use error::ReportError;
pub use headers::{
    parse_headers, summarize_headers, HeaderCheck, HeaderMap, HeaderStatus,
    SECURITY_HEADER_CHECKLIST,
};
pub use output::write_report;
pub use pipeline::{CollectedRun, GeneratedReport, ReportGenerator, RunSummary};
pub use report::{
    assemble_report, format_timestamp, ReportDocument, ReportInputs, Section, SectionLevel,
};
pub use zap::{extract_alerts, risk_rank, sort_by_risk, ZapAlert};
