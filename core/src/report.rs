use crate::artifact::ArtifactKind;
use crate::headers::HeaderCheck;
use crate::zap::{sort_by_risk, ZapAlert};
use time::macros::format_description;
use time::OffsetDateTime;

const EXECUTIVE_SUMMARY: [&str; 2] = [
    "Performed owner-authorized, low-risk security testing: header review, TLS posture check, baseline passive scan, and API allowlist verification.",
    "No intrusive exploitation or brute forcing was performed.",
];

const ALLOWLIST_GUIDANCE: &str = "**Interpretation guidance:** Only allowlisted routes should return 200; non-allowlisted should return 404; POST should be rejected.";

const ZAP_FALLBACK: &str =
    "No ZAP JSON alerts parsed (check artifacts folder for HTML/JSON output).";

const RECOMMENDATIONS: [&str; 4] = [
    "**Missing headers**: If any are marked missing above, add/adjust `staticwebapp.config.json` to enforce them globally.",
    "**API allowlist**: Ensure the function only allows exact routes and rejects traversal/open-proxy patterns.",
    "**TLS issues**: If testssl flags weak ciphers/protocols, document and remediate (SWA managed TLS is typically strong).",
    "**ZAP baseline findings**: Review any Medium/High items first; confirm whether they are true positives.",
];

const APPENDICES: [(&str, ArtifactKind); 4] = [
    ("ZAP HTML report", ArtifactKind::ZapHtml),
    ("ZAP JSON report", ArtifactKind::ZapJson),
    ("Nikto output", ArtifactKind::Nikto),
    ("testssl output", ArtifactKind::Testssl),
];

/// `YYYY-MM-DD HH:MM:SSZ` in UTC.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]Z"
    ))
    .unwrap_or_else(|_| "unknown".to_string())
}

/// Everything that ends up in the report, already read and parsed. Excerpts are
/// expected to be truncated by the caller.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub title: String,
    pub target_url: String,
    pub run: String,
    pub generated_at: String,
    pub header_checks: Vec<HeaderCheck>,
    pub raw_headers: String,
    pub api_allowlist: String,
    pub testssl: String,
    pub nikto: String,
    pub zap_alerts: Vec<ZapAlert>,
    pub zap_row_cap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLevel {
    Title,
    Section,
    Subsection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: SectionLevel,
    pub heading: String,
    pub body: String,
}

impl Section {
    fn new(level: SectionLevel, heading: impl Into<String>, body: String) -> Self {
        Self {
            level,
            heading: heading.into(),
            body,
        }
    }

    fn render(&self) -> String {
        let heading = match self.level {
            SectionLevel::Title => format!("# {}", self.heading),
            SectionLevel::Section => format!("---\n\n## {}", self.heading),
            SectionLevel::Subsection => format!("### {}", self.heading),
        };
        format!("{heading}\n\n{}", self.body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    pub sections: Vec<Section>,
}

impl ReportDocument {
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn assemble_report(inputs: &ReportInputs) -> ReportDocument {
    let mut sections = Vec::new();

    sections.push(Section::new(
        SectionLevel::Title,
        inputs.title.as_str(),
        format!(
            "**Target:** {}\n\n**Run timestamp (UTC):** {}\n\n**Artifacts:** `{}`\n",
            inputs.target_url, inputs.generated_at, inputs.run
        ),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "Executive summary",
        EXECUTIVE_SUMMARY
            .iter()
            .map(|line| format!("- {line}\n"))
            .collect(),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "HTTP security headers",
        render_markdown_table(
            &["Header", "Status"],
            inputs
                .header_checks
                .iter()
                .map(|check| vec![check.header.clone(), check.status.to_string()]),
        ),
    ));

    sections.push(Section::new(
        SectionLevel::Subsection,
        "Raw response headers (truncated)",
        fenced(&inputs.raw_headers),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "API proxy allowlist behavior",
        format!("{}\n{ALLOWLIST_GUIDANCE}\n", fenced(&inputs.api_allowlist)),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "TLS posture (testssl.sh excerpt)",
        fenced(&inputs.testssl),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "Nikto (low-risk scan) excerpt",
        fenced(&inputs.nikto),
    ));

    let zap_body = if inputs.zap_alerts.is_empty() {
        format!("{ZAP_FALLBACK}\n")
    } else {
        render_markdown_table(
            &["Risk", "Alert", "Instances"],
            sort_by_risk(&inputs.zap_alerts, inputs.zap_row_cap)
                .into_iter()
                .map(|alert| vec![alert.risk, alert.name, alert.instance_count.to_string()]),
        )
    };
    sections.push(Section::new(
        SectionLevel::Section,
        "OWASP ZAP Baseline (passive)",
        zap_body,
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "Findings and recommendations",
        RECOMMENDATIONS
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("{}. {item}\n", idx + 1))
            .collect(),
    ));

    sections.push(Section::new(
        SectionLevel::Section,
        "Appendices",
        APPENDICES
            .iter()
            .map(|(label, kind)| {
                format!("- {label}: `{}/{}`\n", inputs.run, kind.relative_path())
            })
            .collect(),
    ));

    ReportDocument { sections }
}

fn render_markdown_table<I>(columns: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut md = String::new();
    md.push('|');
    for column in columns {
        md.push(' ');
        md.push_str(&sanitize_markdown_cell(column));
        md.push_str(" |");
    }
    md.push('\n');

    md.push('|');
    for _ in columns {
        md.push_str("---|");
    }
    md.push('\n');

    for row in rows {
        md.push('|');
        for value in row {
            md.push(' ');
            md.push_str(&sanitize_markdown_cell(&value));
            md.push_str(" |");
        }
        md.push('\n');
    }

    md
}

fn sanitize_markdown_cell(value: &str) -> String {
    let replaced = value.replace('\n', "<br>");
    replaced.replace('|', "\\|")
}

/// Wraps text verbatim in a code fence longer than any backtick run inside it.
/// A trailing newline already in the text is reused, so no blank line is left
/// before the closing fence.
fn fenced(text: &str) -> String {
    let longest_run = text
        .split(|ch: char| ch != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);

    let mut md = String::with_capacity(text.len() + fence.len() * 2 + 2);
    md.push_str(&fence);
    md.push('\n');
    md.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        md.push('\n');
    }
    md.push_str(&fence);
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{parse_headers, summarize_headers};
    use time::macros::datetime;

    impl ReportDocument {
        fn section(&self, heading: &str) -> Option<&Section> {
            self.sections
                .iter()
                .find(|section| section.heading == heading)
        }
    }

    fn sample_inputs() -> ReportInputs {
        ReportInputs {
            title: "Security Test Report".to_string(),
            target_url: "https://app.example.net/".to_string(),
            run: "reports/raw/run-1".to_string(),
            generated_at: "2026-10-19 08:30:00Z".to_string(),
            header_checks: summarize_headers(&parse_headers(
                "HTTP/2 200\nx-content-type-options: nosniff\n",
            )),
            raw_headers: "HTTP/2 200\nx-content-type-options: nosniff\n".to_string(),
            api_allowlist: "GET /api/status -> 200".to_string(),
            testssl: "TLS 1.3 offered (OK)".to_string(),
            nikto: "+ Server: No banner retrieved".to_string(),
            zap_alerts: vec![
                ZapAlert {
                    risk: "Low (Medium)".to_string(),
                    name: "Cookie without SameSite".to_string(),
                    instance_count: 2,
                },
                ZapAlert {
                    risk: "Medium (High)".to_string(),
                    name: "CSP: Wildcard | Directive".to_string(),
                    instance_count: 1,
                },
            ],
            zap_row_cap: 50,
        }
    }

    #[test]
    fn formats_timestamp_in_utc() {
        assert_eq!(
            format_timestamp(datetime!(2026-03-04 05:06:07 UTC)),
            "2026-03-04 05:06:07Z"
        );
    }

    #[test]
    fn sections_follow_fixed_order() {
        let document = assemble_report(&sample_inputs());
        let headings: Vec<&str> = document
            .sections
            .iter()
            .map(|section| section.heading.as_str())
            .collect();
        assert_eq!(
            headings,
            vec![
                "Security Test Report",
                "Executive summary",
                "HTTP security headers",
                "Raw response headers (truncated)",
                "API proxy allowlist behavior",
                "TLS posture (testssl.sh excerpt)",
                "Nikto (low-risk scan) excerpt",
                "OWASP ZAP Baseline (passive)",
                "Findings and recommendations",
                "Appendices",
            ]
        );
    }

    #[test]
    fn renders_metadata_and_header_table() {
        let markdown = assemble_report(&sample_inputs()).render();
        assert!(markdown.starts_with("# Security Test Report\n\n**Target:** https://app.example.net/\n"));
        assert!(markdown.contains("**Run timestamp (UTC):** 2026-10-19 08:30:00Z"));
        assert!(markdown.contains("**Artifacts:** `reports/raw/run-1`"));
        assert!(markdown.contains(
            "| Header | Status |\n|---|---|\n| Strict-Transport-Security | ❌ missing |\n"
        ));
        assert!(markdown.contains("| X-Content-Type-Options | ✅ present |"));
        assert!(markdown.ends_with("- testssl output: `reports/raw/run-1/testssl.txt`\n"));
    }

    #[test]
    fn zap_table_is_sorted_and_cells_are_escaped() {
        let document = assemble_report(&sample_inputs());
        let zap = document
            .section("OWASP ZAP Baseline (passive)")
            .expect("zap section present");
        assert_eq!(
            zap.body,
            "| Risk | Alert | Instances |\n|---|---|---|\n\
| Medium (High) | CSP: Wildcard \\| Directive | 1 |\n\
| Low (Medium) | Cookie without SameSite | 2 |\n"
        );
    }

    #[test]
    fn zap_table_is_capped() {
        let mut inputs = sample_inputs();
        inputs.zap_alerts = (0..60)
            .map(|i| ZapAlert {
                risk: (if i % 2 == 0 { "Low (Low)" } else { "High (Medium)" }).to_string(),
                name: format!("alert-{i}"),
                instance_count: 1,
            })
            .collect();
        let document = assemble_report(&inputs);
        let body = &document
            .section("OWASP ZAP Baseline (passive)")
            .expect("zap section present")
            .body;
        let rows: Vec<&str> = body.lines().skip(2).collect();
        assert_eq!(rows.len(), 50);
        assert!(rows[0].starts_with("| High (Medium) | alert-1 |"));
        assert!(rows[29].starts_with("| High (Medium) | alert-59 |"));
        assert!(rows[30].starts_with("| Low (Low) | alert-0 |"));
    }

    #[test]
    fn empty_inputs_produce_empty_excerpts_and_zap_fallback() {
        let inputs = ReportInputs {
            run: "reports/raw/run-2".to_string(),
            zap_row_cap: 50,
            ..ReportInputs::default()
        };
        let document = assemble_report(&inputs);
        assert_eq!(
            document.section("TLS posture (testssl.sh excerpt)").map(|s| s.body.as_str()),
            Some("```\n```\n")
        );
        assert_eq!(
            document.section("Nikto (low-risk scan) excerpt").map(|s| s.body.as_str()),
            Some("```\n```\n")
        );
        assert_eq!(
            document.section("OWASP ZAP Baseline (passive)").map(|s| s.body.as_str()),
            Some("No ZAP JSON alerts parsed (check artifacts folder for HTML/JSON output).\n")
        );
        let allowlist = document
            .section("API proxy allowlist behavior")
            .expect("allowlist section present");
        assert!(allowlist.body.starts_with("```\n```\n\n**Interpretation guidance:**"));
    }

    #[test]
    fn excerpts_are_embedded_verbatim() {
        let mut inputs = sample_inputs();
        inputs.testssl = "line one\n  indented | pipe\n".to_string();
        let document = assemble_report(&inputs);
        assert_eq!(
            document
                .section("TLS posture (testssl.sh excerpt)")
                .map(|s| s.body.as_str()),
            Some("```\nline one\n  indented | pipe\n```\n")
        );
    }

    #[test]
    fn fence_outgrows_backticks_in_excerpt() {
        assert_eq!(fenced("a ``` b"), "````\na ``` b\n````\n");
        assert_eq!(fenced("`x`"), "```\n`x`\n```\n");
    }

    #[test]
    fn rendering_is_deterministic() {
        let inputs = sample_inputs();
        assert_eq!(
            assemble_report(&inputs).render(),
            assemble_report(&inputs).render()
        );
    }

    #[test]
    fn level_two_sections_are_separated_by_rules() {
        let markdown = assemble_report(&sample_inputs()).render();
        assert!(markdown.contains("\n---\n\n## Executive summary\n\n- Performed owner-authorized"));
        assert!(markdown.contains(
            "| Permissions-Policy | ❌ missing |\n\n### Raw response headers (truncated)\n\n```\nHTTP/2 200\n"
        ));
        assert!(markdown.contains("1. **Missing headers**"));
        assert!(markdown.contains("4. **ZAP baseline findings**"));
    }
}
