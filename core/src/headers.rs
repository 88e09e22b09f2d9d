use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Response headers keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: BTreeMap<String, String>,
}

impl HeaderMap {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }
}

/// Parses a `curl -D` style dump. Status lines and lines without a colon are
/// skipped; a repeated header keeps its last value.
pub fn parse_headers(raw: &str) -> HeaderMap {
    let mut entries = BTreeMap::new();
    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || is_status_line(line) {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            entries.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }
    HeaderMap { entries }
}

fn is_status_line(line: &str) -> bool {
    line.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http/"))
}

/// Lookup key and display name of every header the report checks, in report order.
pub const SECURITY_HEADER_CHECKLIST: [(&str, &str); 5] = [
    ("strict-transport-security", "Strict-Transport-Security"),
    ("content-security-policy", "Content-Security-Policy"),
    ("x-content-type-options", "X-Content-Type-Options"),
    ("referrer-policy", "Referrer-Policy"),
    ("permissions-policy", "Permissions-Policy"),
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStatus {
    Present,
    Missing,
}

impl fmt::Display for HeaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HeaderStatus::Present => "✅ present",
            HeaderStatus::Missing => "❌ missing",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HeaderCheck {
    pub header: String,
    pub status: HeaderStatus,
}

pub fn summarize_headers(headers: &HeaderMap) -> Vec<HeaderCheck> {
    SECURITY_HEADER_CHECKLIST
        .iter()
        .map(|(key, display)| HeaderCheck {
            header: display.to_string(),
            status: if headers.contains(key) {
                HeaderStatus::Present
            } else {
                HeaderStatus::Missing
            },
        })
        .collect()
}
