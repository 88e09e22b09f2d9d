use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// One alert from a ZAP baseline report, flattened out of its site.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ZapAlert {
    pub risk: String,
    pub name: String,
    pub instance_count: usize,
}

/// Flattens `{ site: [ { alerts: [ { riskdesc, name, instances } ] } ] }` into
/// alerts in encounter order. Anything that is not valid JSON with an object at
/// the top yields no alerts.
pub fn extract_alerts(json: &str) -> Vec<ZapAlert> {
    let document: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(err) => {
            if !json.trim().is_empty() {
                warn!(error = %err, "ignoring malformed ZAP report");
            }
            return Vec::new();
        }
    };
    let Value::Object(document) = document else {
        warn!("ignoring ZAP report without a top-level object");
        return Vec::new();
    };

    let mut alerts = Vec::new();
    for site in list_field(&document, "site") {
        let Value::Object(site) = site else {
            continue;
        };
        for alert in list_field(site, "alerts") {
            let Value::Object(alert) = alert else {
                continue;
            };
            alerts.push(ZapAlert {
                risk: string_field(alert, "riskdesc"),
                name: string_field(alert, "name"),
                instance_count: list_field(alert, "instances").len(),
            });
        }
    }
    alerts
}

fn list_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match object.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Ranks a risk descriptor such as `"High (Medium)"` by its leading word.
pub fn risk_rank(label: &str) -> u8 {
    let level = label.split_whitespace().next().unwrap_or_default();
    match level.to_lowercase().as_str() {
        "critical" => 4,
        "high" => 3,
        "medium" | "moderate" => 2,
        "low" => 1,
        "informational" | "info" | "note" => 0,
        _ => 0,
    }
}

/// Highest risk first, keeping scanner order for equal risks, at most `cap` rows.
pub fn sort_by_risk(alerts: &[ZapAlert], cap: usize) -> Vec<ZapAlert> {
    let mut sorted = alerts.to_vec();
    sorted.sort_by(|a, b| risk_rank(&b.risk).cmp(&risk_rank(&a.risk)));
    sorted.truncate(cap);
    sorted
}
