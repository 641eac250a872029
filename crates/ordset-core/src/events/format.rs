//! Presentation of stored events.

use chrono::DateTime;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use super::EventRecord;
use crate::traits::ObjectFields;

/// Fields left out of [`EventRecord::json_string`].
const IDENTITY_FIELDS: &[&str] = &["eid", "uid", "type", "ip", "user"];

/// Escape the characters that are unsafe inside HTML text or attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Four-space pretty JSON of `fields` without the identity fields.
pub fn identity_free_json(fields: &ObjectFields) -> String {
    let rest: ObjectFields = fields
        .iter()
        .filter(|(k, _)| !IDENTITY_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    match Value::Object(rest).serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(super) fn render(mut fields: ObjectFields) -> EventRecord {
    for value in fields.values_mut() {
        if let Value::String(s) = value {
            *s = escape_html(s);
        }
    }
    let json_string = identity_free_json(&fields);
    let timestamp_iso = fields
        .get("timestamp")
        .and_then(timestamp_millis)
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc2822());

    EventRecord {
        fields,
        json_string,
        timestamp_iso,
    }
}

/// `  * <time> <type>[ <text>] (uid: <uid>)`
pub(super) fn summary_line(event: &EventRecord) -> String {
    let mut line = format!(
        "  * {} {}",
        event.timestamp_iso.as_deref().unwrap_or_default(),
        event.event_type().unwrap_or_default()
    );
    match event.fields.get("text") {
        Some(Value::String(text)) if !text.is_empty() => {
            line.push(' ');
            line.push_str(text);
        }
        _ => {}
    }
    let uid = match event.fields.get("uid") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    };
    line.push_str(&format!(" (uid: {uid})"));
    line
}
