//! Line formatting for run events.
//!
//! Every function here is pure: an event goes in, the exact text appended to
//! the run log comes out. Missing optional fields are rendered with defaults
//! so formatting never fails.

use serde_json::Value;

use crate::run_events::{HostStats, RunEvent, UnreachableResult};

const BANNER_WIDTH: usize = 78;
const BANNER_MIN_FILLER: usize = 3;
const MISSING_ITEM: &str = "None";

pub const NO_HOSTS_LINE: &str =
    "FATAL: no hosts matched or all hosts have already failed -- aborting";

/// Decorates a phase label as `"\n{label} ***... "` padded towards 78 columns.
pub fn banner(label: &str) -> String {
    let filler = BANNER_WIDTH
        .saturating_sub(label.chars().count())
        .max(BANNER_MIN_FILLER);
    format!("\n{label} {} ", "*".repeat(filler))
}

/// Renders the log entries for one event, in append order.
pub fn render_event_lines(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::TaskStart {
            name,
            is_conditional,
        } => {
            let label = if *is_conditional {
                format!("NOTIFIED: [{name}]")
            } else {
                format!("TASK: [{name}]")
            };
            vec![banner(&label)]
        }
        RunEvent::Setup => vec![banner("GATHERING FACTS")],
        RunEvent::PlayStart { name } => vec![banner(&format!("PLAY [{name}]"))],
        RunEvent::HostOk {
            host,
            item,
            changed,
        } => {
            let status = if *changed { "changed" } else { "ok" };
            vec![format!(
                "{status}: [{host}] => (item={})",
                item.as_deref().unwrap_or(MISSING_ITEM)
            )]
        }
        RunEvent::HostFailed { host, item, result } => {
            let rendered = render_sorted_json(&Value::Object(result.clone()));
            let line = match present_item(item) {
                Some(item) => format!("failed: [{host}] => (item={item}) => {rendered}"),
                None => format!("failed: [{host}] => {rendered}"),
            };
            vec![line]
        }
        RunEvent::HostSkipped { host, item } => {
            let line = match present_item(item) {
                Some(item) => format!("skipping: [{host}] => (item={item})"),
                None => format!("skipping: [{host}]"),
            };
            vec![line]
        }
        RunEvent::HostUnreachable { host, item, result } => {
            let rendered = match result {
                UnreachableResult::Text(text) => text.clone(),
                UnreachableResult::Fields(fields) => render_repr(&Value::Object(fields.clone())),
            };
            let line = match present_item(item) {
                Some(item) => format!("fatal: [{host}] => (item={item}) => {rendered}"),
                None => format!("fatal: [{host}] => {rendered}"),
            };
            vec![line]
        }
        RunEvent::NoHosts => vec![NO_HOSTS_LINE.to_string()],
        RunEvent::Stats { hosts } => {
            let mut lines = Vec::with_capacity(hosts.len() + 1);
            lines.push(banner("PLAY RECAP"));
            lines.extend(hosts.iter().map(render_host_stats));
            lines
        }
    }
}

fn render_host_stats(stats: &HostStats) -> String {
    let summary = &stats.summary;
    format!(
        "Host: {}, ok: {}, failures: {}, unreachable: {}, changed: {}, skipped: {}",
        stats.host,
        summary.ok,
        summary.failures,
        summary.unreachable,
        summary.changed,
        summary.skipped
    )
}

fn present_item(item: &Option<String>) -> Option<&str> {
    item.as_deref().filter(|value| !value.is_empty())
}

/// Serializes JSON with sorted keys and `", "` / `": "` separators, the layout
/// the runner uses for its own result dumps.
pub fn render_sorted_json(value: &Value) -> String {
    let mut out = String::new();
    write_sorted_json(value, &mut out);
    out
}

fn write_sorted_json(value: &Value, out: &mut String) {
    match value {
        Value::Object(fields) => {
            let mut entries = fields.iter().collect::<Vec<_>>();
            entries.sort_by(|left, right| left.0.cmp(right.0));
            out.push('{');
            for (index, (key, nested)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_sorted_json(nested, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, nested) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_sorted_json(nested, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Renders a value as the runner prints raw result maps: quoted strings are
/// kept unescaped apart from their own quote, with `True`/`False`/`None`.
pub fn render_repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(value, &mut out);
    out
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_repr_str(text, out),
        Value::Array(items) => {
            out.push('[');
            for (index, nested) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_repr(nested, out);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (index, (key, nested)) in fields.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_repr_str(key, out);
                out.push_str(": ");
                write_repr(nested, out);
            }
            out.push('}');
        }
    }
}

fn write_repr_str(text: &str, out: &mut String) {
    // Single quotes unless the text has a single quote and no double quote.
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch == quote => {
                out.push('\\');
                out.push(ch);
            }
            ch if ch.is_control() => out.push_str(&format!("\\x{:02x}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push(quote);
}
