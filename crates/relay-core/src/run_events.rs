//! Typed run events and the callback boundary that produces them.
//!
//! The automation runner hands over loosely shaped result maps. They are
//! validated and defaulted here, once, so the formatter only ever sees
//! `RunEvent` values with named fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const INVOCATION_FIELD: &str = "invocation";
const ITEM_FIELD: &str = "item";
const CHANGED_FIELD: &str = "changed";
const NON_OBJECT_RESULT_FIELD: &str = "msg";
const MISSING_RESULT: &str = "None";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Per-host counters reported by the runner when a run finishes.
pub struct HostRunSummary {
    #[serde(default)]
    pub ok: u64,
    #[serde(default)]
    pub failures: u64,
    #[serde(default)]
    pub unreachable: u64,
    #[serde(default)]
    pub changed: u64,
    #[serde(default)]
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One host's recap entry, in the order the runner enumerated hosts.
pub struct HostStats {
    pub host: String,
    #[serde(flatten)]
    pub summary: HostRunSummary,
}

impl HostStats {
    pub fn new(host: impl Into<String>, summary: HostRunSummary) -> Self {
        Self {
            host: host.into(),
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Payload attached to an unreachable host.
pub enum UnreachableResult {
    Text(String),
    Fields(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq)]
/// Enumerates the runner callbacks mirrored into the run log.
pub enum RunEvent {
    TaskStart {
        name: String,
        is_conditional: bool,
    },
    Setup,
    PlayStart {
        name: String,
    },
    HostOk {
        host: String,
        item: Option<String>,
        changed: bool,
    },
    HostFailed {
        host: String,
        item: Option<String>,
        result: Map<String, Value>,
    },
    HostSkipped {
        host: String,
        item: Option<String>,
    },
    HostUnreachable {
        host: String,
        item: Option<String>,
        result: UnreachableResult,
    },
    NoHosts,
    Stats {
        hosts: Vec<HostStats>,
    },
}

impl RunEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskStart { .. } => "task_start",
            Self::Setup => "setup",
            Self::PlayStart { .. } => "play_start",
            Self::HostOk { .. } => "host_ok",
            Self::HostFailed { .. } => "host_failed",
            Self::HostSkipped { .. } => "host_skipped",
            Self::HostUnreachable { .. } => "host_unreachable",
            Self::NoHosts => "no_hosts",
            Self::Stats { .. } => "stats",
        }
    }

    pub fn is_play_start(&self) -> bool {
        matches!(self, Self::PlayStart { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
/// Wire shape of one runner callback, one JSON object per line.
pub enum CallbackRecord {
    TaskStart {
        name: String,
        #[serde(default)]
        is_conditional: bool,
    },
    Setup,
    PlayStart {
        #[serde(default)]
        name: String,
    },
    HostOk {
        host: String,
        #[serde(default)]
        result: Value,
    },
    HostFailed {
        host: String,
        #[serde(default)]
        result: Value,
        #[serde(default)]
        ignore_errors: bool,
    },
    HostSkipped {
        host: String,
        #[serde(default)]
        item: Value,
    },
    HostUnreachable {
        host: String,
        #[serde(default)]
        result: Value,
    },
    NoHosts,
    Stats {
        #[serde(default)]
        hosts: Vec<HostStats>,
    },
}

impl CallbackRecord {
    pub fn parse_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).context("failed to decode callback record")
    }
}

impl From<CallbackRecord> for RunEvent {
    fn from(record: CallbackRecord) -> Self {
        match record {
            CallbackRecord::TaskStart {
                name,
                is_conditional,
            } => RunEvent::TaskStart {
                name,
                is_conditional,
            },
            CallbackRecord::Setup => RunEvent::Setup,
            CallbackRecord::PlayStart { name } => RunEvent::PlayStart { name },
            CallbackRecord::HostOk { host, result } => {
                let fields = result_fields(result);
                RunEvent::HostOk {
                    host,
                    item: fields.get(ITEM_FIELD).and_then(render_item),
                    changed: fields.get(CHANGED_FIELD).is_some_and(is_truthy),
                }
            }
            CallbackRecord::HostFailed { host, result, .. } => {
                let mut fields = result_fields(result);
                fields.remove(INVOCATION_FIELD);
                RunEvent::HostFailed {
                    host,
                    item: fields.get(ITEM_FIELD).and_then(render_item),
                    result: fields,
                }
            }
            CallbackRecord::HostSkipped { host, item } => RunEvent::HostSkipped {
                host,
                item: render_item(&item),
            },
            CallbackRecord::HostUnreachable { host, result } => match result {
                Value::Object(fields) => RunEvent::HostUnreachable {
                    host,
                    item: fields.get(ITEM_FIELD).and_then(render_item),
                    result: UnreachableResult::Fields(fields),
                },
                Value::String(text) => RunEvent::HostUnreachable {
                    host,
                    item: None,
                    result: UnreachableResult::Text(text),
                },
                Value::Null => RunEvent::HostUnreachable {
                    host,
                    item: None,
                    result: UnreachableResult::Text(MISSING_RESULT.to_string()),
                },
                other => RunEvent::HostUnreachable {
                    host,
                    item: None,
                    result: UnreachableResult::Text(other.to_string()),
                },
            },
            CallbackRecord::NoHosts => RunEvent::NoHosts,
            CallbackRecord::Stats { hosts } => RunEvent::Stats { hosts },
        }
    }
}

fn result_fields(result: Value) -> Map<String, Value> {
    match result {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        other => {
            let mut fields = Map::new();
            fields.insert(NON_OBJECT_RESULT_FIELD.to_string(), other);
            fields
        }
    }
}

/// Runner flags are loosely typed: empty, zero and null values read as false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn render_item(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: Value) -> RunEvent {
        let record: CallbackRecord =
            serde_json::from_value(value).expect("callback record decodes");
        RunEvent::from(record)
    }

    #[test]
    fn unit_parse_line_accepts_unit_variants() {
        let record = CallbackRecord::parse_line("{\"event\":\"setup\"}\n").expect("setup");
        assert_eq!(record, CallbackRecord::Setup);
        let record = CallbackRecord::parse_line("{\"event\":\"no_hosts\"}").expect("no hosts");
        assert_eq!(RunEvent::from(record), RunEvent::NoHosts);
    }

    #[test]
    fn unit_parse_line_rejects_unknown_event() {
        let error = CallbackRecord::parse_line("{\"event\":\"runner_on_async_poll\"}")
            .expect_err("unknown event must fail");
        assert!(error.to_string().contains("failed to decode callback record"));
    }

    #[test]
    fn functional_task_start_defaults_is_conditional() {
        let event = decode(json!({"event": "task_start", "name": "install pkg"}));
        assert_eq!(
            event,
            RunEvent::TaskStart {
                name: "install pkg".to_string(),
                is_conditional: false,
            }
        );
    }

    #[test]
    fn functional_host_ok_reads_item_and_changed_from_result() {
        let event = decode(json!({
            "event": "host_ok",
            "host": "web1",
            "result": {"changed": true, "item": "nginx", "invocation": {"module_name": "apt"}}
        }));
        assert_eq!(
            event,
            RunEvent::HostOk {
                host: "web1".to_string(),
                item: Some("nginx".to_string()),
                changed: true,
            }
        );
    }

    #[test]
    fn regression_host_ok_without_result_defaults_to_unchanged_without_item() {
        let event = decode(json!({"event": "host_ok", "host": "web1"}));
        assert_eq!(
            event,
            RunEvent::HostOk {
                host: "web1".to_string(),
                item: None,
                changed: false,
            }
        );
    }

    #[test]
    fn regression_host_ok_changed_follows_loose_truthiness() {
        for (changed, expected) in [
            (json!(1), true),
            (json!("yes"), true),
            (json!(0), false),
            (json!(0.0), false),
            (json!(""), false),
            (json!(null), false),
            (json!(false), false),
        ] {
            let event = decode(json!({
                "event": "host_ok",
                "host": "web1",
                "result": {"changed": changed}
            }));
            assert!(
                matches!(event, RunEvent::HostOk { changed, .. } if changed == expected),
                "changed flag mismatch for {event:?}"
            );
        }
    }

    #[test]
    fn regression_host_unreachable_without_result_renders_none() {
        let event = decode(json!({"event": "host_unreachable", "host": "web2"}));
        assert_eq!(
            event,
            RunEvent::HostUnreachable {
                host: "web2".to_string(),
                item: None,
                result: UnreachableResult::Text("None".to_string()),
            }
        );
        assert_eq!(
            crate::render_event_lines(&event),
            vec!["fatal: [web2] => None".to_string()]
        );
    }

    #[test]
    fn functional_host_failed_strips_invocation() {
        let event = decode(json!({
            "event": "host_failed",
            "host": "db1",
            "ignore_errors": true,
            "result": {"msg": "boom", "rc": 2, "invocation": {"module_args": "x"}}
        }));
        let RunEvent::HostFailed { host, item, result } = event else {
            panic!("expected host_failed");
        };
        assert_eq!(host, "db1");
        assert_eq!(item, None);
        assert!(!result.contains_key("invocation"));
        assert_eq!(result.get("rc"), Some(&json!(2)));
    }

    #[test]
    fn functional_non_string_items_render_as_compact_json() {
        let event = decode(json!({
            "event": "host_skipped",
            "host": "web1",
            "item": {"name": "redis", "state": "present"}
        }));
        assert_eq!(
            event,
            RunEvent::HostSkipped {
                host: "web1".to_string(),
                item: Some("{\"name\":\"redis\",\"state\":\"present\"}".to_string()),
            }
        );
    }

    #[test]
    fn functional_host_unreachable_keeps_text_and_map_results() {
        let text = decode(json!({
            "event": "host_unreachable",
            "host": "web2",
            "result": "SSH Error: connection timed out"
        }));
        assert_eq!(
            text,
            RunEvent::HostUnreachable {
                host: "web2".to_string(),
                item: None,
                result: UnreachableResult::Text("SSH Error: connection timed out".to_string()),
            }
        );

        let fields = decode(json!({
            "event": "host_unreachable",
            "host": "web2",
            "result": {"msg": "timeout", "item": "eth0"}
        }));
        let RunEvent::HostUnreachable { item, result, .. } = fields else {
            panic!("expected host_unreachable");
        };
        assert_eq!(item.as_deref(), Some("eth0"));
        assert!(matches!(result, UnreachableResult::Fields(_)));
    }

    #[test]
    fn functional_stats_preserve_host_order_and_default_counters() {
        let event = decode(json!({
            "event": "stats",
            "hosts": [
                {"host": "web2", "ok": 3},
                {"host": "web1", "ok": 1, "failures": 0, "unreachable": 0, "changed": 2, "skipped": 1}
            ]
        }));
        let RunEvent::Stats { hosts } = event else {
            panic!("expected stats");
        };
        assert_eq!(hosts[0].host, "web2");
        assert_eq!(
            hosts[0].summary,
            HostRunSummary {
                ok: 3,
                ..HostRunSummary::default()
            }
        );
        assert_eq!(hosts[1].host, "web1");
        assert_eq!(hosts[1].summary.changed, 2);
    }

    #[test]
    fn unit_event_kind_labels_match_wire_tags() {
        assert_eq!(RunEvent::Setup.kind(), "setup");
        assert_eq!(
            RunEvent::PlayStart {
                name: "site".to_string()
            }
            .kind(),
            "play_start"
        );
        assert!(RunEvent::PlayStart {
            name: String::new()
        }
        .is_play_start());
        assert!(!RunEvent::NoHosts.is_play_start());
    }
}
