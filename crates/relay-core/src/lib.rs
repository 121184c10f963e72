//! Run-log primitives for the relay workspace.
//!
//! Holds the typed run events received from the automation runner, the pure
//! formatter that turns them into log lines, and the append-only run log that
//! gets mirrored into chat.

pub mod run_events;
pub mod run_log;
pub mod run_render;

pub use run_events::{CallbackRecord, HostRunSummary, HostStats, RunEvent, UnreachableResult};
pub use run_log::RunLog;
pub use run_render::{
    banner, render_event_lines, render_repr, render_sorted_json, NO_HOSTS_LINE,
};
