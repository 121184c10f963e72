#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_core::{render_event_lines, CallbackRecord, RunEvent, RunLog};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(record) = CallbackRecord::parse_line(&raw) else {
        return;
    };
    let event = RunEvent::from(record);
    let lines = render_event_lines(&event);
    assert!(!lines.is_empty());

    let mut log = RunLog::new();
    for line in &lines {
        log.append(line);
    }
    assert_eq!(log.entry_count(), lines.len());
    assert!(log.current_text().ends_with('\n'));
    if let RunEvent::HostFailed { result, .. } = &event {
        assert!(!result.contains_key("invocation"));
    }
});
