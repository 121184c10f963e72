const CODE_FENCE: &str = "```";
const ELLIPSIS: &str = "...";

pub(crate) fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Keeps the newest `max_chars` characters, marking dropped history with `...`.
pub(crate) fn keep_tail_for_slack(value: &str, max_chars: usize) -> String {
    let total = value.chars().count();
    if total <= max_chars {
        return value.to_string();
    }
    // The marker only fits when it leaves room for at least one character.
    if max_chars <= ELLIPSIS.len() {
        return value.chars().skip(total - max_chars).collect();
    }
    let keep = max_chars - ELLIPSIS.len();
    let mut truncated = String::from(ELLIPSIS);
    truncated.extend(value.chars().skip(total - keep));
    truncated
}

/// Wraps the run log in a code block so chat renders it fixed-width.
pub(crate) fn render_message_body(log_text: &str, max_message_chars: usize) -> String {
    let budget = max_message_chars.saturating_sub(CODE_FENCE.len() * 2);
    format!(
        "{CODE_FENCE}{}{CODE_FENCE}",
        keep_tail_for_slack(log_text, budget)
    )
}
