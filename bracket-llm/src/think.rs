//! Reasoning-section handling

const THINK_CLOSE: &str = "</think>";

/// Split a reply into `(answer, thinking)`.
///
/// The answer is whatever follows the last `</think>`, trimmed. Replies
/// without the tag come back whole.
pub fn strip_thinking(content: &str) -> (&str, Option<&str>) {
    match content.rfind(THINK_CLOSE) {
        Some(end) => {
            let answer = content[end + THINK_CLOSE.len()..].trim();
            let head = &content[..end];
            let thinking = head
                .find("<think>")
                .map(|start| &head[start + "<think>".len()..])
                .unwrap_or(head)
                .trim();
            (answer, Some(thinking))
        }
        None => (content.trim(), None),
    }
}
