//! Reasoning-block handling for model output
//!
//! Reasoning models prefix their answer with `<think> ... </think>`. Only the
//! first closing marker counts, and only if an opening marker comes before it;
//! anything else is returned unchanged.

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// Return the answer that follows a leading reasoning block.
#[must_use]
pub fn strip_reasoning(content: &str) -> &str {
    let Some(close) = content.find(CLOSE) else {
        return content;
    };
    match content.find(OPEN) {
        Some(open) if open < close => content[close + CLOSE.len()..].trim(),
        _ => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_block() {
        let content = "<think>\nuser wants JSON\n</think>\n\n{\"ok\": true}\n";
        assert_eq!(strip_reasoning(content), "{\"ok\": true}");
    }

    #[test]
    fn test_plain_content_unchanged() {
        assert_eq!(strip_reasoning("  just text  "), "  just text  ");
    }

    #[test]
    fn test_unclosed_block_unchanged() {
        let content = "<think>still going";
        assert_eq!(strip_reasoning(content), content);
    }

    #[test]
    fn test_close_before_open_unchanged() {
        let content = "</think> answer <think>";
        assert_eq!(strip_reasoning(content), content);
    }

    #[test]
    fn test_only_first_close_honored() {
        let content = "<think>a</think> one <think>b</think> two";
        assert_eq!(strip_reasoning(content), "one <think>b</think> two");
    }

    #[test]
    fn test_empty_answer() {
        assert_eq!(strip_reasoning("<think>x</think>   "), "");
    }
}
