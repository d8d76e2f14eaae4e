use std::sync::LazyLock;

use regex::Regex;

static MERMAID_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern; compiling it cannot fail.
    Regex::new(r"(?s)```mermaid\n(.*?)\n```").expect("valid mermaid regex")
});

/// Splits a model reply into `(diagram, text)`.
///
/// The first ```` ```mermaid ```` fence provides the diagram source; every
/// such fence is removed from the text, which is then trimmed. Without a
/// fence the text comes back untouched.
///
/// ```
/// let (diagram, text) = tutor::parse_mermaid("Tree:\n```mermaid\ngraph TD\nA-->B\n```\nDone.");
/// assert_eq!(diagram.as_deref(), Some("graph TD\nA-->B"));
/// assert_eq!(text, "Tree:\n\nDone.");
/// ```
pub fn parse_mermaid(content: &str) -> (Option<String>, String) {
    match MERMAID_BLOCK.captures(content) {
        Some(caps) => {
            let diagram = caps.get(1).map(|m| m.as_str().to_string());
            let cleaned = MERMAID_BLOCK.replace_all(content, "").trim().to_string();
            (diagram, cleaned)
        }
        None => (None, content.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_fence_returns_text_unchanged() {
        let (d, t) = parse_mermaid("  plain answer \n");
        assert!(d.is_none());
        assert_eq!(t, "  plain answer \n");
    }

    #[test]
    fn first_fence_wins_and_all_are_removed() {
        let input = "A\n```mermaid\ngraph LR\nX-->Y\n```\nB\n```mermaid\ngraph TD\nZ\n```\n";
        let (d, t) = parse_mermaid(input);
        assert_eq!(d.as_deref(), Some("graph LR\nX-->Y"));
        assert_eq!(t, "A\n\nB");
    }

    #[test]
    fn fence_without_newline_before_close_is_not_a_diagram() {
        let (d, _) = parse_mermaid("```mermaid graph TD```");
        assert!(d.is_none());
    }
}
