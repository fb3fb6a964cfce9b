//! Conversation titles pulled out of assistant replies.

use std::sync::OnceLock;

use regex::Regex;
use mystery_types::message::Message;

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r#"(?i)#\s*["']?([^"'\n#]+)["']?(?:\s*-\s*A MURDER MYSTERY)?"#)
            .expect("heading pattern is valid")
    })
}

fn title_line_pattern() -> &'static Regex {
    static TITLE_LINE: OnceLock<Regex> = OnceLock::new();
    TITLE_LINE.get_or_init(|| {
        Regex::new(r#"(?i)title:\s*["']?([^"'\n]+)["']?"#).expect("title pattern is valid")
    })
}

/// First title found in the assistant messages, in conversation order.
///
/// A markdown heading (`# "The Last Toast" - A MURDER MYSTERY`) is preferred
/// over a `title: ...` line within the same message.
pub fn extract_title(messages: &[Message]) -> Option<String> {
    messages
        .iter()
        .filter(|m| m.is_ai())
        .find_map(|m| title_from_text(&m.content))
}

fn title_from_text(text: &str) -> Option<String> {
    [heading_pattern(), title_line_pattern()]
        .into_iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| format_title(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Title-case each space-separated word: first letter upper, rest lower.
pub fn format_title(raw: &str) -> String {
    raw.trim()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
