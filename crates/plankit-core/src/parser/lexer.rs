//! Line scanner turning plan text into a flat token stream.
//!
//! The lexer knows nothing about plans, tasks or steps. It only classifies
//! lines (headings, `Key: value` lines, list items, fenced blocks, prose) so
//! the grammar can be tested independently of any rendering.

/// One classified line, or one whole fenced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `#`-style heading
    Heading { level: usize, text: String },
    /// A `Key: value` line outside of any list, bold markers removed
    Metadata {
        key: String,
        value: String,
        raw: String,
    },
    /// Bulleted (`number == None`) or numbered list item
    ListItem {
        indent: usize,
        number: Option<u32>,
        text: String,
    },
    /// Fenced code block; `body` has the fence indentation removed
    Fence {
        language: Option<String>,
        body: String,
    },
    /// Any other non-empty line
    Text(String),
    Blank,
}

/// Scans `text` into tokens. Never fails; an unterminated fence swallows the
/// rest of the document.
pub fn tokenize(text: &str) -> Vec<Token> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tokens = Vec::with_capacity(lines.len());
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(marker) = fence_marker(trimmed) {
            let language = Some(trimmed[marker.len()..].trim())
                .filter(|lang| !lang.is_empty())
                .map(str::to_string);
            let mut body = Vec::new();
            index += 1;
            while index < lines.len() && !lines[index].trim_start().starts_with(marker) {
                body.push(strip_indent(lines[index], indent));
                index += 1;
            }
            // Skip the closing fence
            index += 1;
            tokens.push(Token::Fence {
                language,
                body: body.join("\n"),
            });
            continue;
        }

        tokens.push(classify(trimmed, indent));
        index += 1;
    }

    tokens
}

fn classify(trimmed: &str, indent: usize) -> Token {
    if trimmed.is_empty() || is_thematic_break(trimmed) {
        return Token::Blank;
    }

    if let Some((level, text)) = heading(trimmed) {
        return Token::Heading { level, text };
    }

    if let Some((number, text)) = ordered_item(trimmed) {
        return Token::ListItem {
            indent,
            number: Some(number),
            text,
        };
    }

    if let Some(text) = bullet_item(trimmed) {
        return Token::ListItem {
            indent,
            number: None,
            text,
        };
    }

    if let Some((key, value)) = split_key_value(trimmed) {
        return Token::Metadata {
            key,
            value,
            raw: trimmed.to_string(),
        };
    }

    Token::Text(trimmed.to_string())
}

/// `---`, `***` and `___` separators carry no content.
fn is_thematic_break(trimmed: &str) -> bool {
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .into_iter()
            .any(|marker| compact.chars().all(|c| c == marker))
}

fn fence_marker(trimmed: &str) -> Option<&'static str> {
    ["```", "~~~"]
        .into_iter()
        .find(|marker| trimmed.starts_with(marker))
}

/// Removes up to `indent` leading whitespace characters.
fn strip_indent(line: &str, indent: usize) -> String {
    let skip = line
        .char_indices()
        .take(indent)
        .take_while(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    line[skip..].to_string()
}

fn heading(trimmed: &str) -> Option<(usize, String)> {
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, strip_closing_sequence(rest.trim()).to_string()))
}

/// Drops an optional closing `#` run, which must follow whitespace so that
/// names like `Port to C#` keep their last character.
pub(crate) fn strip_closing_sequence(text: &str) -> &str {
    let body = text.trim_end_matches('#');
    if body.len() == text.len() {
        text
    } else if body.is_empty() {
        ""
    } else if body.ends_with(char::is_whitespace) {
        body.trim_end()
    } else {
        text
    }
}

fn ordered_item(trimmed: &str) -> Option<(u32, String)> {
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &trimmed[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let number = trimmed[..digits].parse().ok()?;
    Some((number, rest.trim().to_string()))
}

fn bullet_item(trimmed: &str) -> Option<String> {
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))
        .or_else(|| trimmed.strip_prefix('+'))?;
    if rest.is_empty() {
        return Some(String::new());
    }
    // `**Bold:**` lines start with `*` but are not bullets
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim().to_string())
}

/// Splits `Key: value`, tolerating `**Key:** value` and `**Key**: value`.
///
/// Keys are short runs of letters, spaces, `-` and `_`; anything else (URLs
/// with long schemes, sentences with a colon) is left to the caller.
pub(crate) fn split_key_value(line: &str) -> Option<(String, String)> {
    let colon = line.find(':')?;
    let key = line[..colon].replace("**", "").replace('*', "");
    let key = key.trim();
    let valid_key = !key.is_empty()
        && key.len() <= 40
        && key.starts_with(|c: char| c.is_ascii_alphabetic())
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_');
    if !valid_key {
        return None;
    }
    let value = line[colon + 1..].trim_start_matches('*').trim();
    Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_metadata() {
        let tokens = tokenize("# My Plan\n\n**Goal:** Ship it\nVersion: 1.0");
        assert_eq!(
            tokens[0],
            Token::Heading {
                level: 1,
                text: "My Plan".to_string()
            }
        );
        assert_eq!(tokens[1], Token::Blank);
        assert!(matches!(
            &tokens[2],
            Token::Metadata { key, value, .. } if key == "Goal" && value == "Ship it"
        ));
        assert!(matches!(
            &tokens[3],
            Token::Metadata { key, value, .. } if key == "Version" && value == "1.0"
        ));
    }

    #[test]
    fn test_thematic_break_is_blank() {
        assert_eq!(tokenize("---\n* * *"), vec![Token::Blank, Token::Blank]);
    }

    #[test]
    fn test_hash_without_space_is_text() {
        assert_eq!(
            tokenize("#hashtag"),
            vec![Token::Text("#hashtag".to_string())]
        );
    }

    #[test]
    fn test_list_items() {
        let tokens = tokenize("1. First step\n   - Run: `cargo test`\n12) Twelfth");
        assert_eq!(
            tokens,
            vec![
                Token::ListItem {
                    indent: 0,
                    number: Some(1),
                    text: "First step".to_string()
                },
                Token::ListItem {
                    indent: 3,
                    number: None,
                    text: "Run: `cargo test`".to_string()
                },
                Token::ListItem {
                    indent: 0,
                    number: Some(12),
                    text: "Twelfth".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_bold_line_is_not_bullet() {
        let tokens = tokenize("**Files:**");
        assert!(matches!(
            &tokens[0],
            Token::Metadata { key, value, .. } if key == "Files" && value.is_empty()
        ));
    }

    #[test]
    fn test_fence_strips_indentation() {
        let text = "   ```rust\n   fn main() {}\n       let x = 1;\n   ```\nafter";
        let tokens = tokenize(text);
        assert_eq!(
            tokens[0],
            Token::Fence {
                language: Some("rust".to_string()),
                body: "fn main() {}\n    let x = 1;".to_string()
            }
        );
        assert_eq!(tokens[1], Token::Text("after".to_string()));
    }

    #[test]
    fn test_unterminated_fence_takes_rest() {
        let tokens = tokenize("```\nline one\nline two");
        assert_eq!(
            tokens,
            vec![Token::Fence {
                language: None,
                body: "line one\nline two".to_string()
            }]
        );
    }

    #[test]
    fn test_fence_content_is_not_tokenized() {
        let tokens = tokenize("```md\n## Task 9: Not a task\n```");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_sentence_with_colon_is_text() {
        let tokens = tokenize("See https://example.com: it explains (a lot).");
        assert!(matches!(&tokens[0], Token::Metadata { key, .. } if key == "See https"));

        let tokens = tokenize("This is a sentence, with a comma: and colon");
        assert!(matches!(&tokens[0], Token::Text(_)));
    }

    #[test]
    fn test_heading_closing_sequence() {
        let level_and_text = |line: &str| match tokenize(line).remove(0) {
            Token::Heading { level, text } => (level, text),
            other => panic!("expected heading, got {other:?}"),
        };
        assert_eq!(level_and_text("# Port to C#"), (1, "Port to C#".to_string()));
        assert_eq!(level_and_text("## Task 1: F# ##"), (2, "Task 1: F#".to_string()));
        assert_eq!(level_and_text("## Closed ##"), (2, "Closed".to_string()));
        assert_eq!(level_and_text("### ###"), (3, String::new()));
    }
}
