//! Placeholder tokenizer
//!
//! Finds `{{...}}` spans that contain no nested `{{`. Outer placeholders
//! become innermost once their children are replaced by plain text, so the
//! engine reaches them on a later pass.

use std::ops::Range;

use super::args::PlaceholderArgs;
use super::kind::PlaceholderKind;
use crate::error::{TemplateError, TemplateResult};

const OPEN: &[u8] = b"{{";
const CLOSE: &[u8] = b"}}";

/// A parsed placeholder, valid for one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Kind token as written, lowercased
    pub name: String,
    /// Text after `kind:` in the head, e.g. `quoted` in `table:quoted`
    pub modifier: Option<String>,
    /// Argument text following the head
    pub raw_args: String,
    pub args: PlaceholderArgs,
    /// Byte range of the whole `{{...}}` span in the pass input
    pub span: Range<usize>,
}

impl Placeholder {
    /// Placeholder name for diagnostics, including the modifier
    pub fn label(&self) -> String {
        match &self.modifier {
            Some(modifier) => format!("{}:{}", self.name, modifier),
            None => self.name.clone(),
        }
    }
}

/// Verify that every `{{` has a matching `}}` and vice versa
pub fn check_balance(template: &str) -> TemplateResult<()> {
    let bytes = template.as_bytes();
    let mut open_positions: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(OPEN) {
            open_positions.push(i);
            i += OPEN.len();
        } else if bytes[i..].starts_with(CLOSE) {
            if open_positions.pop().is_none() {
                return Err(TemplateError::UnbalancedBraces { position: i });
            }
            i += CLOSE.len();
        } else {
            i += 1;
        }
    }

    match open_positions.pop() {
        Some(position) => Err(TemplateError::UnbalancedBraces { position }),
        None => Ok(()),
    }
}

/// Whether the text still contains a placeholder opener
pub fn has_placeholders(text: &str) -> bool {
    text.contains("{{")
}

/// Byte ranges of innermost placeholder spans, left to right
pub fn innermost_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut last_open: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(OPEN) {
            last_open = Some(i);
            i += OPEN.len();
        } else if bytes[i..].starts_with(CLOSE) {
            if let Some(start) = last_open.take() {
                spans.push(start..i + CLOSE.len());
            }
            i += CLOSE.len();
        } else {
            i += 1;
        }
    }

    spans
}

/// Parse the placeholder occupying `span` in `text`
pub fn parse_placeholder(text: &str, span: Range<usize>) -> TemplateResult<Placeholder> {
    let inner = text[span.start + OPEN.len()..span.end - CLOSE.len()].trim();

    let head_end = inner
        .find(|c: char| c.is_whitespace() || c == '|')
        .unwrap_or(inner.len());
    let (head, rest) = inner.split_at(head_end);

    if head.is_empty() {
        return Err(TemplateError::MalformedPlaceholder {
            position: span.start,
            message: "placeholder has no kind".to_string(),
        });
    }

    let (name, modifier) = match head.split_once(':') {
        Some((name, modifier)) => (name, Some(modifier).filter(|m| !m.is_empty())),
        None => (head, None),
    };

    let kind: PlaceholderKind = name
        .parse()
        .map_err(|_| TemplateError::UnknownPlaceholder {
            kind: name.to_string(),
        })?;

    Ok(Placeholder {
        kind,
        name: name.to_lowercase(),
        modifier: modifier.map(str::to_string),
        raw_args: rest.trim().to_string(),
        args: PlaceholderArgs::parse(rest),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_balance() {
        assert!(check_balance("SELECT 1").is_ok());
        assert!(check_balance("{{a}} {{b {{c}}}}").is_ok());
        assert_eq!(
            check_balance("SELECT {{columns FROM t"),
            Err(TemplateError::UnbalancedBraces { position: 7 })
        );
        assert_eq!(
            check_balance("SELECT columns}} FROM t"),
            Err(TemplateError::UnbalancedBraces { position: 14 })
        );
    }

    #[test]
    fn test_innermost_spans_flat() {
        let text = "SELECT {{columns}} FROM {{table}}";
        let spans = innermost_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "{{columns}}");
        assert_eq!(&text[spans[1].clone()], "{{table}}");
    }

    #[test]
    fn test_innermost_spans_nested() {
        let text = "{{coalesce {{round {{avg balance}}, 2}}, 0}}";
        let spans = innermost_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], "{{avg balance}}");
    }

    #[test]
    fn test_innermost_spans_siblings_inside_parent() {
        let text = "{{coalesce {{max a}}, {{min b}}}}";
        let spans = innermost_spans(text);
        let found: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(found, vec!["{{max a}}", "{{min b}}"]);
    }

    #[test]
    fn test_parse_placeholder_with_modifier() {
        let text = "WHERE {{where:id}}";
        let span = innermost_spans(text)[0].clone();
        let placeholder = parse_placeholder(text, span).unwrap();
        assert_eq!(placeholder.kind, PlaceholderKind::Where);
        assert_eq!(placeholder.modifier.as_deref(), Some("id"));
        assert_eq!(placeholder.label(), "where:id");
        assert!(placeholder.args.is_empty());
    }

    #[test]
    fn test_parse_placeholder_pipe_form() {
        let text = "{{between|min=@minPrice|max=@maxPrice}}";
        let placeholder = parse_placeholder(text, 0..text.len()).unwrap();
        assert_eq!(placeholder.kind, PlaceholderKind::Between);
        assert_eq!(placeholder.args.flag_value(&["min"]), Some("@minPrice"));
        assert_eq!(placeholder.raw_args, "|min=@minPrice|max=@maxPrice");
    }

    #[test]
    fn test_parse_placeholder_errors() {
        let text = "{{  }}";
        assert!(matches!(
            parse_placeholder(text, 0..text.len()),
            Err(TemplateError::MalformedPlaceholder { position: 0, .. })
        ));

        let text = "{{frobnicate x}}";
        assert_eq!(
            parse_placeholder(text, 0..text.len()),
            Err(TemplateError::UnknownPlaceholder {
                kind: "frobnicate".to_string()
            })
        );
    }
}
