//! Security utilities for SQL injection prevention
//!
//! Placeholder arguments that end up verbatim in SQL text (table overrides,
//! ORDER BY columns, HAVING conditions, JSON paths, ...) never become bound
//! parameters, so they are checked here before they are emitted:
//! - Identifiers: a single name, letters/digits/underscore, not digit-first
//! - Table parts: dotted, schema-qualified names built from identifiers
//! - Fragments: expression-like text without statement separators,
//!   comment markers or statement keywords

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{TemplateError, TemplateResult};

/// Longest identifier accepted (SQL Server and Oracle allow 128)
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Keywords that start data-modifying or DDL statements
static DANGEROUS_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "EXEC", "EXECUTE", "TRUNCATE", "ALTER", "INSERT", "UPDATE",
];

/// Literal markers that terminate a statement or open a comment
static DANGEROUS_MARKERS: &[&str] = &["--", "/*", ";"];

static DANGEROUS_KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", DANGEROUS_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("keyword pattern is a valid regex")
});

/// What kind of SQL text a span is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Identifier,
    Fragment,
    TablePart,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Identifier => write!(f, "identifier"),
            FragmentKind::Fragment => write!(f, "fragment"),
            FragmentKind::TablePart => write!(f, "table name"),
        }
    }
}

/// Check that `span` is a single SQL name: letters, digits and underscore,
/// not starting with a digit.
pub fn is_valid_identifier(span: &str) -> bool {
    let mut chars = span.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    span.len() <= MAX_IDENTIFIER_LENGTH && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check that `span` is a possibly schema-qualified name such as
/// `dbo.users` or `catalog.schema.table`.
pub fn is_valid_table_part(span: &str) -> bool {
    let parts: Vec<&str> = span.split('.').collect();
    parts.len() <= 3 && parts.iter().all(|part| is_valid_identifier(part))
}

/// Check that `span` is safe expression-like text.
///
/// Fragments may contain operators, literals, function calls and quoted
/// names, but never statement separators, comments, control characters,
/// unbalanced quotes or parentheses.
pub fn is_valid_fragment(span: &str) -> bool {
    if span.trim().is_empty() || contains_dangerous_keyword(span) {
        return false;
    }

    if span.contains("*/") || span.contains('#') {
        return false;
    }

    if span.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return false;
    }

    let mut depth: i32 = 0;
    let mut in_string = false;
    for c in span.chars() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0 && !in_string
}

/// Check for statement keywords and for comment or separator markers
/// anywhere in `span`.
///
/// Keywords match case-insensitively as whole words: `drop`, `DROP TABLE`
/// and `x.DROP` are flagged, while names that merely contain a keyword
/// (`updated_at`, `is_deleted`, `DROPTABLE`, `xDROP`) are not. The markers
/// `--`, `/*` and `;` match anywhere.
pub fn contains_dangerous_keyword(span: &str) -> bool {
    DANGEROUS_MARKERS.iter().any(|marker| span.contains(marker))
        || DANGEROUS_KEYWORD_REGEX.is_match(span)
}

/// Validate `span` against the rules for `kind`. Statement keywords are
/// rejected for every kind, so `{{table drop}}` fails like a fragment would.
pub fn validate(span: &str, kind: FragmentKind) -> bool {
    match kind {
        FragmentKind::Identifier => is_valid_identifier(span) && !contains_dangerous_keyword(span),
        FragmentKind::TablePart => is_valid_table_part(span) && !contains_dangerous_keyword(span),
        FragmentKind::Fragment => is_valid_fragment(span),
    }
}

/// Validate `span` and turn a rejection into an error for `placeholder`
pub fn ensure_safe(span: &str, kind: FragmentKind, placeholder: &str) -> TemplateResult<()> {
    if validate(span, kind) {
        Ok(())
    } else {
        tracing::warn!(
            "Rejected unsafe SQL {} in '{}' placeholder: {:?}",
            kind,
            placeholder,
            span
        );
        Err(TemplateError::unsafe_fragment(placeholder, kind, span))
    }
}
