//! Parameter binding plan
//!
//! Resolvers always emit named markers (`@name`, `:name`). Once a template
//! is fully resolved, this pass collects the referenced names and, for
//! positional or numbered conventions, rewrites the markers in place.

use crate::dialect::{DialectDescriptor, ParameterStyle};

/// Final SQL text plus the parameter names the caller must bind, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundSql {
    pub sql: String,
    /// Named and numbered styles: distinct names in first-use order.
    /// Positional style: one entry per `?`, repeats included.
    pub parameters: Vec<String>,
}

/// A named marker found in resolved SQL
#[derive(Debug, Clone, PartialEq, Eq)]
struct Marker<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

/// Extract (and for non-named styles rewrite) parameter markers
pub fn bind_parameters(
    sql: &str,
    dialect: &DialectDescriptor,
    style: ParameterStyle,
) -> BoundSql {
    let markers = scan_markers(sql, dialect.parameter_prefix);

    let mut distinct: Vec<&str> = Vec::new();
    for marker in &markers {
        if !distinct.contains(&marker.name) {
            distinct.push(marker.name);
        }
    }

    match style {
        ParameterStyle::Named => BoundSql {
            sql: sql.to_string(),
            parameters: distinct.into_iter().map(str::to_string).collect(),
        },
        ParameterStyle::Positional => BoundSql {
            sql: rewrite(sql, &markers, |_| "?".to_string()),
            parameters: markers.iter().map(|m| m.name.to_string()).collect(),
        },
        ParameterStyle::Numbered => {
            let sql = rewrite(sql, &markers, |marker| {
                let index = distinct
                    .iter()
                    .position(|name| *name == marker.name)
                    .unwrap_or_default();
                format!("${}", index + 1)
            });
            BoundSql {
                sql,
                parameters: distinct.into_iter().map(str::to_string).collect(),
            }
        }
    }
}

/// Find `prefix` + identifier outside quoted text. A prefix doubled or glued
/// to a preceding identifier (`@@ROWCOUNT`, `col::text`, `a@b`) is not a
/// marker.
fn scan_markers(sql: &str, prefix: char) -> Vec<Marker<'_>> {
    let mut markers = Vec::new();
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            previous = Some(c);
            continue;
        }

        if c == '\'' || c == '"' {
            quote = Some(c);
        } else if c == prefix && !previous.is_some_and(|p| is_identifier_char(p) || p == prefix) {
            let starts_name = chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_');
            if starts_name {
                let start = i;
                let mut end = i + c.len_utf8();
                while let Some(&(j, next)) = chars.peek() {
                    if !is_identifier_char(next) {
                        break;
                    }
                    end = j + next.len_utf8();
                    chars.next();
                }
                markers.push(Marker {
                    start,
                    end,
                    name: &sql[start + c.len_utf8()..end],
                });
                previous = sql[..end].chars().next_back();
                continue;
            }
        }

        previous = Some(c);
    }

    markers
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn rewrite(sql: &str, markers: &[Marker<'_>], replacement: impl Fn(&Marker<'_>) -> String) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut cursor = 0;

    for marker in markers {
        out.push_str(&sql[cursor..marker.start]);
        out.push_str(&replacement(marker));
        cursor = marker.end;
    }
    out.push_str(&sql[cursor..]);

    out
}
