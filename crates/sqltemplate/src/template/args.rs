//! Placeholder argument parsing
//!
//! Three surface syntaxes normalize into one [`PlaceholderArgs`]:
//! - positional tokens: `orderby name --desc`, or comma lists `between @a, @b`
//! - long flags: `--exclude Id CreatedAt`, `--mode=contains`
//! - pipe pairs: `between|min=@minPrice|max=@maxPrice`

use std::collections::BTreeMap;

/// Normalized placeholder arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderArgs {
    pub positional: Vec<String>,
    pub flags: BTreeMap<String, Vec<String>>,
}

impl PlaceholderArgs {
    /// Parse the text following the placeholder kind
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix('|') {
            Self::parse_pipe(rest)
        } else {
            Self::parse_tokens(raw)
        }
    }

    /// Whether no arguments were given at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.flags.is_empty()
    }

    /// First positional argument
    pub fn first(&self) -> Option<&str> {
        self.positional.first().map(String::as_str)
    }

    /// Positional argument at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Whether the flag is present (with or without values)
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// All values of a flag
    pub fn flag(&self, name: &str) -> Option<&[String]> {
        self.flags.get(name).map(Vec::as_slice)
    }

    /// Values of a flag joined into one string, e.g. an ON condition
    pub fn flag_text(&self, name: &str) -> Option<String> {
        self.flag(name)
            .filter(|values| !values.is_empty())
            .map(|values| values.join(" "))
    }

    /// First value of the first present flag among `names`
    pub fn flag_value(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.flag(name).and_then(|v| v.first()))
            .map(String::as_str)
    }

    fn parse_pipe(raw: &str) -> Self {
        let mut args = Self::default();

        for segment in split_top_level(raw, '|') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            match segment.split_once('=') {
                Some((key, value)) if is_flag_name(key.trim()) => {
                    let values = split_top_level(value, ',')
                        .into_iter()
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect();
                    args.flags.insert(key.trim().to_lowercase(), values);
                }
                _ => args.positional.push(segment.to_string()),
            }
        }

        args
    }

    fn parse_tokens(raw: &str) -> Self {
        let mut args = Self::default();
        let mut section: Vec<Lexeme> = Vec::new();
        let mut current_flag: Option<String> = None;

        for lexeme in lex(raw) {
            match lexeme {
                Lexeme::Word(ref word) if is_long_flag(word) => {
                    args.flush(current_flag.take(), std::mem::take(&mut section));
                    let body = &word[2..];
                    match body.split_once('=') {
                        Some((name, value)) => {
                            current_flag = Some(name.to_lowercase());
                            section.push(Lexeme::Word(value.to_string()));
                        }
                        None => current_flag = Some(body.to_lowercase()),
                    }
                }
                other => section.push(other),
            }
        }
        args.flush(current_flag, section);

        args
    }

    /// Store one section: comma-grouped when it contains a top-level comma,
    /// otherwise one item per word.
    fn flush(&mut self, flag: Option<String>, section: Vec<Lexeme>) {
        let has_comma = section.iter().any(|l| matches!(l, Lexeme::Comma));
        let mut items = Vec::new();

        if has_comma {
            let mut group: Vec<String> = Vec::new();
            for lexeme in section {
                match lexeme {
                    Lexeme::Word(word) => group.push(word),
                    Lexeme::Comma => {
                        if !group.is_empty() {
                            items.push(group.join(" "));
                        }
                        group.clear();
                    }
                }
            }
            if !group.is_empty() {
                items.push(group.join(" "));
            }
        } else {
            items.extend(section.into_iter().filter_map(|l| match l {
                Lexeme::Word(word) => Some(word),
                Lexeme::Comma => None,
            }));
        }

        match flag {
            Some(name) => self.flags.entry(name).or_default().extend(items),
            None => self.positional.extend(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Word(String),
    Comma,
}

fn is_flag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_long_flag(word: &str) -> bool {
    word.strip_prefix("--")
        .and_then(|body| body.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
}

/// Split into words at top-level whitespace; top-level commas become their
/// own lexeme. Parentheses, brackets and single-quoted literals are kept
/// intact.
fn lex(raw: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut word = String::new();
    let mut depth = 0usize;
    let mut in_string = false;

    for c in raw.chars() {
        if in_string {
            word.push(c);
            if c == '\'' {
                in_string = false;
            }
            continue;
        }

        match c {
            '\'' => {
                in_string = true;
                word.push(c);
            }
            '(' | '[' => {
                depth += 1;
                word.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                word.push(c);
            }
            ',' if depth == 0 => {
                push_word(&mut word, &mut lexemes);
                lexemes.push(Lexeme::Comma);
            }
            c if c.is_whitespace() && depth == 0 => push_word(&mut word, &mut lexemes),
            c => word.push(c),
        }
    }
    push_word(&mut word, &mut lexemes);

    lexemes
}

fn push_word(word: &mut String, lexemes: &mut Vec<Lexeme>) {
    if !word.is_empty() {
        lexemes.push(Lexeme::Word(std::mem::take(word)));
    }
}

/// Split on `separator` outside parentheses, brackets and string literals
pub(crate) fn split_top_level(raw: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;

    for c in raw.chars() {
        if in_string {
            current.push(c);
            if c == '\'' {
                in_string = false;
            }
            continue;
        }

        match c {
            '\'' => {
                in_string = true;
                current.push(c);
            }
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == separator && depth == 0 => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);

    parts
}
