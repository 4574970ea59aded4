//! Predicate resolvers: between, in, not_in, like
//!
//! Caller-written parameter names are echoed exactly as given.

use super::{ResolveContext, Resolved};
use crate::error::{TemplateError, TemplateResult};
use crate::template::tokenizer::Placeholder;

/// Pattern position for `like`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeMode {
    Contains,
    StartsWith,
    EndsWith,
}

impl LikeMode {
    fn parse(mode: &str) -> Option<Self> {
        match mode.to_lowercase().as_str() {
            "contains" => Some(LikeMode::Contains),
            "starts" | "startswith" | "starts_with" | "prefix" => Some(LikeMode::StartsWith),
            "ends" | "endswith" | "ends_with" | "suffix" => Some(LikeMode::EndsWith),
            _ => None,
        }
    }
}

impl ResolveContext<'_> {
    /// `{{between @a, @b}}`, `{{between:price @a @b}}`,
    /// `{{between|min=@a|max=@b}}`
    pub(crate) fn between(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let mut positional = p.args.positional.iter().map(String::as_str);
        let mut column = self.target_column(p)?;
        if column.is_none() && p.args.positional.len() == 3 {
            column = positional
                .next()
                .map(|c| self.column(p, c).map(|c| self.dialect.wrap_column(&c)))
                .transpose()?;
        }

        let low = p
            .args
            .flag_value(&["min", "from", "low"])
            .or_else(|| positional.next())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "min"))?;
        let high = p
            .args
            .flag_value(&["max", "to", "high"])
            .or_else(|| positional.next())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "max"))?;

        let predicate = format!(
            "BETWEEN {} AND {}",
            self.operand(p, low)?,
            self.operand(p, high)?
        );

        Ok(Resolved::sql(prefix_column(column, predicate)))
    }

    /// `{{in @ids}}`, `{{in:status @a, @b}}`, `{{not_in --values 1, 2}}`
    pub(crate) fn in_list(&self, p: &Placeholder, negated: bool) -> TemplateResult<Resolved> {
        let column = self.target_column(p)?;

        let items: &[String] = match p.args.flag("values") {
            Some(values) => values,
            None => &p.args.positional,
        };
        if items.is_empty() {
            return Err(TemplateError::missing_argument(p.label(), "values"));
        }

        let operands: Vec<String> = items
            .iter()
            .map(|item| self.operand(p, item))
            .collect::<TemplateResult<_>>()?;

        let keyword = if negated { "NOT IN" } else { "IN" };
        let predicate = format!("{} ({})", keyword, operands.join(", "));

        Ok(Resolved::sql(prefix_column(column, predicate)))
    }

    /// `{{like:name @term --mode starts}}`; the pattern is built with the
    /// dialect's concatenation strategy
    pub(crate) fn like(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let mode = match p.args.flag_value(&["mode"]) {
            Some(mode) => LikeMode::parse(mode).ok_or_else(|| {
                TemplateError::invalid_argument(
                    p.label(),
                    format!("unknown mode '{}', expected contains, starts or ends", mode),
                )
            })?,
            None => LikeMode::Contains,
        };

        let column = self.target_column(p)?;
        let term = match p.args.first().or(p.args.flag_value(&["pattern", "value"])) {
            Some(arg) => self.operand(p, arg)?,
            None => match p.modifier.as_deref().or(p.args.flag_value(&["column", "col"])) {
                Some(name) => {
                    let column = self.column(p, name)?;
                    self.param(column.rsplit('.').next().unwrap_or(&column))
                }
                None => return Err(TemplateError::missing_argument(p.label(), "pattern")),
            },
        };

        let pattern = match mode {
            LikeMode::Contains => self.dialect.concat(&["'%'", &term, "'%'"]),
            LikeMode::StartsWith => self.dialect.concat(&[&term, "'%'"]),
            LikeMode::EndsWith => self.dialect.concat(&["'%'", &term]),
        };

        Ok(Resolved::sql(prefix_column(column, format!("LIKE {}", pattern))))
    }
}

fn prefix_column(column: Option<String>, predicate: String) -> String {
    match column {
        Some(column) => format!("{} {}", column, predicate),
        None => predicate,
    }
}
