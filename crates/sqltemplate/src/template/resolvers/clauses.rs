//! Clause resolvers: ordering, pagination, grouping and joins

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ResolveContext, Resolved};
use crate::dialect::{JoinKind, PaginationStyle};
use crate::error::{TemplateError, TemplateResult, TemplateWarning};
use crate::security::{self, FragmentKind};
use crate::template::tokenizer::Placeholder;

static ORDER_BY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bORDER\s+BY\b").expect("valid ORDER BY regex"));

static LIMIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bLIMIT\b").expect("valid LIMIT regex"));

static TRAILING_OFFSET_ROWS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bOFFSET\s+\S+\s+ROWS\s*$").expect("valid OFFSET ROWS regex")
});

/// A LIMIT-only clause on OFFSET/FETCH grammars, capturing the limit
static TRAILING_FETCH_FROM_ZERO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bOFFSET\s+0\s+ROWS\s+FETCH\s+NEXT\s+(\S+)\s+ROWS\s+ONLY\s*$")
        .expect("valid OFFSET 0 FETCH regex")
});

static TRAILING_FETCH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bFETCH\s+NEXT\s+\S+\s+ROWS\s+ONLY\s*$").expect("valid FETCH regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl ResolveContext<'_> {
    /// `{{orderby}}`, `{{orderby name --desc}}`, `{{orderby name DESC, id}}`
    pub(crate) fn order_by(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let default_direction = match (p.args.has_flag("asc"), p.args.has_flag("desc")) {
            (true, true) => {
                return Err(TemplateError::conflicting_options(
                    p.label(),
                    "--asc and --desc cannot be combined",
                ))
            }
            (_, true) => Direction::Desc,
            _ => Direction::Asc,
        };

        let mut items: Vec<(String, Option<Direction>)> = Vec::new();
        let names = p.modifier.iter().chain(p.args.positional.iter());
        for item in names {
            for word in item.split_whitespace() {
                let Some(direction) = Direction::parse(word) else {
                    items.push((self.column(p, word)?, None));
                    continue;
                };
                match items.last_mut() {
                    Some((_, slot @ None)) => *slot = Some(direction),
                    _ => {
                        return Err(TemplateError::invalid_argument(
                            p.label(),
                            format!("sort direction '{}' must follow a column", word),
                        ))
                    }
                }
            }
        }

        if items.is_empty() {
            let field = self
                .entity
                .primary_keys()
                .first()
                .copied()
                .or_else(|| self.entity.fields.first())
                .ok_or_else(|| TemplateError::missing_argument(p.label(), "column"))?;
            items.push((field.column_name(), None));
        }

        let terms: Vec<String> = items
            .into_iter()
            .map(|(column, direction)| {
                format!("{} {}", column, direction.unwrap_or(default_direction).keyword())
            })
            .collect();

        Ok(Resolved::sql(format!("ORDER BY {}", terms.join(", "))))
    }

    /// `{{limit}}`, `{{limit @take}}`
    pub(crate) fn limit(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let limit = self.bound_operand(p, &["limit", "take"], "limit")?;

        // OFFSET-first grammars: finish a clause opened by an earlier {{offset}}
        if TRAILING_OFFSET_ROWS_REGEX.is_match(self.preceding) {
            if let Some(fetch) = self.dialect.fetch_clause(&limit) {
                return Ok(Resolved::sql(fetch));
            }
        }

        let clause = self.dialect.paginate(Some(&limit), None)?;
        Ok(self.with_order_by_check(p, clause))
    }

    /// `{{offset}}`, `{{offset @skip}}`
    pub(crate) fn offset(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let offset = self.bound_operand(p, &["offset", "skip"], "offset")?;

        match self.dialect.pagination {
            PaginationStyle::LimitOffset { .. } => {
                if in_current_scope(&LIMIT_REGEX, self.preceding) {
                    return Ok(Resolved::sql(format!("OFFSET {}", offset)));
                }
            }
            PaginationStyle::OffsetFetch => {
                // {{limit}} already emitted OFFSET 0 ROWS FETCH ...; move the offset into it
                if let Some(captures) = TRAILING_FETCH_FROM_ZERO_REGEX.captures(self.preceding) {
                    let clause = self.dialect.paginate(Some(&captures[1]), Some(&offset))?;
                    return Ok(Resolved::sql(clause).replacing(captures[0].len()));
                }
                if TRAILING_FETCH_REGEX.is_match(self.preceding) {
                    return Err(TemplateError::Pagination {
                        dialect: self.dialect.dialect,
                        message: "OFFSET cannot follow a FETCH clause that already sets an offset"
                            .to_string(),
                    });
                }
            }
        }

        let clause = self.dialect.paginate(None, Some(&offset))?;
        Ok(self.with_order_by_check(p, clause))
    }

    /// `{{paginate}}`, `{{paginate @take, @skip}}`, `{{paginate --limit @n --offset @m}}`
    pub(crate) fn paginate(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let limit = match p.args.flag_value(&["limit", "take"]).or(p.args.get(0)) {
            Some(arg) => self.operand(p, arg)?,
            None => self.param("limit"),
        };
        let offset = match p.args.flag_value(&["offset", "skip"]).or(p.args.get(1)) {
            Some(arg) => self.operand(p, arg)?,
            None => self.param("offset"),
        };

        let clause = self.dialect.paginate(Some(&limit), Some(&offset))?;
        Ok(self.with_order_by_check(p, clause))
    }

    /// `{{groupby a, b}}`
    pub(crate) fn group_by(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let columns: Vec<String> = p
            .modifier
            .iter()
            .chain(p.args.positional.iter())
            .map(|column| self.column(p, column))
            .collect::<TemplateResult<_>>()?;

        if columns.is_empty() {
            return Err(TemplateError::missing_argument(p.label(), "column"));
        }

        Ok(Resolved::sql(format!("GROUP BY {}", columns.join(", "))))
    }

    /// `{{having COUNT(*) > 1}}`
    pub(crate) fn having(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        if p.raw_args.is_empty() {
            return Err(TemplateError::missing_argument(p.label(), "condition"));
        }

        security::ensure_safe(&p.raw_args, FragmentKind::Fragment, &p.label())?;
        Ok(Resolved::sql(format!("HAVING {}", p.raw_args)))
    }

    /// `{{join:left orders --on users.id = orders.user_id}}`
    pub(crate) fn join(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let requested: JoinKind = match p.modifier.as_deref().or(p.args.flag_value(&["type"])) {
            Some(kind) => kind
                .parse()
                .map_err(|message: String| TemplateError::invalid_argument(p.label(), message))?,
            None => JoinKind::Inner,
        };

        let table = p
            .args
            .first()
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "table"))?;
        let table = self.column(p, table)?;

        let mut resolved = Resolved::default();
        let kind = if self.dialect.supports_join(requested) {
            requested
        } else {
            tracing::warn!(
                "{} has no {}; falling back to LEFT JOIN",
                self.dialect.dialect,
                requested.keyword()
            );
            resolved.warnings.push(TemplateWarning::fallback(
                self.dialect.dialect,
                requested.keyword(),
                JoinKind::Left.keyword(),
            ));
            JoinKind::Left
        };

        resolved.sql = match (kind, p.args.flag_text("on")) {
            (JoinKind::Cross, _) => format!("{} {}", kind.keyword(), table),
            (_, Some(condition)) => {
                security::ensure_safe(&condition, FragmentKind::Fragment, &p.label())?;
                format!("{} {} ON {}", kind.keyword(), table, condition)
            }
            (_, None) => return Err(TemplateError::missing_argument(p.label(), "--on")),
        };

        Ok(resolved)
    }

    /// First positional argument or flag as an operand, else a parameter
    /// named `default_name`
    fn bound_operand(
        &self,
        p: &Placeholder,
        flags: &[&str],
        default_name: &str,
    ) -> TemplateResult<String> {
        match p.args.first().or(p.args.flag_value(flags)) {
            Some(arg) => self.operand(p, arg),
            None => Ok(self.param(default_name)),
        }
    }

    /// Attach a warning when the grammar needs ORDER BY and none precedes
    fn with_order_by_check(&self, p: &Placeholder, clause: String) -> Resolved {
        let resolved = Resolved::sql(clause);
        if self.dialect.requires_order_by() && !in_current_scope(&ORDER_BY_REGEX, self.preceding) {
            tracing::warn!(
                "'{}' on {} without a preceding ORDER BY",
                p.label(),
                self.dialect.dialect
            );
            return resolved.with_warning(TemplateWarning::MissingOrderBy {
                dialect: self.dialect.dialect,
                placeholder: p.label(),
            });
        }
        resolved
    }
}

/// Whether `keyword` matches in the parenthesis scope open at the end of
/// `sql`. Matches inside closed groups, such as `OVER (ORDER BY ..)` or a
/// subquery, and inside string literals do not count.
fn in_current_scope(keyword: &Regex, sql: &str) -> bool {
    let mut starts = keyword.find_iter(sql).map(|m| m.start()).peekable();
    let mut scopes = vec![false];
    let mut in_string = false;

    for (index, c) in sql.char_indices() {
        if starts.peek() == Some(&index) {
            starts.next();
            if !in_string {
                if let Some(seen) = scopes.last_mut() {
                    *seen = true;
                }
            }
        }

        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => scopes.push(false),
            ')' if !in_string && scopes.len() > 1 => {
                scopes.pop();
            }
            _ => {}
        }
    }

    scopes.last().copied().unwrap_or(false)
}
