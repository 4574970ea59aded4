//! Dialect-native syntax: JSON paths, array element access, full-text search

use super::{is_numeric_literal, is_string_literal, ResolveContext, Resolved};
use crate::dialect::ArrayAccess;
use crate::error::{TemplateError, TemplateResult, TemplateWarning};
use crate::security::{self, FragmentKind};
use crate::template::tokenizer::Placeholder;

impl ResolveContext<'_> {
    /// `{{json:profile $.address.city}}`, `{{json profile --path '$.tags[0]'}}`
    pub(crate) fn json_path(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (column, rest) = self.column_and_rest(p)?;

        let path = p
            .args
            .flag_value(&["path"])
            .or_else(|| rest.first().copied())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "path"))?;
        let path = validate_json_path(p, path)?;

        Ok(Resolved::sql(
            self.dialect
                .json_path_template
                .replace("{column}", &column)
                .replace("{path}", path),
        ))
    }

    /// `{{array tags, 0}}`, `{{array:tags @index}}`
    pub(crate) fn array_access(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (column, rest) = self.column_and_rest(p)?;

        let index = p
            .args
            .flag_value(&["index"])
            .or_else(|| rest.first().copied())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "index"))?;
        let index = self.operand(p, index)?;

        match self.dialect.array_access {
            ArrayAccess::Subscript => Ok(Resolved::sql(format!("{}[{}]", column, index))),
            ArrayAccess::JsonIndex(function) => {
                let path = if is_numeric_literal(&index) {
                    format!("'$[{}]'", index)
                } else {
                    self.dialect.concat(&["'$['", &index, "']'"])
                };
                Ok(
                    Resolved::sql(format!("{}({}, {})", function, column, path)).with_warning(
                        TemplateWarning::fallback(
                            self.dialect.dialect,
                            "array subscript",
                            format!("{} over a JSON array", function),
                        ),
                    ),
                )
            }
        }
    }

    /// `{{fulltext:body @term}}`, `{{search body --term @q}}`
    pub(crate) fn full_text(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (column, rest) = self.column_and_rest(p)?;

        let term = p
            .args
            .flag_value(&["term", "query"])
            .or_else(|| rest.first().copied())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "term"))?;
        let term = self.operand(p, term)?;

        Ok(Resolved::sql(
            self.dialect
                .full_text_template
                .replace("{column}", &column)
                .replace("{term}", &term),
        ))
    }

    /// Column from the modifier or the first positional argument, plus the
    /// positional arguments left after it
    fn column_and_rest<'p>(&self, p: &'p Placeholder) -> TemplateResult<(String, Vec<&'p str>)> {
        let mut positional = p.args.positional.iter().map(String::as_str);
        let name = match p.modifier.as_deref() {
            Some(modifier) => modifier,
            None => positional
                .next()
                .ok_or_else(|| TemplateError::missing_argument(p.label(), "column"))?,
        };

        Ok((self.column(p, name)?, positional.collect()))
    }
}

/// Accept `$`-rooted JSON paths, optionally single-quoted, without quotes or
/// statement markers inside
fn validate_json_path<'p>(p: &Placeholder, path: &'p str) -> TemplateResult<&'p str> {
    let inner = if is_string_literal(path) {
        &path[1..path.len() - 1]
    } else {
        path
    };

    let safe = inner.starts_with('$')
        && !inner.contains('\'')
        && !inner.contains('"')
        && !security::contains_dangerous_keyword(inner);

    if safe {
        Ok(inner)
    } else {
        Err(TemplateError::unsafe_fragment(
            p.label(),
            FragmentKind::Fragment,
            path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::dialect::SqlDialect;
    use crate::error::{TemplateError, TemplateWarning};

    #[test]
    fn test_json_path_per_dialect() {
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{json:Profile $.address.city}}"),
            "JSON_VALUE(profile, '$.address.city')"
        );
        assert_eq!(
            resolve_sql(SqlDialect::MySql, "{{json profile --path '$.name'}}"),
            "JSON_UNQUOTE(JSON_EXTRACT(profile, '$.name'))"
        );
        assert_eq!(
            resolve_sql(SqlDialect::Sqlite, "{{json profile $.name}}"),
            "json_extract(profile, '$.name')"
        );
    }

    #[test]
    fn test_json_path_output_is_a_valid_fragment() {
        assert_eq!(
            resolve_sql(SqlDialect::PostgreSql, "{{json profile $.city}}"),
            "jsonb_build_array(jsonb_path_query_first(profile, '$.city')) ->> 0"
        );
        for dialect in SqlDialect::ALL {
            let sql = resolve_sql(dialect, "{{json profile $.address.city}}");
            assert!(crate::security::is_valid_fragment(&sql), "{}: {}", dialect, sql);
        }
    }

    #[test]
    fn test_json_path_rejects_breakout() {
        for template in [
            "{{json profile $.a'); DROP TABLE users}}",
            "{{json profile address}}",
        ] {
            let err = resolve_in(SqlDialect::PostgreSql, "", template).unwrap_err();
            assert!(matches!(err, TemplateError::UnsafeFragment { .. }), "{}", template);
        }
    }

    #[test]
    fn test_array_subscript() {
        assert_eq!(resolve_sql(SqlDialect::PostgreSql, "{{array tags, 0}}"), "tags[0]");
        assert_eq!(resolve_sql(SqlDialect::PostgreSql, "{{array:tags @i}}"), "tags[@i]");
    }

    #[test]
    fn test_array_json_index_fallback() {
        let resolved = resolve_in(SqlDialect::MySql, "", "{{array tags, 2}}").unwrap();
        assert_eq!(resolved.sql, "JSON_EXTRACT(tags, '$[2]')");
        assert!(matches!(
            resolved.warnings.as_slice(),
            [TemplateWarning::CapabilityFallback { .. }]
        ));

        assert_eq!(
            resolve_sql(SqlDialect::Sqlite, "{{array tags, @i}}"),
            "json_extract(tags, '$[' || @i || ']')"
        );
    }

    #[test]
    fn test_full_text_per_dialect() {
        assert_eq!(
            resolve_sql(SqlDialect::PostgreSql, "{{fulltext:body @term}}"),
            "to_tsvector(body) @@ plainto_tsquery(@term)"
        );
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{search body --term @q}}"),
            "CONTAINS(body, @q)"
        );
        assert_eq!(
            resolve_sql(SqlDialect::Sqlite, "{{fulltext body, @q}}"),
            "body MATCH @q"
        );
    }
}
