//! Function resolvers: aggregates, coalesce, group_concat, scalar functions
//! and casts

use super::{is_string_literal, ResolveContext, Resolved};
use crate::dialect::SemanticType;
use crate::error::{TemplateError, TemplateResult};
use crate::security::{self, FragmentKind};
use crate::template::kind::{AggregateFunction, ScalarFunction};
use crate::template::tokenizer::Placeholder;

impl ResolveContext<'_> {
    /// `{{count}}`, `{{count:all}}`, `{{sum amount}}`, `{{count:id --distinct}}`
    pub(crate) fn aggregate(
        &self,
        p: &Placeholder,
        function: AggregateFunction,
    ) -> TemplateResult<Resolved> {
        let distinct = p.args.has_flag("distinct");
        let target = self.single_expression_arg(p);

        let is_star = match target.as_deref() {
            None => function == AggregateFunction::Count,
            Some(arg) => arg == "*" || arg.eq_ignore_ascii_case("all"),
        };

        if is_star {
            if function != AggregateFunction::Count {
                return Err(TemplateError::invalid_argument(
                    p.label(),
                    format!("{}(*) is not valid SQL", function.sql_name()),
                ));
            }
            if distinct {
                return Err(TemplateError::conflicting_options(
                    p.label(),
                    "--distinct needs a column, not all rows",
                ));
            }
            return Ok(Resolved::sql("COUNT(*)"));
        }

        let target = target.ok_or_else(|| TemplateError::missing_argument(p.label(), "column"))?;
        let expression = self.expression(p, &target)?;

        let sql = if distinct {
            format!("{}(DISTINCT {})", function.sql_name(), expression)
        } else {
            format!("{}({})", function.sql_name(), expression)
        };
        Ok(Resolved::sql(sql))
    }

    /// `{{coalesce a, b, 0}}`
    pub(crate) fn coalesce(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        if p.args.positional.len() < 2 {
            return Err(TemplateError::missing_argument(
                p.label(),
                "at least two expressions",
            ));
        }

        let expressions: Vec<String> = p
            .args
            .positional
            .iter()
            .map(|arg| self.literal_or_expression(p, arg))
            .collect::<TemplateResult<_>>()?;

        Ok(Resolved::sql(format!("COALESCE({})", expressions.join(", "))))
    }

    /// `{{group_concat name --separator ', '}}`
    pub(crate) fn group_concat(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let target = self
            .single_expression_arg(p)
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "column"))?;
        let expression = self.expression(p, &target)?;

        let separator = match p.args.flag_value(&["separator", "sep"]) {
            Some(separator) => self.separator_literal(p, separator)?,
            None => "','".to_string(),
        };

        Ok(Resolved::sql(
            self.dialect.group_concat.render(&expression, &separator),
        ))
    }

    /// `{{round x, 2}}`, `{{upper name}}`, `{{length name}}`, `{{abs x}}`
    pub(crate) fn scalar(
        &self,
        p: &Placeholder,
        function: ScalarFunction,
    ) -> TemplateResult<Resolved> {
        let target = p
            .modifier
            .as_deref()
            .or(p.args.first())
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "expression"))?;
        let expression = self.expression(p, target)?;

        let sql = match function {
            ScalarFunction::Round => {
                let precision = p
                    .args
                    .flag_value(&["precision", "digits"])
                    .or_else(|| match p.modifier {
                        Some(_) => p.args.get(0),
                        None => p.args.get(1),
                    })
                    .unwrap_or("0");
                format!("ROUND({}, {})", expression, self.operand(p, precision)?)
            }
            ScalarFunction::Upper => format!("UPPER({})", expression),
            ScalarFunction::Lower => format!("LOWER({})", expression),
            ScalarFunction::Length => format!("{}({})", self.dialect.length_function, expression),
            ScalarFunction::Abs => format!("ABS({})", expression),
        };

        Ok(Resolved::sql(sql))
    }

    /// `{{cast price, decimal}}`, `{{cast created_at --as date}}`
    pub(crate) fn cast(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let target = p
            .args
            .first()
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "expression"))?;
        let type_name = p
            .modifier
            .as_deref()
            .or(p.args.flag_value(&["as", "type"]))
            .or(p.args.get(1))
            .ok_or_else(|| TemplateError::missing_argument(p.label(), "type"))?;

        let semantic: SemanticType = type_name
            .parse()
            .map_err(|message: String| TemplateError::invalid_argument(p.label(), message))?;

        Ok(Resolved::sql(format!(
            "CAST({} AS {})",
            self.literal_or_expression(p, target)?,
            self.dialect.native_type(semantic)
        )))
    }

    /// The expression an aggregate-like placeholder operates on: the
    /// modifier, or the positional words joined back together
    fn single_expression_arg(&self, p: &Placeholder) -> Option<String> {
        match p.modifier.as_deref() {
            Some(modifier) => Some(modifier.to_string()),
            None if p.args.positional.is_empty() => None,
            None => Some(p.args.positional.join(" ")),
        }
    }

    fn literal_or_expression(&self, p: &Placeholder, arg: &str) -> TemplateResult<String> {
        if is_string_literal(arg.trim()) {
            security::ensure_safe(arg.trim(), FragmentKind::Fragment, &p.label())?;
            return Ok(arg.trim().to_string());
        }
        self.expression(p, arg)
    }

    /// Normalize a separator into a single-quoted SQL literal
    fn separator_literal(&self, p: &Placeholder, separator: &str) -> TemplateResult<String> {
        let inner = if is_string_literal(separator) {
            &separator[1..separator.len() - 1]
        } else {
            separator
        };

        if inner.contains('\'') || security::contains_dangerous_keyword(inner) {
            return Err(TemplateError::unsafe_fragment(
                p.label(),
                FragmentKind::Fragment,
                separator,
            ));
        }

        Ok(format!("'{}'", inner))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::dialect::SqlDialect;
    use crate::error::TemplateError;

    #[test]
    fn test_aggregates() {
        assert_eq!(resolve_sql(SqlDialect::SqlServer, "{{count}}"), "COUNT(*)");
        assert_eq!(resolve_sql(SqlDialect::SqlServer, "{{count all}}"), "COUNT(*)");
        assert_eq!(resolve_sql(SqlDialect::SqlServer, "{{count:all}}"), "COUNT(*)");
        assert_eq!(resolve_sql(SqlDialect::MySql, "{{avg balance}}"), "AVG(balance)");
        assert_eq!(
            resolve_sql(SqlDialect::PostgreSql, "{{count:Email --distinct}}"),
            "COUNT(DISTINCT email)"
        );
        assert_eq!(
            resolve_sql(SqlDialect::Sqlite, "{{sum price * quantity}}"),
            "SUM(price * quantity)"
        );
    }

    #[test]
    fn test_aggregate_argument_errors() {
        let err = resolve_in(SqlDialect::SqlServer, "", "{{sum}}").unwrap_err();
        assert!(matches!(err, TemplateError::MissingArgument { .. }));

        let err = resolve_in(SqlDialect::SqlServer, "", "{{max *}}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidArgument { .. }));

        let err = resolve_in(SqlDialect::SqlServer, "", "{{count --distinct}}").unwrap_err();
        assert!(matches!(err, TemplateError::ConflictingOptions { .. }));
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{coalesce ROUND(AVG(balance), 2), 0}}"),
            "COALESCE(ROUND(AVG(balance), 2), 0)"
        );
        assert_eq!(
            resolve_sql(SqlDialect::PostgreSql, "{{coalesce NickName, Name, 'anonymous'}}"),
            "COALESCE(nick_name, name, 'anonymous')"
        );

        let err = resolve_in(SqlDialect::SqlServer, "", "{{coalesce name}}").unwrap_err();
        assert!(matches!(err, TemplateError::MissingArgument { .. }));
    }

    #[test]
    fn test_group_concat_per_dialect() {
        assert_eq!(
            resolve_sql(SqlDialect::MySql, "{{group_concat name}}"),
            "GROUP_CONCAT(name SEPARATOR ',')"
        );
        assert_eq!(
            resolve_sql(SqlDialect::Sqlite, "{{group_concat name --separator ', '}}"),
            "GROUP_CONCAT(name, ', ')"
        );
        assert_eq!(
            resolve_sql(SqlDialect::Oracle, "{{group_concat name --separator |}}"),
            "LISTAGG(name, '|') WITHIN GROUP (ORDER BY name)"
        );

        let err = resolve_in(SqlDialect::PostgreSql, "", "{{group_concat name --separator ;}}")
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnsafeFragment { .. }));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{round AVG(balance), 2}}"),
            "ROUND(AVG(balance), 2)"
        );
        assert_eq!(resolve_sql(SqlDialect::SqlServer, "{{round price}}"), "ROUND(price, 0)");
        assert_eq!(resolve_sql(SqlDialect::MySql, "{{upper Name}}"), "UPPER(name)");
        assert_eq!(resolve_sql(SqlDialect::SqlServer, "{{length name}}"), "LEN(name)");
        assert_eq!(resolve_sql(SqlDialect::MySql, "{{length name}}"), "CHAR_LENGTH(name)");
        assert_eq!(resolve_sql(SqlDialect::Oracle, "{{abs delta}}"), "ABS(delta)");
    }

    #[test]
    fn test_cast_uses_native_types() {
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{cast id, int64}}"),
            "CAST(id AS BIGINT)"
        );
        assert_eq!(
            resolve_sql(SqlDialect::SqlServer, "{{cast ExternalId --as uuid}}"),
            "CAST(external_id AS UNIQUEIDENTIFIER)"
        );

        let err = resolve_in(SqlDialect::SqlServer, "", "{{cast id, spaceship}}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidArgument { .. }));
    }
}
