//! Entity-driven resolvers: table, columns, values, set, where

use super::{ResolveContext, Resolved};
use crate::error::{TemplateError, TemplateResult};
use crate::security::{self, FragmentKind};
use crate::template::tokenizer::Placeholder;

impl ResolveContext<'_> {
    /// `{{table}}`, `{{table Orders}}`, `{{table:quoted}}`
    pub(crate) fn table(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        if let Some(modifier) = p.modifier.as_deref() {
            if modifier != "quoted" {
                return Err(TemplateError::invalid_argument(
                    p.label(),
                    format!("unknown table modifier '{}'", modifier),
                ));
            }
        }

        let name = match p.args.first() {
            Some(name) => self.column(p, name)?,
            None => self.table_name(p)?,
        };

        if self.wants_quoted(p) {
            Ok(Resolved::sql(self.dialect.quote_qualified(&name)))
        } else {
            Ok(Resolved::sql(name))
        }
    }

    /// `{{columns [--exclude ..|--only ..]}}`
    pub(crate) fn columns(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (fields, warnings) = self.filtered_fields(p, false)?;
        let quoted = self.wants_quoted(p);

        let columns: Vec<String> = fields
            .iter()
            .map(|f| {
                let column = f.column_name();
                if quoted {
                    self.dialect.wrap_column(&column)
                } else {
                    column
                }
            })
            .collect();

        Ok(Resolved::sql(columns.join(", ")).with_warnings(warnings))
    }

    /// `{{values}}`: one parameter per field selected by the same filters as
    /// `{{columns}}`
    pub(crate) fn values(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (fields, warnings) = self.filtered_fields(p, false)?;

        let params: Vec<String> = fields.iter().map(|f| self.param(&f.column_name())).collect();

        Ok(Resolved::sql(params.join(", ")).with_warnings(warnings))
    }

    /// `{{set}}`: `col = @col` pairs, primary keys excluded
    pub(crate) fn set(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let (fields, warnings) = self.filtered_fields(p, true)?;
        let quoted = self.wants_quoted(p);

        let pairs: Vec<String> = fields
            .iter()
            .map(|f| {
                let column = f.column_name();
                let target = if quoted {
                    self.dialect.wrap_column(&column)
                } else {
                    column.clone()
                };
                format!("{} = {}", target, self.param(&column))
            })
            .collect();

        Ok(Resolved::sql(pairs.join(", ")).with_warnings(warnings))
    }

    /// `{{where:col}}`, `{{where col ..}}`, `{{where}}` (primary keys) and
    /// `{{where:auto}}` (method parameters that name entity fields)
    pub(crate) fn where_clause(&self, p: &Placeholder) -> TemplateResult<Resolved> {
        let conditions: Vec<String> = match p.modifier.as_deref() {
            Some("auto") => self.where_auto(p)?,
            Some(column) => vec![self.equality(p, column, None)?],
            None if !p.args.positional.is_empty() => p
                .args
                .positional
                .iter()
                .map(|column| self.equality(p, column, None))
                .collect::<TemplateResult<_>>()?,
            None => {
                let keys = self.entity.primary_keys();
                if keys.is_empty() {
                    return Err(TemplateError::missing_argument(
                        p.label(),
                        format!("column (entity '{}' has no primary key)", self.entity.name),
                    ));
                }
                keys.iter()
                    .map(|f| self.equality(p, &f.column_name(), None))
                    .collect::<TemplateResult<_>>()?
            }
        };

        Ok(Resolved::sql(format!("WHERE {}", conditions.join(" AND "))))
    }

    fn where_auto(&self, p: &Placeholder) -> TemplateResult<Vec<String>> {
        let conditions: Vec<String> = self
            .method
            .parameters
            .iter()
            .filter_map(|param| {
                self.entity
                    .field(&param.name)
                    .map(|field| (field.column_name(), param.name.as_str()))
            })
            .map(|(column, param)| self.equality(p, &column, Some(param)))
            .collect::<TemplateResult<_>>()?;

        if conditions.is_empty() {
            return Err(TemplateError::invalid_argument(
                p.label(),
                format!(
                    "no parameter of method '{}' matches a field of '{}'",
                    self.method.name, self.entity.name
                ),
            ));
        }

        Ok(conditions)
    }

    /// `<quoted column> = <param>`; the parameter defaults to the unqualified
    /// column name
    fn equality(&self, p: &Placeholder, column: &str, param: Option<&str>) -> TemplateResult<String> {
        let column = self.column(p, column)?;
        let param = match param {
            Some(param) => {
                security::ensure_safe(param, FragmentKind::Identifier, &p.label())?;
                param
            }
            None => column.rsplit('.').next().unwrap_or(&column),
        };

        Ok(format!(
            "{} = {}",
            self.dialect.quote_qualified(&column),
            self.param(param)
        ))
    }
}
