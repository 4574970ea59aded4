//! Placeholder resolvers
//!
//! One resolver per [`PlaceholderKind`], implemented as methods on
//! [`ResolveContext`] and grouped by concern:
//! - `entity`: table, columns, values, set, where
//! - `clauses`: orderby, pagination, groupby, having, join
//! - `predicates`: between, in, not_in, like
//! - `functions`: literals, aggregates, coalesce, group_concat, scalars, cast
//! - `native`: JSON path, array access, full-text search
//! - `statements`: batch insert, upsert, insert with returned id

mod clauses;
mod entity;
mod functions;
mod native;
mod predicates;
mod statements;

use super::kind::PlaceholderKind;
use super::tokenizer::Placeholder;
use crate::config::EngineConfig;
use crate::descriptor::{EntityDescriptor, FieldDescriptor, MethodDescriptor};
use crate::dialect::DialectDescriptor;
use crate::error::{TemplateError, TemplateResult, TemplateWarning};
use crate::naming::to_snake_case_qualified;
use crate::security::{self, FragmentKind};

/// Output of one resolver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub sql: String,
    pub warnings: Vec<TemplateWarning>,
    /// Bytes at the end of the preceding text that `sql` replaces
    pub replaces_preceding: usize,
}

impl Resolved {
    pub fn sql(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            warnings: Vec::new(),
            replaces_preceding: 0,
        }
    }

    pub fn replacing(mut self, len: usize) -> Self {
        self.replaces_preceding = len;
        self
    }

    pub fn with_warning(mut self, warning: TemplateWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<TemplateWarning>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a resolver may read. All of it is immutable.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub entity: &'a EntityDescriptor,
    pub method: &'a MethodDescriptor,
    /// Default table name, as given by the caller
    pub table: &'a str,
    pub dialect: &'static DialectDescriptor,
    pub config: &'a EngineConfig,
    /// Already resolved text left of the placeholder in the current pass
    pub preceding: &'a str,
}

/// Resolve one placeholder
pub fn resolve(placeholder: &Placeholder, ctx: &ResolveContext<'_>) -> TemplateResult<Resolved> {
    match placeholder.kind {
        PlaceholderKind::Table => ctx.table(placeholder),
        PlaceholderKind::Columns => ctx.columns(placeholder),
        PlaceholderKind::Values => ctx.values(placeholder),
        PlaceholderKind::Set => ctx.set(placeholder),
        PlaceholderKind::Where => ctx.where_clause(placeholder),
        PlaceholderKind::OrderBy => ctx.order_by(placeholder),
        PlaceholderKind::Limit => ctx.limit(placeholder),
        PlaceholderKind::Offset => ctx.offset(placeholder),
        PlaceholderKind::Paginate => ctx.paginate(placeholder),
        PlaceholderKind::GroupBy => ctx.group_by(placeholder),
        PlaceholderKind::Having => ctx.having(placeholder),
        PlaceholderKind::Join => ctx.join(placeholder),
        PlaceholderKind::Between => ctx.between(placeholder),
        PlaceholderKind::In => ctx.in_list(placeholder, false),
        PlaceholderKind::NotIn => ctx.in_list(placeholder, true),
        PlaceholderKind::Like => ctx.like(placeholder),
        PlaceholderKind::BoolTrue => Ok(Resolved::sql(ctx.dialect.bool_literal(true))),
        PlaceholderKind::BoolFalse => Ok(Resolved::sql(ctx.dialect.bool_literal(false))),
        PlaceholderKind::CurrentTimestamp => Ok(Resolved::sql(ctx.dialect.current_timestamp)),
        PlaceholderKind::Aggregate(function) => ctx.aggregate(placeholder, function),
        PlaceholderKind::Coalesce => ctx.coalesce(placeholder),
        PlaceholderKind::GroupConcat => ctx.group_concat(placeholder),
        PlaceholderKind::Scalar(function) => ctx.scalar(placeholder, function),
        PlaceholderKind::Cast => ctx.cast(placeholder),
        PlaceholderKind::JsonPath => ctx.json_path(placeholder),
        PlaceholderKind::ArrayAccess => ctx.array_access(placeholder),
        PlaceholderKind::FullText => ctx.full_text(placeholder),
        PlaceholderKind::BatchInsert => ctx.batch_insert(placeholder),
        PlaceholderKind::Upsert => ctx.upsert(placeholder),
        PlaceholderKind::InsertReturning => ctx.insert_returning(placeholder),
    }
}

/// Characters that introduce a named parameter in any supported dialect
const PARAMETER_MARKERS: [char; 4] = ['@', ':', '$', '?'];

impl<'a> ResolveContext<'a> {
    /// Named parameter marker for `name`
    pub(crate) fn param(&self, name: &str) -> String {
        self.dialect.parameter(name)
    }

    /// Whether the placeholder asks for quoted identifiers
    pub(crate) fn wants_quoted(&self, p: &Placeholder) -> bool {
        p.modifier.as_deref() == Some("quoted") || p.args.has_flag("quoted")
    }

    /// Snake-cased default table name
    pub(crate) fn table_name(&self, p: &Placeholder) -> TemplateResult<String> {
        security::ensure_safe(self.table, FragmentKind::TablePart, &p.label())?;
        Ok(to_snake_case_qualified(self.table))
    }

    /// Column name from a placeholder argument; dotted names are allowed
    pub(crate) fn column(&self, p: &Placeholder, arg: &str) -> TemplateResult<String> {
        security::ensure_safe(arg, FragmentKind::TablePart, &p.label())?;
        Ok(match self.entity.field(arg) {
            Some(field) => field.column_name(),
            None => to_snake_case_qualified(arg),
        })
    }

    /// Column from the modifier (`like:name`) or a `--column` flag
    pub(crate) fn target_column(&self, p: &Placeholder) -> TemplateResult<Option<String>> {
        let name = p
            .modifier
            .as_deref()
            .or_else(|| p.args.flag_value(&["column", "col"]));
        name.map(|n| self.column(p, n).map(|c| self.dialect.wrap_column(&c)))
            .transpose()
    }

    /// A bindable operand: caller-written parameter markers and literals are
    /// echoed verbatim, bare names become dialect parameters.
    pub(crate) fn operand(&self, p: &Placeholder, arg: &str) -> TemplateResult<String> {
        let arg = arg.trim();

        if is_parameter_reference(arg) || is_numeric_literal(arg) {
            return Ok(arg.to_string());
        }

        if is_string_literal(arg) {
            security::ensure_safe(arg, FragmentKind::Fragment, &p.label())?;
            return Ok(arg.to_string());
        }

        if security::is_valid_identifier(arg) {
            return Ok(self.param(arg));
        }

        Err(TemplateError::unsafe_fragment(
            p.label(),
            FragmentKind::Fragment,
            arg,
        ))
    }

    /// A SQL expression argument: names become snake-cased columns,
    /// parameters and literals pass through, anything else must be a safe
    /// fragment.
    pub(crate) fn expression(&self, p: &Placeholder, arg: &str) -> TemplateResult<String> {
        let arg = arg.trim();

        if arg == "*" || is_parameter_reference(arg) || is_numeric_literal(arg) {
            return Ok(arg.to_string());
        }

        if security::is_valid_table_part(arg) {
            return self.column(p, arg);
        }

        security::ensure_safe(arg, FragmentKind::Fragment, &p.label())?;
        Ok(arg.to_string())
    }

    /// Entity fields after `--exclude` / `--only` filtering, in declaration
    /// order. Primary keys are dropped first when `skip_keys` is set, unless
    /// `--only` names them.
    pub(crate) fn filtered_fields(
        &self,
        p: &Placeholder,
        skip_keys: bool,
    ) -> TemplateResult<(Vec<&'a FieldDescriptor>, Vec<TemplateWarning>)> {
        let exclude = p.args.flag("exclude");
        let only = p.args.flag("only");
        let mut warnings = Vec::new();

        if exclude.is_some() && only.is_some() {
            return Err(TemplateError::conflicting_options(
                p.label(),
                "--exclude and --only cannot be combined",
            ));
        }

        let fields: Vec<&'a FieldDescriptor> = match (only, exclude) {
            (Some(only), _) => {
                for name in only {
                    if self.entity.field(name).is_none() {
                        return Err(TemplateError::invalid_argument(
                            p.label(),
                            format!("unknown field '{}' in --only", name),
                        ));
                    }
                }
                self.entity
                    .fields
                    .iter()
                    .filter(|f| only.iter().any(|name| f.matches(name)))
                    .collect()
            }
            (None, exclude) => {
                let exclude = exclude.unwrap_or(&[]);
                for name in exclude {
                    if self.entity.field(name).is_none() {
                        warnings.push(TemplateWarning::UnknownField {
                            placeholder: p.label(),
                            field: name.clone(),
                        });
                    }
                }
                self.entity
                    .fields
                    .iter()
                    .filter(|f| !(skip_keys && f.is_primary_key))
                    .filter(|f| !exclude.iter().any(|name| f.matches(name)))
                    .collect()
            }
        };

        if fields.is_empty() {
            return Err(TemplateError::invalid_argument(
                p.label(),
                format!("no fields of entity '{}' remain after filtering", self.entity.name),
            ));
        }

        Ok((fields, warnings))
    }

    /// Key columns: `--key` values, otherwise the primary keys
    pub(crate) fn key_fields(&self, p: &Placeholder) -> TemplateResult<Vec<&'a FieldDescriptor>> {
        let keys: Vec<&'a FieldDescriptor> = match p.args.flag("key") {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.entity.field(name).ok_or_else(|| {
                        TemplateError::invalid_argument(
                            p.label(),
                            format!("unknown key field '{}'", name),
                        )
                    })
                })
                .collect::<TemplateResult<_>>()?,
            None => self.entity.primary_keys(),
        };

        if keys.is_empty() {
            return Err(TemplateError::missing_argument(
                p.label(),
                format!("key column (entity '{}' has no primary key)", self.entity.name),
            ));
        }

        Ok(keys)
    }
}

/// `@name`, `:name`, `$name` or a bare `?`
pub(crate) fn is_parameter_reference(arg: &str) -> bool {
    if arg == "?" {
        return true;
    }

    let mut chars = arg.chars();
    match chars.next() {
        Some(marker) if PARAMETER_MARKERS.contains(&marker) => {
            security::is_valid_identifier(chars.as_str())
        }
        _ => false,
    }
}

pub(crate) fn is_numeric_literal(arg: &str) -> bool {
    let digits = arg.strip_prefix('-').unwrap_or(arg);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}

pub(crate) fn is_string_literal(arg: &str) -> bool {
    arg.len() >= 2 && arg.starts_with('\'') && arg.ends_with('\'')
}
