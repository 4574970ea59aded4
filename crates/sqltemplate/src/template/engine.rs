//! Template engine
//!
//! Resolves innermost placeholders pass by pass until none remain, then
//! builds the parameter binding plan. The engine holds only configuration;
//! one instance can serve any number of threads.

use serde::Serialize;

use super::binding::bind_parameters;
use super::resolvers::{resolve, ResolveContext};
use super::tokenizer::{check_balance, has_placeholders, innermost_spans, parse_placeholder};
use crate::config::EngineConfig;
use crate::descriptor::{EntityDescriptor, MethodDescriptor};
use crate::dialect::SqlDialect;
use crate::error::{TemplateError, TemplateResult, TemplateWarning};

/// Per-call inputs for template resolution
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub entity: &'a EntityDescriptor,
    pub method: &'a MethodDescriptor,
    /// Default table name; snake-cased on output
    pub table: &'a str,
    pub dialect: SqlDialect,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        entity: &'a EntityDescriptor,
        method: &'a MethodDescriptor,
        table: &'a str,
        dialect: SqlDialect,
    ) -> Self {
        Self {
            entity,
            method,
            table,
            dialect,
        }
    }
}

/// Outcome of resolving one template
///
/// Errors are build failures for the caller; warnings are informational.
/// When a fatal error aborts resolution `processed_sql` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub processed_sql: String,
    pub parameters: Vec<String>,
    pub errors: Vec<TemplateError>,
    pub warnings: Vec<TemplateWarning>,
}

impl ProcessingResult {
    fn aborted(mut errors: Vec<TemplateError>, warnings: Vec<TemplateWarning>, fatal: TemplateError) -> Self {
        tracing::error!("Template resolution aborted: {}", fatal);
        errors.push(fatal);
        Self {
            processed_sql: String::new(),
            parameters: Vec::new(),
            errors,
            warnings,
        }
    }

    /// Whether resolution produced no errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Serialize for build tooling
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert into compiled SQL, failing with the first error
    pub fn into_compiled(self) -> TemplateResult<CompiledSql> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(CompiledSql {
                sql: self.processed_sql,
                parameters: self.parameters,
                warnings: self.warnings,
            }),
        }
    }
}

/// Successfully resolved SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSql {
    pub sql: String,
    pub parameters: Vec<String>,
    pub warnings: Vec<TemplateWarning>,
}

/// Compile-time SQL template engine
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    config: EngineConfig,
}

impl TemplateEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve every placeholder in `template`
    pub fn process(&self, template: &str, ctx: &TemplateContext<'_>) -> ProcessingResult {
        let descriptor = ctx.dialect.descriptor();
        let mut errors: Vec<TemplateError> = Vec::new();
        let mut warnings: Vec<TemplateWarning> = Vec::new();

        if let Err(error) = check_balance(template) {
            return ProcessingResult::aborted(errors, warnings, error);
        }

        let mut text = template.to_string();
        let mut passes = 0;

        while has_placeholders(&text) {
            if passes == self.config.max_iterations {
                return ProcessingResult::aborted(
                    errors,
                    warnings,
                    TemplateError::IterationLimit { passes },
                );
            }
            passes += 1;

            let spans = innermost_spans(&text);
            if spans.is_empty() {
                let position = text.find("{{").unwrap_or_default();
                return ProcessingResult::aborted(
                    errors,
                    warnings,
                    TemplateError::UnbalancedBraces { position },
                );
            }
            tracing::debug!(
                "Resolution pass {} on {}: {} placeholder(s)",
                passes,
                ctx.dialect,
                spans.len()
            );

            let mut resolved_text = String::with_capacity(text.len());
            let mut cursor = 0;

            for span in spans {
                resolved_text.push_str(&text[cursor..span.start]);
                cursor = span.end;

                let outcome = parse_placeholder(&text, span).and_then(|placeholder| {
                    tracing::trace!("Resolving '{}' placeholder", placeholder.label());
                    let resolve_ctx = ResolveContext {
                        entity: ctx.entity,
                        method: ctx.method,
                        table: ctx.table,
                        dialect: descriptor,
                        config: &self.config,
                        preceding: &resolved_text,
                    };
                    resolve(&placeholder, &resolve_ctx)
                });

                match outcome {
                    Ok(resolved) => {
                        let keep = resolved_text.len().saturating_sub(resolved.replaces_preceding);
                        resolved_text.truncate(keep);
                        resolved_text.push_str(&resolved.sql);
                        warnings.extend(resolved.warnings);
                    }
                    Err(error) if error.is_fatal() => {
                        return ProcessingResult::aborted(errors, warnings, error);
                    }
                    Err(error) => {
                        tracing::warn!("Placeholder resolution failed: {}", error);
                        errors.push(error);
                    }
                }
            }

            resolved_text.push_str(&text[cursor..]);
            text = resolved_text;
        }

        let bound = bind_parameters(&text, descriptor, self.config.parameter_style(ctx.dialect));
        tracing::debug!(
            "Resolved template for {} in {} pass(es): {} parameter(s), {} error(s), {} warning(s)",
            ctx.dialect,
            passes,
            bound.parameters.len(),
            errors.len(),
            warnings.len()
        );

        ProcessingResult {
            processed_sql: bound.sql,
            parameters: bound.parameters,
            errors,
            warnings,
        }
    }

    /// Resolve `template` and fail on the first error
    pub fn compile(&self, template: &str, ctx: &TemplateContext<'_>) -> TemplateResult<CompiledSql> {
        self.process(template, ctx).into_compiled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, ParameterDescriptor};
    use crate::dialect::{ParameterStyle, SemanticType};

    fn account_entity() -> EntityDescriptor {
        EntityDescriptor::new("Account")
            .with_field(FieldDescriptor::new("Id", SemanticType::Int64).primary_key())
            .with_field(FieldDescriptor::new("Owner", SemanticType::String))
            .with_field(FieldDescriptor::new("Balance", SemanticType::Decimal))
            .with_field(FieldDescriptor::new("IsActive", SemanticType::Boolean))
    }

    fn by_owner() -> MethodDescriptor {
        MethodDescriptor::new("FindByOwner")
            .with_parameter(ParameterDescriptor::new("owner", SemanticType::String))
    }

    fn process(engine: &TemplateEngine, dialect: SqlDialect, template: &str) -> ProcessingResult {
        let entity = account_entity();
        let method = by_owner();
        let ctx = TemplateContext::new(&entity, &method, "Accounts", dialect);
        engine.process(template, &ctx)
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let engine = TemplateEngine::default();
        for dialect in SqlDialect::ALL {
            let sql = "SELECT 1 FROM dual WHERE a = @a AND b = ':b'";
            let result = process(&engine, dialect, sql);
            assert_eq!(result.processed_sql, sql);
            assert!(result.is_success());
        }
    }

    #[test]
    fn test_simple_select() {
        let engine = TemplateEngine::default();
        let result = process(
            &engine,
            SqlDialect::SqlServer,
            "SELECT {{columns}} FROM {{table}} {{where:auto}}",
        );
        assert!(result.is_success(), "{:?}", result.errors);
        assert_eq!(
            result.processed_sql,
            "SELECT id, owner, balance, is_active FROM accounts WHERE [owner] = @owner"
        );
        assert_eq!(result.parameters, vec!["owner".to_string()]);
    }

    #[test]
    fn test_nested_resolution() {
        let engine = TemplateEngine::default();
        let result = process(
            &engine,
            SqlDialect::PostgreSql,
            "SELECT {{coalesce {{round {{avg balance}}, 2}}, 0}} FROM {{table}}",
        );
        assert!(result.is_success(), "{:?}", result.errors);
        assert!(!result.processed_sql.contains("{{"));
        assert_eq!(
            result.processed_sql,
            "SELECT COALESCE(ROUND(AVG(balance), 2), 0) FROM accounts"
        );
    }

    #[test]
    fn test_iteration_limit_is_fatal() {
        let engine = TemplateEngine::new(EngineConfig::default().with_max_iterations(2));
        let result = process(
            &engine,
            SqlDialect::SqlServer,
            "SELECT {{coalesce {{round {{avg balance}}, 2}}, 0}}",
        );
        assert_eq!(result.processed_sql, "");
        assert_eq!(result.errors, vec![TemplateError::IterationLimit { passes: 2 }]);
    }

    #[test]
    fn test_unbalanced_braces_abort() {
        let engine = TemplateEngine::default();
        let result = process(&engine, SqlDialect::MySql, "SELECT {{columns FROM t");
        assert_eq!(result.processed_sql, "");
        assert!(matches!(
            result.errors.as_slice(),
            [TemplateError::UnbalancedBraces { position: 7 }]
        ));
    }

    #[test]
    fn test_pagination_error_aborts() {
        let engine = TemplateEngine::default();
        let result = process(
            &engine,
            SqlDialect::MySql,
            "SELECT {{columns}} FROM {{table}} {{offset}}",
        );
        assert_eq!(result.processed_sql, "");
        assert!(matches!(
            result.errors.as_slice(),
            [TemplateError::Pagination { dialect: SqlDialect::MySql, .. }]
        ));
    }

    #[test]
    fn test_non_fatal_errors_are_collected() {
        let engine = TemplateEngine::default();
        let result = process(
            &engine,
            SqlDialect::SqlServer,
            "SELECT {{frobnicate}} FROM {{table}} WHERE {{having 1; DROP TABLE x}}",
        );
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.processed_sql, "SELECT  FROM accounts WHERE ");
        assert!(!result.processed_sql.contains("{{"));
        assert!(result.clone().into_compiled().is_err());
    }

    #[test]
    fn test_offset_fetch_pairing_in_one_pass() {
        let engine = TemplateEngine::default();
        let result = process(
            &engine,
            SqlDialect::SqlServer,
            "SELECT * FROM {{table}} {{orderby}} {{offset}} {{limit}}",
        );
        assert!(result.is_success(), "{:?}", result.errors);
        assert_eq!(
            result.processed_sql,
            "SELECT * FROM accounts ORDER BY id ASC OFFSET @offset ROWS FETCH NEXT @limit ROWS ONLY"
        );
        assert!(!result.has_warnings());
        assert_eq!(result.parameters, vec!["offset".to_string(), "limit".to_string()]);
    }

    #[test]
    fn test_numbered_parameters_via_config() {
        let engine = TemplateEngine::new(
            EngineConfig::default().with_parameter_style(SqlDialect::PostgreSql, ParameterStyle::Numbered),
        );
        let compiled = {
            let entity = account_entity();
            let method = by_owner();
            let ctx = TemplateContext::new(&entity, &method, "Accounts", SqlDialect::PostgreSql);
            engine
                .compile("UPDATE {{table}} SET {{set}} {{where}}", &ctx)
                .unwrap()
        };
        assert_eq!(
            compiled.sql,
            "UPDATE accounts SET owner = $1, balance = $2, is_active = $3 WHERE \"id\" = $4"
        );
        assert_eq!(compiled.parameters, vec!["owner", "balance", "is_active", "id"]);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let engine = TemplateEngine::default();
        let result = process(&engine, SqlDialect::Sqlite, "SELECT {{paginate}} {{bogus}}");
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["errors"][0]["error"], "unknown_placeholder");
        assert_eq!(json["parameters"][0], "limit");
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine>();

        let engine = std::sync::Arc::new(TemplateEngine::default());
        let handles: Vec<_> = SqlDialect::ALL
            .into_iter()
            .map(|dialect| {
                let engine = engine.clone();
                std::thread::spawn(move || {
                    process(&engine, dialect, "SELECT {{columns}} FROM {{table}} WHERE {{bool_true}} = 1")
                        .processed_sql
                })
            })
            .collect();

        for handle in handles {
            let sql = handle.join().unwrap();
            assert!(sql.starts_with("SELECT id, owner, balance, is_active FROM accounts"));
        }
    }
}
