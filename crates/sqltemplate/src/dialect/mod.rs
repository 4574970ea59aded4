//! SQL dialect descriptors
//!
//! Every supported database is described by one immutable
//! [`DialectDescriptor`] held in a static table. Resolvers never branch on
//! dialect names; they read capabilities off the descriptor.

pub mod pagination;
pub mod strategy;
pub mod types;

pub use pagination::*;
pub use strategy::*;
pub use types::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported target databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[serde(alias = "mssql")]
    SqlServer,
    MySql,
    #[serde(alias = "postgres")]
    PostgreSql,
    Sqlite,
    Oracle,
    Db2,
}

impl SqlDialect {
    /// All supported dialects, in descriptor table order
    pub const ALL: [SqlDialect; 6] = [
        SqlDialect::SqlServer,
        SqlDialect::MySql,
        SqlDialect::PostgreSql,
        SqlDialect::Sqlite,
        SqlDialect::Oracle,
        SqlDialect::Db2,
    ];

    /// Get the descriptor for this dialect
    pub fn descriptor(self) -> &'static DialectDescriptor {
        &DIALECTS[self as usize]
    }

    /// Lowercase name used in configuration and diagnostics
    pub fn name(self) -> &'static str {
        match self {
            SqlDialect::SqlServer => "sqlserver",
            SqlDialect::MySql => "mysql",
            SqlDialect::PostgreSql => "postgresql",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::Oracle => "oracle",
            SqlDialect::Db2 => "db2",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(SqlDialect::SqlServer),
            "mysql" => Ok(SqlDialect::MySql),
            "postgresql" | "postgres" => Ok(SqlDialect::PostgreSql),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "oracle" => Ok(SqlDialect::Oracle),
            "db2" => Ok(SqlDialect::Db2),
            _ => Err(format!("Unsupported SQL dialect: {}", s)),
        }
    }
}

/// How bind parameters appear in the emitted SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStyle {
    /// Prefixed names, e.g. `@id` or `:id`
    Named,
    /// Anonymous `?` markers, one per occurrence
    Positional,
    /// `$1`, `$2`, ... numbered by first occurrence
    Numbered,
}

/// Capability table for one SQL dialect
#[derive(Debug)]
pub struct DialectDescriptor {
    pub dialect: SqlDialect,
    pub quote_open: char,
    pub quote_close: char,
    /// Marker used for named parameters inside resolved text
    pub parameter_prefix: char,
    pub parameter_style: ParameterStyle,
    pub bool_true: &'static str,
    pub bool_false: &'static str,
    pub current_timestamp: &'static str,
    pub concat: ConcatStrategy,
    pub pagination: PaginationStyle,
    pub upsert: UpsertStrategy,
    pub merge_source: MergeSource,
    pub returning_id: ReturningIdStrategy,
    pub group_concat: GroupConcatSyntax,
    pub length_function: &'static str,
    /// `{column}` and `{path}` slots
    pub json_path_template: &'static str,
    pub array_access: ArrayAccess,
    /// `{column}` and `{term}` slots
    pub full_text_template: &'static str,
    pub supports_right_join: bool,
    pub supports_full_join: bool,
    /// Maximum bind parameters in a single statement
    pub max_parameters: usize,
    pub types: &'static [(SemanticType, &'static str)],
}

static DIALECTS: [DialectDescriptor; 6] = [
    DialectDescriptor {
        dialect: SqlDialect::SqlServer,
        quote_open: '[',
        quote_close: ']',
        parameter_prefix: '@',
        parameter_style: ParameterStyle::Named,
        bool_true: "1",
        bool_false: "0",
        current_timestamp: "GETDATE()",
        concat: ConcatStrategy::Operator("+"),
        pagination: PaginationStyle::OffsetFetch,
        upsert: UpsertStrategy::Merge,
        merge_source: MergeSource::SelectParameters,
        returning_id: ReturningIdStrategy::OutputInserted,
        group_concat: GroupConcatSyntax::SeparatorArgument("STRING_AGG"),
        length_function: "LEN",
        json_path_template: "JSON_VALUE({column}, '{path}')",
        array_access: ArrayAccess::JsonIndex("JSON_VALUE"),
        full_text_template: "CONTAINS({column}, {term})",
        supports_right_join: true,
        supports_full_join: true,
        max_parameters: 2100,
        types: SQLSERVER_TYPES,
    },
    DialectDescriptor {
        dialect: SqlDialect::MySql,
        quote_open: '`',
        quote_close: '`',
        parameter_prefix: '@',
        parameter_style: ParameterStyle::Named,
        bool_true: "1",
        bool_false: "0",
        current_timestamp: "CURRENT_TIMESTAMP",
        concat: ConcatStrategy::Function("CONCAT"),
        pagination: PaginationStyle::LimitOffset {
            offset_requires_limit: true,
        },
        upsert: UpsertStrategy::DuplicateKeyUpdate,
        merge_source: MergeSource::NotApplicable,
        returning_id: ReturningIdStrategy::LastInsertId("SELECT LAST_INSERT_ID()"),
        group_concat: GroupConcatSyntax::SeparatorKeyword("GROUP_CONCAT"),
        length_function: "CHAR_LENGTH",
        json_path_template: "JSON_UNQUOTE(JSON_EXTRACT({column}, '{path}'))",
        array_access: ArrayAccess::JsonIndex("JSON_EXTRACT"),
        full_text_template: "MATCH({column}) AGAINST({term} IN NATURAL LANGUAGE MODE)",
        supports_right_join: true,
        supports_full_join: false,
        max_parameters: 65535,
        types: MYSQL_TYPES,
    },
    DialectDescriptor {
        dialect: SqlDialect::PostgreSql,
        quote_open: '"',
        quote_close: '"',
        parameter_prefix: '@',
        parameter_style: ParameterStyle::Named,
        bool_true: "true",
        bool_false: "false",
        current_timestamp: "NOW()",
        concat: ConcatStrategy::Operator("||"),
        pagination: PaginationStyle::LimitOffset {
            offset_requires_limit: false,
        },
        upsert: UpsertStrategy::OnConflictDoUpdate,
        merge_source: MergeSource::NotApplicable,
        returning_id: ReturningIdStrategy::Returning,
        group_concat: GroupConcatSyntax::SeparatorArgument("STRING_AGG"),
        length_function: "LENGTH",
        json_path_template: "jsonb_build_array(jsonb_path_query_first({column}, '{path}')) ->> 0",
        array_access: ArrayAccess::Subscript,
        full_text_template: "to_tsvector({column}) @@ plainto_tsquery({term})",
        supports_right_join: true,
        supports_full_join: true,
        max_parameters: 65535,
        types: POSTGRES_TYPES,
    },
    DialectDescriptor {
        dialect: SqlDialect::Sqlite,
        quote_open: '"',
        quote_close: '"',
        parameter_prefix: '@',
        parameter_style: ParameterStyle::Named,
        bool_true: "1",
        bool_false: "0",
        current_timestamp: "datetime('now')",
        concat: ConcatStrategy::Operator("||"),
        pagination: PaginationStyle::LimitOffset {
            offset_requires_limit: true,
        },
        upsert: UpsertStrategy::OnConflictDoUpdate,
        merge_source: MergeSource::NotApplicable,
        returning_id: ReturningIdStrategy::Returning,
        group_concat: GroupConcatSyntax::SeparatorArgument("GROUP_CONCAT"),
        length_function: "LENGTH",
        json_path_template: "json_extract({column}, '{path}')",
        array_access: ArrayAccess::JsonIndex("json_extract"),
        full_text_template: "{column} MATCH {term}",
        supports_right_join: false,
        supports_full_join: false,
        max_parameters: 32766,
        types: SQLITE_TYPES,
    },
    DialectDescriptor {
        dialect: SqlDialect::Oracle,
        quote_open: '"',
        quote_close: '"',
        parameter_prefix: ':',
        parameter_style: ParameterStyle::Named,
        bool_true: "1",
        bool_false: "0",
        current_timestamp: "SYSTIMESTAMP",
        concat: ConcatStrategy::Operator("||"),
        pagination: PaginationStyle::OffsetFetch,
        upsert: UpsertStrategy::Merge,
        merge_source: MergeSource::SelectFromDual,
        returning_id: ReturningIdStrategy::ReturningInto,
        group_concat: GroupConcatSyntax::WithinGroup("LISTAGG"),
        length_function: "LENGTH",
        json_path_template: "JSON_VALUE({column}, '{path}')",
        array_access: ArrayAccess::JsonIndex("JSON_VALUE"),
        full_text_template: "CONTAINS({column}, {term}) > 0",
        supports_right_join: true,
        supports_full_join: true,
        max_parameters: 65535,
        types: ORACLE_TYPES,
    },
    DialectDescriptor {
        dialect: SqlDialect::Db2,
        quote_open: '"',
        quote_close: '"',
        parameter_prefix: '@',
        parameter_style: ParameterStyle::Named,
        bool_true: "true",
        bool_false: "false",
        current_timestamp: "CURRENT TIMESTAMP",
        concat: ConcatStrategy::Operator("||"),
        pagination: PaginationStyle::OffsetFetch,
        upsert: UpsertStrategy::Merge,
        merge_source: MergeSource::ValuesRow,
        returning_id: ReturningIdStrategy::FinalTable,
        group_concat: GroupConcatSyntax::SeparatorArgument("LISTAGG"),
        length_function: "LENGTH",
        json_path_template: "JSON_VALUE({column}, '{path}')",
        array_access: ArrayAccess::JsonIndex("JSON_VALUE"),
        full_text_template: "CONTAINS({column}, {term}) = 1",
        supports_right_join: true,
        supports_full_join: true,
        max_parameters: 32767,
        types: DB2_TYPES,
    },
];

impl DialectDescriptor {
    /// Quote a single identifier. Embedded closing quotes are doubled, so
    /// distinct identifiers always quote to distinct strings.
    pub fn quote(&self, identifier: &str) -> String {
        if identifier.is_empty() {
            return String::new();
        }

        let close = self.quote_close.to_string();
        let escaped = identifier.replace(&close, &format!("{}{}", close, close));
        format!("{}{}{}", self.quote_open, escaped, self.quote_close)
    }

    /// Quote a column name
    pub fn wrap_column(&self, column: &str) -> String {
        self.quote(column)
    }

    /// Quote each segment of a dotted name, e.g. `dbo.users` -> `[dbo].[users]`
    pub fn quote_qualified(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render a named parameter marker for this dialect
    pub fn parameter(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix, name)
    }

    /// Boolean literal for this dialect
    pub fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            self.bool_true
        } else {
            self.bool_false
        }
    }

    /// Concatenate SQL expressions using this dialect's strategy
    pub fn concat(&self, parts: &[&str]) -> String {
        self.concat.render(parts)
    }

    /// Whether the join type has a native keyword in this dialect
    pub fn supports_join(&self, join: JoinKind) -> bool {
        match join {
            JoinKind::Right => self.supports_right_join,
            JoinKind::Full => self.supports_full_join,
            JoinKind::Inner | JoinKind::Left | JoinKind::Cross => true,
        }
    }

    /// Native column type for a semantic type
    pub fn native_type(&self, semantic: SemanticType) -> &'static str {
        self.types
            .iter()
            .find(|(ty, _)| *ty == semantic)
            .map(|(_, native)| *native)
            .unwrap_or(semantic.fallback_native_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table_is_indexed_by_dialect() {
        for dialect in SqlDialect::ALL {
            assert_eq!(dialect.descriptor().dialect, dialect);
        }
    }

    #[test]
    fn test_quote_wraps_with_dialect_pair() {
        for dialect in SqlDialect::ALL {
            let d = dialect.descriptor();
            let quoted = d.quote("user_name");
            assert!(quoted.starts_with(d.quote_open));
            assert!(quoted.ends_with(d.quote_close));
            assert!(quoted.contains("user_name"));
        }
        assert_eq!(SqlDialect::SqlServer.descriptor().quote("id"), "[id]");
        assert_eq!(SqlDialect::MySql.descriptor().quote("id"), "`id`");
        assert_eq!(SqlDialect::PostgreSql.descriptor().quote("id"), "\"id\"");
    }

    #[test]
    fn test_quote_empty_is_empty() {
        for dialect in SqlDialect::ALL {
            assert_eq!(dialect.descriptor().quote(""), "");
        }
    }

    #[test]
    fn test_quote_escapes_closing_quote() {
        assert_eq!(SqlDialect::SqlServer.descriptor().quote("a]b"), "[a]]b]");
        assert_eq!(SqlDialect::PostgreSql.descriptor().quote("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_wrap_column_is_injective() {
        let names = ["a", "b", "a_b", "ab", "a]", "a]]", "A"];
        for dialect in SqlDialect::ALL {
            let d = dialect.descriptor();
            let wrapped: std::collections::BTreeSet<String> =
                names.iter().map(|n| d.wrap_column(n)).collect();
            assert_eq!(wrapped.len(), names.len(), "collision for {}", dialect);
        }
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(
            SqlDialect::SqlServer.descriptor().quote_qualified("dbo.users"),
            "[dbo].[users]"
        );
        assert_eq!(
            SqlDialect::PostgreSql.descriptor().quote_qualified("users"),
            "\"users\""
        );
    }

    #[test]
    fn test_bool_literals() {
        for dialect in [SqlDialect::SqlServer, SqlDialect::MySql, SqlDialect::Sqlite, SqlDialect::Oracle] {
            let d = dialect.descriptor();
            assert_eq!(d.bool_literal(true), "1");
            assert_eq!(d.bool_literal(false), "0");
        }
        for dialect in [SqlDialect::PostgreSql, SqlDialect::Db2] {
            let d = dialect.descriptor();
            assert_eq!(d.bool_literal(true), "true");
            assert_eq!(d.bool_literal(false), "false");
        }
    }

    #[test]
    fn test_parameter_prefix() {
        assert_eq!(SqlDialect::SqlServer.descriptor().parameter("id"), "@id");
        assert_eq!(SqlDialect::Oracle.descriptor().parameter("id"), ":id");
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("postgres".parse::<SqlDialect>().unwrap(), SqlDialect::PostgreSql);
        assert_eq!("MSSQL".parse::<SqlDialect>().unwrap(), SqlDialect::SqlServer);
        assert!("access".parse::<SqlDialect>().is_err());
    }

    #[test]
    fn test_join_support() {
        assert!(!SqlDialect::MySql.descriptor().supports_join(JoinKind::Full));
        assert!(SqlDialect::MySql.descriptor().supports_join(JoinKind::Right));
        assert!(!SqlDialect::Sqlite.descriptor().supports_join(JoinKind::Right));
        assert!(SqlDialect::PostgreSql.descriptor().supports_join(JoinKind::Full));
    }
}
