//! Dialect descriptor properties across every supported database

use std::collections::HashSet;

use elif_sqltemplate::dialect::{PaginationStyle, UpsertStrategy};
use elif_sqltemplate::{
    EntityDescriptor, FieldDescriptor, MethodDescriptor, SemanticType, SqlDialect,
    TemplateContext, TemplateEngine,
};

#[test]
fn quoting_wraps_identifiers_unchanged() {
    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        for identifier in ["users", "created_at", "Order Lines", "x1"] {
            let quoted = d.quote(identifier);
            assert!(quoted.starts_with(d.quote_open), "{} {}", dialect, quoted);
            assert!(quoted.ends_with(d.quote_close), "{} {}", dialect, quoted);
            assert_eq!(&quoted[1..quoted.len() - 1], identifier);
        }
        assert_eq!(d.quote(""), "");
    }
}

#[test]
fn wrap_column_is_injective() {
    let identifiers = ["a", "b", "a]", "a\"", "a`", "ab", "a b", "A"];
    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        let wrapped: HashSet<String> = identifiers.iter().map(|i| d.wrap_column(i)).collect();
        assert_eq!(wrapped.len(), identifiers.len(), "{}", dialect);
    }
}

#[test]
fn pagination_templates_and_order_by_requirements() {
    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        let clause = d.paginate(Some("@limit"), Some("@offset")).unwrap();
        match d.pagination {
            PaginationStyle::LimitOffset { .. } => {
                assert_eq!(clause, "LIMIT @limit OFFSET @offset");
                assert!(!d.requires_order_by());
            }
            PaginationStyle::OffsetFetch => {
                assert_eq!(clause, "OFFSET @offset ROWS FETCH NEXT @limit ROWS ONLY");
                assert!(d.requires_order_by());
            }
        }
    }
}

#[test]
fn boolean_literals() {
    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        let pair = (d.bool_literal(true), d.bool_literal(false));
        match dialect {
            SqlDialect::PostgreSql | SqlDialect::Db2 => assert_eq!(pair, ("true", "false")),
            _ => assert_eq!(pair, ("1", "0")),
        }
    }
}

#[test]
fn semantic_types_have_native_names_everywhere() {
    let all = [
        SemanticType::Boolean,
        SemanticType::Int16,
        SemanticType::Int32,
        SemanticType::Int64,
        SemanticType::Float32,
        SemanticType::Float64,
        SemanticType::Decimal,
        SemanticType::String,
        SemanticType::Text,
        SemanticType::Uuid,
        SemanticType::Date,
        SemanticType::Time,
        SemanticType::DateTime,
        SemanticType::DateTimeOffset,
        SemanticType::Binary,
        SemanticType::Json,
    ];

    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        for ty in all {
            assert!(!d.native_type(ty).is_empty(), "{} {}", dialect, ty);
        }
    }

    assert_eq!(SqlDialect::PostgreSql.descriptor().native_type(SemanticType::Uuid), "UUID");
    assert_eq!(SqlDialect::SqlServer.descriptor().native_type(SemanticType::Boolean), "BIT");
}

#[test]
fn dialect_names_parse_back() {
    for dialect in SqlDialect::ALL {
        assert_eq!(dialect.to_string().parse::<SqlDialect>().unwrap(), dialect);
    }
    assert_eq!("postgres".parse::<SqlDialect>().unwrap(), SqlDialect::PostgreSql);
    assert_eq!("mssql".parse::<SqlDialect>().unwrap(), SqlDialect::SqlServer);
    assert!("access".parse::<SqlDialect>().is_err());
}

#[test]
fn literal_placeholders_swap_per_dialect() {
    let entity = EntityDescriptor::new("Flag")
        .with_field(FieldDescriptor::new("Id", SemanticType::Int32).primary_key());
    let method = MethodDescriptor::new("Touch");
    let engine = TemplateEngine::default();

    for dialect in SqlDialect::ALL {
        let d = dialect.descriptor();
        let ctx = TemplateContext::new(&entity, &method, "flags", dialect);
        let result = engine.process(
            "UPDATE {{table}} SET enabled = {{bool_true}}, seen_at = {{current_timestamp}}",
            &ctx,
        );
        assert_eq!(
            result.processed_sql,
            format!(
                "UPDATE flags SET enabled = {}, seen_at = {}",
                d.bool_true, d.current_timestamp
            )
        );
    }
}

#[test]
fn upsert_follows_strategy_tag() {
    let entity = EntityDescriptor::new("Setting")
        .with_field(FieldDescriptor::new("Key", SemanticType::String).primary_key())
        .with_field(FieldDescriptor::new("Value", SemanticType::Text));
    let method = MethodDescriptor::new("Save");
    let engine = TemplateEngine::default();

    for dialect in SqlDialect::ALL {
        let ctx = TemplateContext::new(&entity, &method, "settings", dialect);
        let sql = engine.process("{{upsert}}", &ctx).processed_sql;
        let expected_marker = match dialect.descriptor().upsert {
            UpsertStrategy::DuplicateKeyUpdate => "ON DUPLICATE KEY UPDATE value = VALUES(value)",
            UpsertStrategy::OnConflictDoUpdate => "ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            UpsertStrategy::Merge => "WHEN MATCHED THEN UPDATE SET value = source.value",
        };
        assert!(sql.contains(expected_marker), "{}: {}", dialect, sql);
        assert!(!sql.contains("SET key"), "{}", sql);
        assert!(!sql.contains(", key ="), "{}", sql);
        assert!(!sql.contains("UPDATE key ="), "{}", sql);
    }
}
