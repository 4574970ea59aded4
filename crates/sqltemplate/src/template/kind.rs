//! Placeholder kinds

use std::fmt;
use std::str::FromStr;

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFunction {
    pub fn sql_name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Min => "MIN",
        }
    }
}

/// Scalar functions with a uniform or per-dialect name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFunction {
    Round,
    Upper,
    Lower,
    Length,
    Abs,
}

/// Every placeholder kind the engine understands.
///
/// Resolution dispatches with one exhaustive `match` over this enum, so a
/// new kind cannot be added without a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Table,
    Columns,
    Values,
    Set,
    Where,
    OrderBy,
    Limit,
    Offset,
    Paginate,
    GroupBy,
    Having,
    Join,
    Between,
    In,
    NotIn,
    Like,
    BoolTrue,
    BoolFalse,
    CurrentTimestamp,
    Aggregate(AggregateFunction),
    Coalesce,
    GroupConcat,
    Scalar(ScalarFunction),
    Cast,
    JsonPath,
    ArrayAccess,
    FullText,
    BatchInsert,
    Upsert,
    InsertReturning,
}

impl FromStr for PlaceholderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "table" => PlaceholderKind::Table,
            "columns" => PlaceholderKind::Columns,
            "values" => PlaceholderKind::Values,
            "set" => PlaceholderKind::Set,
            "where" => PlaceholderKind::Where,
            "orderby" | "order_by" => PlaceholderKind::OrderBy,
            "limit" => PlaceholderKind::Limit,
            "offset" => PlaceholderKind::Offset,
            "paginate" | "page" => PlaceholderKind::Paginate,
            "groupby" | "group_by" => PlaceholderKind::GroupBy,
            "having" => PlaceholderKind::Having,
            "join" => PlaceholderKind::Join,
            "between" => PlaceholderKind::Between,
            "in" => PlaceholderKind::In,
            "not_in" | "notin" => PlaceholderKind::NotIn,
            "like" => PlaceholderKind::Like,
            "bool_true" | "true" => PlaceholderKind::BoolTrue,
            "bool_false" | "false" => PlaceholderKind::BoolFalse,
            "current_timestamp" | "now" => PlaceholderKind::CurrentTimestamp,
            "count" => PlaceholderKind::Aggregate(AggregateFunction::Count),
            "sum" => PlaceholderKind::Aggregate(AggregateFunction::Sum),
            "avg" => PlaceholderKind::Aggregate(AggregateFunction::Avg),
            "max" => PlaceholderKind::Aggregate(AggregateFunction::Max),
            "min" => PlaceholderKind::Aggregate(AggregateFunction::Min),
            "coalesce" => PlaceholderKind::Coalesce,
            "group_concat" | "string_agg" => PlaceholderKind::GroupConcat,
            "round" => PlaceholderKind::Scalar(ScalarFunction::Round),
            "upper" => PlaceholderKind::Scalar(ScalarFunction::Upper),
            "lower" => PlaceholderKind::Scalar(ScalarFunction::Lower),
            "length" | "len" => PlaceholderKind::Scalar(ScalarFunction::Length),
            "abs" => PlaceholderKind::Scalar(ScalarFunction::Abs),
            "cast" => PlaceholderKind::Cast,
            "json" | "json_path" => PlaceholderKind::JsonPath,
            "array" | "array_access" => PlaceholderKind::ArrayAccess,
            "fulltext" | "full_text" | "search" => PlaceholderKind::FullText,
            "batch_insert" | "batch_values" => PlaceholderKind::BatchInsert,
            "upsert" => PlaceholderKind::Upsert,
            "insert_returning" | "insert_returning_id" => PlaceholderKind::InsertReturning,
            _ => return Err(()),
        };
        Ok(kind)
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaceholderKind::Table => "table",
            PlaceholderKind::Columns => "columns",
            PlaceholderKind::Values => "values",
            PlaceholderKind::Set => "set",
            PlaceholderKind::Where => "where",
            PlaceholderKind::OrderBy => "orderby",
            PlaceholderKind::Limit => "limit",
            PlaceholderKind::Offset => "offset",
            PlaceholderKind::Paginate => "paginate",
            PlaceholderKind::GroupBy => "groupby",
            PlaceholderKind::Having => "having",
            PlaceholderKind::Join => "join",
            PlaceholderKind::Between => "between",
            PlaceholderKind::In => "in",
            PlaceholderKind::NotIn => "not_in",
            PlaceholderKind::Like => "like",
            PlaceholderKind::BoolTrue => "bool_true",
            PlaceholderKind::BoolFalse => "bool_false",
            PlaceholderKind::CurrentTimestamp => "current_timestamp",
            PlaceholderKind::Aggregate(AggregateFunction::Count) => "count",
            PlaceholderKind::Aggregate(AggregateFunction::Sum) => "sum",
            PlaceholderKind::Aggregate(AggregateFunction::Avg) => "avg",
            PlaceholderKind::Aggregate(AggregateFunction::Max) => "max",
            PlaceholderKind::Aggregate(AggregateFunction::Min) => "min",
            PlaceholderKind::Coalesce => "coalesce",
            PlaceholderKind::GroupConcat => "group_concat",
            PlaceholderKind::Scalar(ScalarFunction::Round) => "round",
            PlaceholderKind::Scalar(ScalarFunction::Upper) => "upper",
            PlaceholderKind::Scalar(ScalarFunction::Lower) => "lower",
            PlaceholderKind::Scalar(ScalarFunction::Length) => "length",
            PlaceholderKind::Scalar(ScalarFunction::Abs) => "abs",
            PlaceholderKind::Cast => "cast",
            PlaceholderKind::JsonPath => "json",
            PlaceholderKind::ArrayAccess => "array",
            PlaceholderKind::FullText => "fulltext",
            PlaceholderKind::BatchInsert => "batch_insert",
            PlaceholderKind::Upsert => "upsert",
            PlaceholderKind::InsertReturning => "insert_returning",
        };
        f.write_str(name)
    }
}
