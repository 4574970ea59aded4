//! Semantic types and their native column types per dialect

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database-agnostic field/parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Boolean,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Text,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Binary,
    Json,
}

impl SemanticType {
    /// ANSI-ish type used when a dialect table has no entry
    pub fn fallback_native_type(self) -> &'static str {
        match self {
            SemanticType::Boolean => "BOOLEAN",
            SemanticType::Int16 => "SMALLINT",
            SemanticType::Int32 => "INTEGER",
            SemanticType::Int64 => "BIGINT",
            SemanticType::Float32 => "REAL",
            SemanticType::Float64 => "DOUBLE PRECISION",
            SemanticType::Decimal => "DECIMAL(18,2)",
            SemanticType::String => "VARCHAR(255)",
            SemanticType::Text => "TEXT",
            SemanticType::Uuid => "CHAR(36)",
            SemanticType::Date => "DATE",
            SemanticType::Time => "TIME",
            SemanticType::DateTime => "TIMESTAMP",
            SemanticType::DateTimeOffset => "TIMESTAMP WITH TIME ZONE",
            SemanticType::Binary => "BLOB",
            SemanticType::Json => "TEXT",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Boolean => "boolean",
            SemanticType::Int16 => "int16",
            SemanticType::Int32 => "int32",
            SemanticType::Int64 => "int64",
            SemanticType::Float32 => "float32",
            SemanticType::Float64 => "float64",
            SemanticType::Decimal => "decimal",
            SemanticType::String => "string",
            SemanticType::Text => "text",
            SemanticType::Uuid => "uuid",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::DateTime => "date_time",
            SemanticType::DateTimeOffset => "date_time_offset",
            SemanticType::Binary => "binary",
            SemanticType::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(SemanticType::Boolean),
            "int16" | "i16" | "short" | "smallint" => Ok(SemanticType::Int16),
            "int32" | "i32" | "int" | "integer" => Ok(SemanticType::Int32),
            "int64" | "i64" | "long" | "bigint" => Ok(SemanticType::Int64),
            "float32" | "f32" | "float" | "real" => Ok(SemanticType::Float32),
            "float64" | "f64" | "double" => Ok(SemanticType::Float64),
            "decimal" | "numeric" | "money" => Ok(SemanticType::Decimal),
            "string" | "varchar" => Ok(SemanticType::String),
            "text" | "clob" => Ok(SemanticType::Text),
            "uuid" | "guid" => Ok(SemanticType::Uuid),
            "date" => Ok(SemanticType::Date),
            "time" => Ok(SemanticType::Time),
            "datetime" | "date_time" | "timestamp" => Ok(SemanticType::DateTime),
            "datetimeoffset" | "date_time_offset" | "timestamptz" => {
                Ok(SemanticType::DateTimeOffset)
            }
            "binary" | "bytes" | "blob" => Ok(SemanticType::Binary),
            "json" => Ok(SemanticType::Json),
            _ => Err(format!("unknown semantic type '{}'", s)),
        }
    }
}

type TypeTable = &'static [(SemanticType, &'static str)];

pub(crate) const SQLSERVER_TYPES: TypeTable = &[
    (SemanticType::Boolean, "BIT"),
    (SemanticType::Int16, "SMALLINT"),
    (SemanticType::Int32, "INT"),
    (SemanticType::Int64, "BIGINT"),
    (SemanticType::Float32, "REAL"),
    (SemanticType::Float64, "FLOAT"),
    (SemanticType::Decimal, "DECIMAL(18,2)"),
    (SemanticType::String, "NVARCHAR(255)"),
    (SemanticType::Text, "NVARCHAR(MAX)"),
    (SemanticType::Uuid, "UNIQUEIDENTIFIER"),
    (SemanticType::Date, "DATE"),
    (SemanticType::Time, "TIME"),
    (SemanticType::DateTime, "DATETIME2"),
    (SemanticType::DateTimeOffset, "DATETIMEOFFSET"),
    (SemanticType::Binary, "VARBINARY(MAX)"),
    (SemanticType::Json, "NVARCHAR(MAX)"),
];

pub(crate) const MYSQL_TYPES: TypeTable = &[
    (SemanticType::Boolean, "TINYINT(1)"),
    (SemanticType::Int16, "SMALLINT"),
    (SemanticType::Int32, "INT"),
    (SemanticType::Int64, "BIGINT"),
    (SemanticType::Float32, "FLOAT"),
    (SemanticType::Float64, "DOUBLE"),
    (SemanticType::Decimal, "DECIMAL(18,2)"),
    (SemanticType::String, "VARCHAR(255)"),
    (SemanticType::Text, "TEXT"),
    (SemanticType::Uuid, "CHAR(36)"),
    (SemanticType::Date, "DATE"),
    (SemanticType::Time, "TIME"),
    (SemanticType::DateTime, "DATETIME"),
    (SemanticType::DateTimeOffset, "TIMESTAMP"),
    (SemanticType::Binary, "BLOB"),
    (SemanticType::Json, "JSON"),
];

pub(crate) const POSTGRES_TYPES: TypeTable = &[
    (SemanticType::Boolean, "BOOLEAN"),
    (SemanticType::Int16, "SMALLINT"),
    (SemanticType::Int32, "INTEGER"),
    (SemanticType::Int64, "BIGINT"),
    (SemanticType::Float32, "REAL"),
    (SemanticType::Float64, "DOUBLE PRECISION"),
    (SemanticType::Decimal, "NUMERIC(18,2)"),
    (SemanticType::String, "VARCHAR(255)"),
    (SemanticType::Text, "TEXT"),
    (SemanticType::Uuid, "UUID"),
    (SemanticType::Date, "DATE"),
    (SemanticType::Time, "TIME"),
    (SemanticType::DateTime, "TIMESTAMP"),
    (SemanticType::DateTimeOffset, "TIMESTAMPTZ"),
    (SemanticType::Binary, "BYTEA"),
    (SemanticType::Json, "JSONB"),
];

pub(crate) const SQLITE_TYPES: TypeTable = &[
    (SemanticType::Boolean, "INTEGER"),
    (SemanticType::Int16, "INTEGER"),
    (SemanticType::Int32, "INTEGER"),
    (SemanticType::Int64, "INTEGER"),
    (SemanticType::Float32, "REAL"),
    (SemanticType::Float64, "REAL"),
    (SemanticType::Decimal, "NUMERIC"),
    (SemanticType::String, "TEXT"),
    (SemanticType::Text, "TEXT"),
    (SemanticType::Uuid, "TEXT"),
    (SemanticType::Date, "TEXT"),
    (SemanticType::Time, "TEXT"),
    (SemanticType::DateTime, "TEXT"),
    (SemanticType::DateTimeOffset, "TEXT"),
    (SemanticType::Binary, "BLOB"),
    (SemanticType::Json, "TEXT"),
];

pub(crate) const ORACLE_TYPES: TypeTable = &[
    (SemanticType::Boolean, "NUMBER(1)"),
    (SemanticType::Int16, "NUMBER(5)"),
    (SemanticType::Int32, "NUMBER(10)"),
    (SemanticType::Int64, "NUMBER(19)"),
    (SemanticType::Float32, "BINARY_FLOAT"),
    (SemanticType::Float64, "BINARY_DOUBLE"),
    (SemanticType::Decimal, "NUMBER(18,2)"),
    (SemanticType::String, "NVARCHAR2(255)"),
    (SemanticType::Text, "NCLOB"),
    (SemanticType::Uuid, "RAW(16)"),
    (SemanticType::Date, "DATE"),
    (SemanticType::Time, "INTERVAL DAY TO SECOND"),
    (SemanticType::DateTime, "TIMESTAMP"),
    (SemanticType::DateTimeOffset, "TIMESTAMP WITH TIME ZONE"),
    (SemanticType::Binary, "BLOB"),
    (SemanticType::Json, "CLOB"),
];

pub(crate) const DB2_TYPES: TypeTable = &[
    (SemanticType::Boolean, "BOOLEAN"),
    (SemanticType::Int16, "SMALLINT"),
    (SemanticType::Int32, "INTEGER"),
    (SemanticType::Int64, "BIGINT"),
    (SemanticType::Float32, "REAL"),
    (SemanticType::Float64, "DOUBLE"),
    (SemanticType::Decimal, "DECIMAL(18,2)"),
    (SemanticType::String, "VARCHAR(255)"),
    (SemanticType::Text, "CLOB"),
    (SemanticType::Uuid, "CHAR(16) FOR BIT DATA"),
    (SemanticType::Date, "DATE"),
    (SemanticType::Time, "TIME"),
    (SemanticType::DateTime, "TIMESTAMP"),
    (SemanticType::DateTimeOffset, "TIMESTAMP"),
    (SemanticType::Binary, "BLOB"),
    (SemanticType::Json, "CLOB"),
];
