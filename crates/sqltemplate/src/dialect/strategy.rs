//! Dialect strategy tags
//!
//! Small enums describing *how* a dialect spells a construct. Resolvers match
//! on these tags instead of on dialect names.

use std::fmt;
use std::str::FromStr;

/// String concatenation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStrategy {
    /// `CONCAT(a, b, c)`
    Function(&'static str),
    /// `a || b || c`, `a + b + c`
    Operator(&'static str),
}

impl ConcatStrategy {
    /// Render the concatenation of `parts`
    pub fn render(&self, parts: &[&str]) -> String {
        match self {
            ConcatStrategy::Function(name) => format!("{}({})", name, parts.join(", ")),
            ConcatStrategy::Operator(op) => parts.join(&format!(" {} ", op)),
        }
    }
}

/// Insert-or-update statement family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStrategy {
    /// `INSERT ... ON DUPLICATE KEY UPDATE`
    DuplicateKeyUpdate,
    /// `INSERT ... ON CONFLICT (...) DO UPDATE SET`
    OnConflictDoUpdate,
    /// `MERGE INTO ... USING ...`
    Merge,
}

/// Shape of the source row of a MERGE statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    /// `USING (SELECT @a AS a, ...) AS source`
    SelectParameters,
    /// `USING (SELECT :a AS a, ... FROM DUAL) source`
    SelectFromDual,
    /// `USING (VALUES (@a, ...)) AS source (a, ...)`
    ValuesRow,
    /// Dialect does not use MERGE for upserts
    NotApplicable,
}

/// How an INSERT reports the generated key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningIdStrategy {
    /// `INSERT ... RETURNING id`
    Returning,
    /// `INSERT INTO t (...) OUTPUT INSERTED.id VALUES (...)`
    OutputInserted,
    /// `INSERT ...; SELECT LAST_INSERT_ID()`
    LastInsertId(&'static str),
    /// `INSERT ... RETURNING id INTO :id`
    ReturningInto,
    /// `SELECT id FROM FINAL TABLE (INSERT ...)`
    FinalTable,
}

/// String aggregation syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupConcatSyntax {
    /// `FN(col, ',')`
    SeparatorArgument(&'static str),
    /// `FN(col SEPARATOR ',')`
    SeparatorKeyword(&'static str),
    /// `FN(col, ',') WITHIN GROUP (ORDER BY col)`
    WithinGroup(&'static str),
}

impl GroupConcatSyntax {
    /// Render the aggregation of `column` joined by the `separator` literal
    pub fn render(&self, column: &str, separator: &str) -> String {
        match self {
            GroupConcatSyntax::SeparatorArgument(name) => {
                format!("{}({}, {})", name, column, separator)
            }
            GroupConcatSyntax::SeparatorKeyword(name) => {
                format!("{}({} SEPARATOR {})", name, column, separator)
            }
            GroupConcatSyntax::WithinGroup(name) => format!(
                "{}({}, {}) WITHIN GROUP (ORDER BY {})",
                name, column, separator, column
            ),
        }
    }
}

/// Array element access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayAccess {
    /// Native `col[index]`
    Subscript,
    /// Arrays stored as JSON, read through `FN(col, '$[index]')`
    JsonIndex(&'static str),
}

/// Join types understood by the `join` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    /// SQL keyword for this join
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "full" | "outer" => Ok(JoinKind::Full),
            "cross" => Ok(JoinKind::Cross),
            _ => Err(format!("unknown join type '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_function() {
        let concat = ConcatStrategy::Function("CONCAT");
        assert_eq!(concat.render(&["'%'", "@name", "'%'"]), "CONCAT('%', @name, '%')");
    }

    #[test]
    fn test_concat_operator() {
        let concat = ConcatStrategy::Operator("||");
        assert_eq!(concat.render(&["'%'", "@name"]), "'%' || @name");
    }

    #[test]
    fn test_group_concat_syntax() {
        assert_eq!(
            GroupConcatSyntax::SeparatorKeyword("GROUP_CONCAT").render("name", "','"),
            "GROUP_CONCAT(name SEPARATOR ',')"
        );
        assert_eq!(
            GroupConcatSyntax::SeparatorArgument("STRING_AGG").render("name", "','"),
            "STRING_AGG(name, ',')"
        );
        assert_eq!(
            GroupConcatSyntax::WithinGroup("LISTAGG").render("name", "','"),
            "LISTAGG(name, ',') WITHIN GROUP (ORDER BY name)"
        );
    }

    #[test]
    fn test_join_kind_parsing() {
        assert_eq!("LEFT".parse::<JoinKind>().unwrap(), JoinKind::Left);
        assert_eq!("outer".parse::<JoinKind>().unwrap(), JoinKind::Full);
        assert!("sideways".parse::<JoinKind>().is_err());
    }
}
