//! Dialect pagination clauses

use super::DialectDescriptor;
use crate::error::{TemplateError, TemplateResult};

/// Pagination grammar family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `LIMIT n OFFSET m`; some grammars reject OFFSET without LIMIT
    LimitOffset { offset_requires_limit: bool },
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

impl DialectDescriptor {
    /// Pagination template with `{limit}` and `{offset}` slots
    pub fn pagination_template(&self) -> &'static str {
        match self.pagination {
            PaginationStyle::LimitOffset { .. } => "LIMIT {limit} OFFSET {offset}",
            PaginationStyle::OffsetFetch => "OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY",
        }
    }

    /// Whether this dialect's pagination grammar needs an ORDER BY clause
    pub fn requires_order_by(&self) -> bool {
        matches!(self.pagination, PaginationStyle::OffsetFetch)
    }

    /// Build a pagination clause from limit/offset expressions.
    ///
    /// Fails when only an offset is given and the grammar requires LIMIT
    /// first, or when neither is given.
    pub fn paginate(&self, limit: Option<&str>, offset: Option<&str>) -> TemplateResult<String> {
        match (self.pagination, limit, offset) {
            (_, None, None) => Err(TemplateError::Pagination {
                dialect: self.dialect,
                message: "pagination needs a limit or an offset".to_string(),
            }),
            (PaginationStyle::LimitOffset { .. }, Some(limit), Some(offset)) => Ok(self
                .pagination_template()
                .replace("{limit}", limit)
                .replace("{offset}", offset)),
            (PaginationStyle::LimitOffset { .. }, Some(limit), None) => {
                Ok(format!("LIMIT {}", limit))
            }
            (PaginationStyle::LimitOffset { offset_requires_limit: true }, None, Some(_)) => {
                Err(TemplateError::Pagination {
                    dialect: self.dialect,
                    message: "OFFSET is only valid after LIMIT".to_string(),
                })
            }
            (PaginationStyle::LimitOffset { offset_requires_limit: false }, None, Some(offset)) => {
                Ok(format!("OFFSET {}", offset))
            }
            (PaginationStyle::OffsetFetch, Some(limit), offset) => Ok(self
                .pagination_template()
                .replace("{limit}", limit)
                .replace("{offset}", offset.unwrap_or("0"))),
            (PaginationStyle::OffsetFetch, None, Some(offset)) => {
                Ok(format!("OFFSET {} ROWS", offset))
            }
        }
    }

    /// FETCH clause to follow an OFFSET clause emitted separately
    pub fn fetch_clause(&self, limit: &str) -> Option<String> {
        match self.pagination {
            PaginationStyle::OffsetFetch => Some(format!("FETCH NEXT {} ROWS ONLY", limit)),
            PaginationStyle::LimitOffset { .. } => None,
        }
    }
}
