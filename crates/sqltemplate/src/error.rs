//! Error and warning types for template processing
//!
//! Errors are collected per placeholder rather than thrown, so a caller can
//! either surface a partially resolved template or fail the build. A few
//! error kinds are fatal and stop resolution on the spot.

use serde::Serialize;
use thiserror::Error;

use crate::dialect::SqlDialect;
use crate::security::FragmentKind;

/// Result type alias for resolver and engine operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Broad classification of a [`TemplateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Unbalanced braces, unknown placeholder kind, unresolved nesting
    MalformedTemplate,
    /// Missing, conflicting or invalid placeholder arguments
    Argument,
    /// Text rejected by the identifier/fragment validator
    Security,
}

/// Errors produced while resolving a template
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum TemplateError {
    #[error("Unbalanced placeholder braces at byte {position}")]
    UnbalancedBraces { position: usize },

    #[error("Malformed placeholder at byte {position}: {message}")]
    MalformedPlaceholder { position: usize, message: String },

    #[error("Unknown placeholder kind '{kind}'")]
    UnknownPlaceholder { kind: String },

    #[error("Placeholders still unresolved after {passes} passes")]
    IterationLimit { passes: usize },

    #[error("Missing required argument for '{placeholder}': {argument}")]
    MissingArgument { placeholder: String, argument: String },

    #[error("Conflicting options for '{placeholder}': {message}")]
    ConflictingOptions { placeholder: String, message: String },

    #[error("Invalid argument for '{placeholder}': {message}")]
    InvalidArgument { placeholder: String, message: String },

    #[error("Rejected unsafe SQL {kind} '{value}' in '{placeholder}'")]
    UnsafeFragment {
        placeholder: String,
        kind: FragmentKind,
        value: String,
    },

    #[error("Invalid pagination for {dialect}: {message}")]
    Pagination { dialect: SqlDialect, message: String },
}

impl TemplateError {
    /// Create a missing argument error
    pub fn missing_argument(placeholder: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            placeholder: placeholder.into(),
            argument: argument.into(),
        }
    }

    /// Create a conflicting options error
    pub fn conflicting_options(placeholder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConflictingOptions {
            placeholder: placeholder.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(placeholder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            placeholder: placeholder.into(),
            message: message.into(),
        }
    }

    /// Create an unsafe fragment error
    pub fn unsafe_fragment(
        placeholder: impl Into<String>,
        kind: FragmentKind,
        value: impl Into<String>,
    ) -> Self {
        Self::UnsafeFragment {
            placeholder: placeholder.into(),
            kind,
            value: value.into(),
        }
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            TemplateError::UnbalancedBraces { .. }
            | TemplateError::MalformedPlaceholder { .. }
            | TemplateError::UnknownPlaceholder { .. }
            | TemplateError::IterationLimit { .. } => ErrorCategory::MalformedTemplate,
            TemplateError::MissingArgument { .. }
            | TemplateError::ConflictingOptions { .. }
            | TemplateError::InvalidArgument { .. }
            | TemplateError::Pagination { .. } => ErrorCategory::Argument,
            TemplateError::UnsafeFragment { .. } => ErrorCategory::Security,
        }
    }

    /// Fatal errors abort resolution: they point at a template authoring
    /// bug, and no partial output is produced.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TemplateError::UnbalancedBraces { .. }
                | TemplateError::IterationLimit { .. }
                | TemplateError::Pagination { .. }
        )
    }
}

/// Non-fatal diagnostics produced while resolving a template
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum TemplateWarning {
    #[error("{dialect} has no native {construct}; emitted {fallback} instead")]
    CapabilityFallback {
        dialect: SqlDialect,
        construct: String,
        fallback: String,
    },

    #[error("{dialect} pagination expects ORDER BY before '{placeholder}'")]
    MissingOrderBy {
        dialect: SqlDialect,
        placeholder: String,
    },

    #[error("'{placeholder}' binds {count} parameters, above the {dialect} limit of {limit}")]
    ParameterLimit {
        dialect: SqlDialect,
        placeholder: String,
        count: usize,
        limit: usize,
    },

    #[error("'{placeholder}' references unknown field '{field}'")]
    UnknownField { placeholder: String, field: String },
}

impl TemplateWarning {
    /// Create a capability fallback warning
    pub fn fallback(
        dialect: SqlDialect,
        construct: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self::CapabilityFallback {
            dialect,
            construct: construct.into(),
            fallback: fallback.into(),
        }
    }
}
