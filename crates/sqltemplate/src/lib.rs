//! # elif-sqltemplate: Dialect-aware SQL templates
//!
//! Compiles SQL templates containing `{{...}}` placeholders into
//! dialect-specific SQL at build time. Placeholders are resolved against an
//! entity descriptor (ordered fields), a method descriptor (parameters), a
//! table name and one of six SQL dialects.
//!
//! ```text
//! SELECT {{columns --exclude PasswordHash}} FROM {{table}} {{where:id}}
//!   -> SELECT id, name, email FROM users WHERE [id] = @id        (SqlServer)
//!   -> SELECT id, name, email FROM users WHERE "id" = @id        (PostgreSql)
//! ```
//!
//! Nested placeholders resolve innermost first in a bounded loop. Every
//! argument emitted as raw SQL text passes the injection validator in
//! [`security`]; resolver problems are collected into the
//! [`ProcessingResult`] instead of panicking.

pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod naming;
pub mod security;
pub mod template;

pub use config::{ConfigError, EngineConfig};
pub use descriptor::{EntityDescriptor, FieldDescriptor, MethodDescriptor, ParameterDescriptor};
pub use dialect::{DialectDescriptor, ParameterStyle, SemanticType, SqlDialect};
pub use error::{ErrorCategory, TemplateError, TemplateResult, TemplateWarning};
pub use security::FragmentKind;
pub use template::{CompiledSql, ProcessingResult, TemplateContext, TemplateEngine};
