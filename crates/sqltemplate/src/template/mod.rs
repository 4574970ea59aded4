//! Template tokenizing, resolution and parameter binding

pub mod args;
pub mod binding;
pub mod engine;
pub mod kind;
pub mod resolvers;
pub mod tokenizer;

pub use args::PlaceholderArgs;
pub use binding::{bind_parameters, BoundSql};
pub use engine::{CompiledSql, ProcessingResult, TemplateContext, TemplateEngine};
pub use kind::{AggregateFunction, PlaceholderKind, ScalarFunction};
pub use resolvers::{resolve, ResolveContext, Resolved};
pub use tokenizer::Placeholder;
