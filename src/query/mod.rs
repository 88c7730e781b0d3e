// src/query/mod.rs
// =============================================================================
// Everything about the walker query itself.
//
// Submodules:
// - ast: The query tree and its printer
// - builder: Synthesizes the walker query from a schema
// - validate: Parses query text and validates it against a schema
// =============================================================================

pub mod ast;
mod builder;
mod validate;

pub use ast::{Argument, ArgumentValue, Document, Field, InlineFragment, Operation, Selection, VariableDefinition};
pub use builder::{BuildOptions, QueryBuilder, TypeFilter, ALIAS_LENGTH, DEFAULT_FIRST, ID_VARIABLE};
pub use validate::validate_query_text;
