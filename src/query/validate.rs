// src/query/validate.rs
// =============================================================================
// Checks query text against a schema with apollo-compiler.
//
// How it works:
// 1. Print our Schema as SDL and load it into apollo-compiler
// 2. Parse the printed query text and run the full GraphQL validation rules
//    on it: field existence, argument and variable types, leaf/composite
//    selections, fragment applicability, field merging across fragments
//
// The schema SDL is taken as valid without running schema validation: a
// schema loaded from introspection came from a working server, and the
// model doesn't carry everything (directives, input fields) schema
// validation would want.
// =============================================================================

use super::ast::Document;
use crate::error::ValidationError;
use crate::schema::Schema;
use apollo_compiler::validation::Valid;
use apollo_compiler::ExecutableDocument;

impl Document {
    /// Prints this document and validates the text against `schema`.
    pub fn validate(&self, schema: &Schema) -> Result<(), ValidationError> {
        validate_query_text(schema, &self.to_query_string())
    }
}

/// Parses `text` and validates it against `schema`.
pub fn validate_query_text(schema: &Schema, text: &str) -> Result<(), ValidationError> {
    let compiled = compile_schema(schema)?;
    ExecutableDocument::parse_and_validate(&compiled, text, "query.graphql")
        .map(|_| ())
        .map_err(|invalid| ValidationError::Document(invalid.errors.to_string()))
}

fn compile_schema(schema: &Schema) -> Result<Valid<apollo_compiler::Schema>, ValidationError> {
    let parsed = apollo_compiler::Schema::parse(schema.to_sdl(), "schema.graphql")
        .map_err(|invalid| ValidationError::Schema(invalid.errors.to_string()))?;
    Ok(Valid::assume_valid(parsed))
}
