// src/error.rs
// =============================================================================
// Error types for the library side of relay-walker.
//
// There are three families, and they are treated very differently:
// - SchemaError: the schema can't be walked at all. Raised while building
//   the query, before any traversal starts.
// - ExecuteError: one node query failed. Never aborts a walk; the failure is
//   parked on the frame so the visitor can look at it.
// - ValidationError: a query doesn't parse or doesn't fit a schema.
// - TransportError: the HTTP endpoint can't be set up or introspected.
//
// The binary wraps all of these in anyhow::Error.
// =============================================================================

use thiserror::Error;

/// Problems with the schema that make query synthesis impossible.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema has no `Node` interface, so there is nothing to walk.
    #[error("schema has no `{0}` interface")]
    MissingNodeInterface(String),

    /// A type claims to implement `Node` but has no `id` field.
    #[error("node type `{0}` has no `id` field")]
    MissingIdField(String),

    /// The query root has no `node(id:)` field to start from.
    #[error("query type `{0}` has no `node` field")]
    MissingNodeField(String),

    /// The schema has no query type at all.
    #[error("schema has no query type `{0}`")]
    MissingQueryType(String),

    /// Introspection JSON could not be decoded.
    #[error("invalid introspection result: {0}")]
    Introspection(#[from] serde_json::Error),

    /// Introspection JSON decoded, but didn't contain a `__schema` object.
    #[error("introspection result has no `__schema` object")]
    MissingSchemaObject,

    /// A type reference had a wrapper kind with no inner type, or no name.
    #[error("malformed type reference in introspection result: {0}")]
    MalformedTypeRef(String),
}

/// Why a single node query produced no usable response.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The request didn't complete in time.
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the endpoint at all.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with a non-success status and no GraphQL body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body wasn't a GraphQL response.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Anything else the transport reported.
    #[error("{0}")]
    Other(String),
}

/// A query that doesn't validate against a schema.
///
/// Both variants carry the validator's rendered diagnostics, one per line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The schema's SDL could not be read back by the validator.
    #[error("schema could not be loaded for validation:\n{0}")]
    Schema(String),

    /// The query text doesn't parse, or breaks a validation rule.
    #[error("query does not validate against the schema:\n{0}")]
    Document(String),
}

/// Setting up the HTTP transport, or fetching a schema through it, failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("endpoint must be http or https, got `{0}`")]
    UnsupportedScheme(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("introspection request failed: {0}")]
    Execute(#[from] ExecuteError),

    #[error("introspection query returned errors: {0}")]
    Introspection(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
