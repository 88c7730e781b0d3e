// src/lib.rs
// =============================================================================
// relay-walker: walk a Relay-style GraphQL graph without writing a query.
//
// How it fits together:
// 1. schema: load the type system (from a file or by introspection)
// 2. query: synthesize one generic `node(id: $id)` query that selects every
//    reachable node identifier, with random aliases on everything else
// 3. walk: run that query for a start node, pull every `id` out of the
//    result, queue the new ones, repeat breadth-first
// 4. execute/transport: the seam that actually runs a query, and its HTTP
//    implementation
// =============================================================================

pub mod error;
pub mod execute;
pub mod query;
pub mod schema;
pub mod transport;
pub mod walk;

#[cfg(test)]
mod fixtures;

pub use error::{ExecuteError, SchemaError, TransportError, ValidationError};
pub use execute::{Executor, PreparedQuery, Response, ResponseError, Variables};
pub use query::{BuildOptions, Document, QueryBuilder, TypeFilter};
pub use schema::{Schema, INTROSPECTION_QUERY};
pub use transport::{fetch_schema, HttpExecutor, HttpOptions};
pub use walk::{walk, walk_schema, Frame, FrameContext, Gid, TraversalQueue, WalkOptions, WalkSummary};
