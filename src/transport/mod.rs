// src/transport/mod.rs
// =============================================================================
// This module talks to a live GraphQL endpoint over HTTP.
//
// Features:
// - HttpExecutor: the Executor the CLI walks with
// - fetch_schema: introspects the endpoint when no schema file is given
// =============================================================================

mod http;

pub use http::{fetch_schema, HttpExecutor, HttpOptions, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
