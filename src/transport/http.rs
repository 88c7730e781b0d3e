// src/transport/http.rs
// =============================================================================
// Runs GraphQL queries by POSTing them to an HTTP endpoint.
//
// Key functionality:
// - POST {"query": ..., "variables": ...} as JSON
// - Optional bearer token, request timeout, user agent
// - Any body that decodes as a GraphQL response is returned as-is, whatever
//   the status code; servers often send 4xx/5xx together with an errors list
// - Everything else is turned into an ExecuteError
//
// Failure categories:
// - Timeout: the request didn't finish within the timeout
// - Connect: DNS failure, refused connection, TLS handshake
// - Status: non-2xx answer that isn't a GraphQL response
// - Decode: 2xx answer that isn't a GraphQL response
// =============================================================================

use crate::error::{ExecuteError, TransportError};
use crate::execute::{Executor, PreparedQuery, Response, Variables};
use crate::schema::{Schema, INTROSPECTION_QUERY};
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("relay-walker/", env!("CARGO_PKG_VERSION"));

// Error bodies are cut to this many characters
const MAX_BODY_IN_ERROR: usize = 200;

/// Settings for [`HttpExecutor`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// An [`Executor`] backed by a GraphQL endpoint.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpExecutor {
    pub fn new(endpoint: &str, options: HttpOptions) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransportError::UnsupportedScheme(endpoint.scheme().to_string()));
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: options.token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs a query given as text. [`Executor::execute`] sends the prepared
    /// query's text through here.
    pub async fn execute_text(&self, query: &str, variables: &Variables) -> Result<Response, ExecuteError> {
        let body = json!({ "query": query, "variables": variables });

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(categorize_error)?;
        let status = response.status();
        let text = response.text().await.map_err(categorize_error)?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        decode_response(status, &text)
    }
}

impl Executor for HttpExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        variables: &Variables,
        _context: &Value,
    ) -> Result<Response, ExecuteError> {
        self.execute_text(query.text(), variables).await
    }
}

/// Introspects the endpoint and loads its schema.
pub async fn fetch_schema(executor: &HttpExecutor) -> Result<Schema, TransportError> {
    info!(endpoint = %executor.endpoint(), "fetching schema by introspection");

    let response = executor.execute_text(INTROSPECTION_QUERY, &Map::new()).await?;
    if !response.has_data() {
        let messages: Vec<&str> = response.errors().iter().map(|e| e.message.as_str()).collect();
        return Err(TransportError::Introspection(if messages.is_empty() {
            "no data".to_string()
        } else {
            messages.join("; ")
        }));
    }

    Ok(Schema::from_introspection_value(response.data_value())?)
}

// Turns a status and body into a Response, or explains why it isn't one
fn decode_response(status: StatusCode, body: &str) -> Result<Response, ExecuteError> {
    match serde_json::from_str::<Response>(body) {
        Ok(response) if status.is_success() || response.data.is_some() || !response.errors.is_empty() => {
            Ok(response)
        }
        Ok(_) => Err(status_error(status, body)),
        Err(_) if !status.is_success() => Err(status_error(status, body)),
        Err(e) => Err(ExecuteError::Decode(e.to_string())),
    }
}

fn status_error(status: StatusCode, body: &str) -> ExecuteError {
    let body = body.trim();
    let body = match body.char_indices().nth(MAX_BODY_IN_ERROR) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    };
    ExecuteError::Status {
        status: status.as_u16(),
        body,
    }
}

// Sorts reqwest errors into the categories the walker reports
fn categorize_error(error: reqwest::Error) -> ExecuteError {
    if error.is_timeout() {
        ExecuteError::Timeout
    } else if error.is_connect() {
        ExecuteError::Connect(error.to_string())
    } else if error.is_decode() || error.is_body() {
        ExecuteError::Decode(error.to_string())
    } else {
        ExecuteError::Other(error.to_string())
    }
}
