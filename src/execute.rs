// src/execute.rs
// =============================================================================
// The seam between the walker and whatever actually runs a query.
//
// The walker never talks to the network itself. It hands the query, the
// variables and an opaque context to an Executor and gets a Response back.
// The query travels as a PreparedQuery: the document plus its printed text,
// printed once per walk rather than once per node.
// transport::HttpExecutor is the real implementation; tests plug in a map of
// canned responses instead.
// =============================================================================

use crate::error::ExecuteError;
use crate::query::Document;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Query variables, e.g. `{"id": "MDQ6VXNlcjE="}`.
pub type Variables = Map<String, Value>;

/// A query document together with the text it prints to.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    document: Document,
    text: String,
}

impl PreparedQuery {
    /// Prints `document` once and keeps both.
    pub fn new(document: Document) -> Self {
        let text = document.to_query_string();
        Self { document, text }
    }

    // `text` must be what `document` prints to
    pub(crate) fn from_parts(document: Document, text: String) -> Self {
        Self { document, text }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The query text sent over the wire.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<Document> for PreparedQuery {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}

/// Runs a query against the graph.
///
/// Implementations should report transport problems as `Err` and GraphQL
/// level problems inside the `Response`; the walker treats both the same way
/// (the node yields no children) but keeps them apart for the visitor.
#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        variables: &Variables,
        context: &Value,
    ) -> Result<Response, ExecuteError>;
}

/// A GraphQL response: optional data plus optional errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

/// One entry of a response's `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ResponseError>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ResponseError>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Response {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// True when there is a data payload that isn't `null`.
    pub fn has_data(&self) -> bool {
        matches!(&self.data, Some(data) if !data.is_null())
    }

    /// The data payload as a plain nested value; an empty object when there
    /// is none.
    pub fn data_value(&self) -> Value {
        match &self.data {
            Some(data) if !data.is_null() => data.clone(),
            _ => Value::Object(Map::new()),
        }
    }

    pub fn errors(&self) -> &[ResponseError] {
        &self.errors
    }

    /// Data and no errors.
    pub fn is_ok(&self) -> bool {
        self.has_data() && self.errors.is_empty()
    }
}

impl ResponseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::query::{BuildOptions, QueryBuilder};
    use serde_json::json;

    #[test]
    fn test_prepared_query_prints_once() {
        let document = QueryBuilder::build(&fixtures::person_schema(), &BuildOptions::default())
            .unwrap()
            .0;
        let prepared = PreparedQuery::from(document.clone());

        assert_eq!(prepared.text(), document.to_query_string());
        assert_eq!(prepared.document(), &document);
    }

    #[test]
    fn test_decodes_data_and_errors() {
        let response: Response = serde_json::from_value(json!({
            "data": { "node": { "id": "A" } },
            "errors": [{ "message": "Something went wrong", "path": ["node", "owner"] }]
        }))
        .unwrap();

        assert!(response.has_data());
        assert!(!response.is_ok());
        assert_eq!(response.errors()[0].message, "Something went wrong");
        assert_eq!(response.errors()[0].path, Some(vec![json!("node"), json!("owner")]));
    }

    #[test]
    fn test_null_data_and_null_errors() {
        let response: Response = serde_json::from_value(json!({ "data": null, "errors": null })).unwrap();
        assert!(!response.has_data());
        assert!(response.errors().is_empty());
        assert_eq!(response.data_value(), json!({}));
    }

    #[test]
    fn test_missing_fields_default() {
        let response: Response = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response, Response::default());
        assert!(!response.is_ok());
    }

    #[test]
    fn test_from_data_is_ok() {
        let response = Response::from_data(json!({ "node": null }));
        assert!(response.is_ok());
        assert_eq!(response.data_value(), json!({ "node": null }));
    }
}
