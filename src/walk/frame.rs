// src/walk/frame.rs
// =============================================================================
// A Frame is the record of one step of the walk: which node was visited, how
// we got there, and what the node query returned.
//
// The parent link is discovery provenance only. The live graph can have
// cycles and many paths to a node, but a frame only remembers the first path
// that reached it; the queue's seen-set is what stops cycles.
//
// Finding the next nodes is purely structural: any object in the result with
// an "id" key is a node. Field names and aliases don't matter, which is why
// the query builder is free to alias every field at random.
// =============================================================================

use super::queue::TraversalQueue;
use crate::execute::Response;
use crate::error::ExecuteError;
use crate::schema::ID_FIELD;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A globally unique node identifier.
pub type Gid = String;

/// Caller-facing scratch space attached to a frame.
///
/// The walker fills `response` (or `failure` when the executor itself
/// failed); `extras` belongs to the visitor.
#[derive(Debug, Default)]
pub struct FrameContext {
    pub response: Option<Response>,
    pub failure: Option<ExecuteError>,
    pub extras: Map<String, Value>,
}

impl FrameContext {
    /// Did the node query fail, either in transport or at the GraphQL level?
    pub fn is_failure(&self) -> bool {
        match (&self.failure, &self.response) {
            (Some(_), _) => true,
            (None, Some(response)) => !response.is_ok(),
            (None, None) => false,
        }
    }

    /// Every error message for this frame: the transport failure, or the
    /// response's error messages, plus a note when there was no data.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(failure) = &self.failure {
            messages.push(failure.to_string());
        }
        if let Some(response) = &self.response {
            messages.extend(response.errors().iter().map(|e| e.message.clone()));
            if !response.has_data() && response.errors().is_empty() {
                messages.push("response has no data".to_string());
            }
        }
        messages
    }
}

/// One visited (or about to be visited) node.
#[derive(Debug)]
pub struct Frame {
    gid: Gid,
    parent: Option<Arc<Frame>>,
    result: Value,
    context: FrameContext,
}

impl Frame {
    pub fn new(gid: impl Into<Gid>, parent: Option<Arc<Frame>>) -> Self {
        Self {
            gid: gid.into(),
            parent,
            result: Value::Object(Map::new()),
            context: FrameContext::default(),
        }
    }

    pub fn gid(&self) -> &str {
        &self.gid
    }

    /// The frame this node was first discovered from. `None` for the start node.
    pub fn parent(&self) -> Option<&Arc<Frame>> {
        self.parent.as_ref()
    }

    /// The node query's data payload, or an empty object if it had none.
    pub fn result(&self) -> &Value {
        &self.result
    }

    pub(crate) fn set_result(&mut self, result: Value) {
        self.result = result;
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut FrameContext {
        &mut self.context
    }

    /// Number of frames on the discovery path, counting this one. The start
    /// node has depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent.as_deref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.as_deref();
        }
        depth
    }

    /// GIDs from the start node down to this one.
    pub fn path(&self) -> Vec<&str> {
        let mut path = vec![self.gid.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(frame) = current {
            path.push(frame.gid.as_str());
            current = frame.parent.as_deref();
        }
        path.reverse();
        path
    }

    /// GIDs found anywhere in this frame's result.
    pub fn discovered_gids(&self) -> Vec<Gid> {
        discovered_gids(&self.result)
    }

    /// A fresh frame for `gid`, discovered from this one.
    pub fn child(self: &Arc<Self>, gid: impl Into<Gid>) -> Frame {
        Frame::new(gid, Some(Arc::clone(self)))
    }

    /// Offers a child frame for every GID in the result. Duplicates and
    /// overflow are expected and silently dropped.
    ///
    /// Returns how many children the queue accepted.
    pub fn enqueue_discovered(self: &Arc<Self>, queue: &mut TraversalQueue) -> usize {
        self.discovered_gids()
            .into_iter()
            .filter(|gid| queue.offer(self.child(gid.clone())))
            .count()
    }
}

/// Depth-first scan of a nested value for node identifiers.
///
/// - object: its "id" value(s) first, then every value recursively
/// - array: every element recursively
/// - anything else: nothing
///
/// Results are in encounter order and may repeat; deduplication is the
/// queue's job.
pub fn discovered_gids(value: &Value) -> Vec<Gid> {
    let mut gids = Vec::new();
    collect_gids(value, &mut gids);
    gids
}

fn collect_gids(value: &Value, gids: &mut Vec<Gid>) {
    match value {
        Value::Object(map) => {
            match map.get(ID_FIELD) {
                Some(Value::Array(ids)) => gids.extend(ids.iter().filter_map(gid_from_scalar)),
                Some(id) => gids.extend(gid_from_scalar(id)),
                None => {}
            }
            for child in map.values() {
                collect_gids(child, gids);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_gids(item, gids);
            }
        }
        _ => {}
    }
}

// Identifiers are opaque strings. Numbers and booleans are coerced to their
// text form; null and nested structures are not identifiers
fn gid_from_scalar(value: &Value) -> Option<Gid> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::ResponseError;
    use serde_json::json;

    #[test]
    fn test_discovered_gids_depth_first() {
        let result = json!({
            "id": "A",
            "child": { "id": "B" },
            "list": [{ "id": "C" }, { "id": "D" }]
        });
        assert_eq!(discovered_gids(&result), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_discovered_gids_through_aliases_and_connections() {
        let result = json!({
            "node": {
                "id": "R1",
                "hxzqoplmnbvc": { "id": "U1" },
                "tyrewqasdfgh": { "edges": [
                    { "node": { "id": "R2" } },
                    { "node": null },
                    { "node": { "id": "R1" } }
                ]}
            }
        });
        // duplicates are kept, the queue drops them
        assert_eq!(discovered_gids(&result), vec!["R1", "U1", "R2", "R1"]);
    }

    #[test]
    fn test_discovered_gids_coerces_scalars() {
        let result = json!({
            "a": { "id": 42 },
            "b": { "id": ["x", 7, null, { "id": "nested" }] },
            "c": { "id": null },
            "d": "id"
        });
        assert_eq!(discovered_gids(&result), vec!["42", "x", "7", "nested"]);
    }

    #[test]
    fn test_scalars_and_empty_values_yield_nothing() {
        assert!(discovered_gids(&json!("id")).is_empty());
        assert!(discovered_gids(&json!(null)).is_empty());
        assert!(discovered_gids(&json!({})).is_empty());
        assert!(discovered_gids(&json!([])).is_empty());
    }

    #[test]
    fn test_child_links_parent_and_tracks_depth() {
        let root = Arc::new(Frame::new("root", None));
        let child = Arc::new(root.child("child"));
        let grandchild = child.child("grandchild");

        assert_eq!(grandchild.parent().unwrap().gid(), "child");
        assert_eq!(root.depth(), 1);
        assert_eq!(grandchild.depth(), 3);
        assert_eq!(grandchild.path(), vec!["root", "child", "grandchild"]);
        assert_eq!(grandchild.result(), &json!({}));
    }

    #[test]
    fn test_enqueue_discovered_offers_each_new_gid() {
        let mut queue = TraversalQueue::new();
        assert!(queue.offer_gid("A", None));

        let mut frame = queue.pop_front().unwrap();
        frame.set_result(json!({ "node": { "id": "A", "x": { "id": "B" }, "y": [{ "id": "C" }, { "id": "B" }] } }));
        let frame = Arc::new(frame);

        assert_eq!(frame.enqueue_discovered(&mut queue), 2);
        let queued: Vec<_> = queue.drain().map(|f| f.gid().to_string()).collect();
        assert_eq!(queued, vec!["B", "C"]);
    }

    #[test]
    fn test_context_failure_reporting() {
        let mut context = FrameContext::default();
        assert!(!context.is_failure());

        context.response = Some(Response {
            data: Some(json!({ "node": null })),
            errors: vec![ResponseError::new("NOT_FOUND")],
        });
        assert!(context.is_failure());
        assert_eq!(context.error_messages(), vec!["NOT_FOUND"]);

        context.response = Some(Response::default());
        assert_eq!(context.error_messages(), vec!["response has no data"]);

        context.response = None;
        context.failure = Some(ExecuteError::Timeout);
        assert!(context.is_failure());
        assert_eq!(context.error_messages(), vec!["request timed out"]);
    }
}
