// src/walk/walker.rs
// =============================================================================
// Drives a walk: pop a frame, run the node query for it, record the result,
// let the visitor look at it, queue whatever the result points to. Repeat
// until the frontier is empty.
//
// Resilience:
// - A node query that fails (transport error, GraphQL errors, no data) never
//   stops the walk. The frame's result becomes an empty object, so it has no
//   children, and the failure stays on frame.context() for the visitor.
// - Only the visitor (by returning Break) or max_visits ends a walk early.
//
// Concurrency:
// - With concurrency = 1 (the default) there is exactly one query in flight,
//   and the visiting order is exactly the frontier order.
// - With more, up to that many queries run at once from a FuturesUnordered
//   pool. The queue and the visitor are still only touched from this task,
//   frames are just handled in the order their queries finish.
// =============================================================================

use super::frame::Frame;
use super::queue::TraversalQueue;
use crate::error::{ExecuteError, SchemaError};
use crate::execute::{Executor, PreparedQuery, Response, Variables};
use crate::query::{BuildOptions, QueryBuilder, ID_VARIABLE};
use crate::schema::Schema;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options for [`walk`].
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Caps the frontier length. Frames offered to a full frontier are dropped.
    pub max_queue_size: Option<usize>,
    /// Insert discovered frames at random positions instead of at the tail.
    pub random_insertion: bool,
    /// Seed for random insertion.
    pub seed: Option<u64>,
    /// Stop after this many frames were visited.
    pub max_visits: Option<usize>,
    /// Node queries allowed in flight at once. Values below 1 count as 1.
    pub concurrency: usize,
    /// Merged into the variables of every node query. `id` is always
    /// overwritten with the frame's GID.
    pub extra_variables: Variables,
    /// Passed unchanged to every execute call.
    pub extra_context: Value,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_queue_size: None,
            random_insertion: false,
            seed: None,
            max_visits: None,
            concurrency: 1,
            extra_variables: Map::new(),
            extra_context: Value::Object(Map::new()),
        }
    }
}

impl WalkOptions {
    pub fn with_max_queue_size(mut self, max: usize) -> Self {
        self.max_queue_size = Some(max);
        self
    }

    pub fn with_random_insertion(mut self, seed: Option<u64>) -> Self {
        self.random_insertion = true;
        self.seed = seed;
        self
    }

    pub fn with_max_visits(mut self, max: usize) -> Self {
        self.max_visits = Some(max);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_variables.insert(name.into(), value.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.extra_context = context;
        self
    }

    fn queue(&self) -> TraversalQueue {
        let queue = TraversalQueue::new()
            .with_max_size(self.max_queue_size)
            .with_random_insertion(self.random_insertion);
        match self.seed {
            Some(seed) => queue.with_seed(seed),
            None => queue,
        }
    }
}

/// What happened during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Frames handed to the visitor.
    pub visited: usize,
    /// Visited frames whose node query failed.
    pub failed: usize,
    /// Distinct GIDs ever accepted into the frontier.
    pub seen: usize,
    /// Frames left unvisited when the walk ended.
    pub pending: usize,
    /// The visitor asked to stop.
    pub cancelled: bool,
}

/// Walks the graph from `start_gid`, running `query` once per node.
///
/// `query` must declare an `$id: ID!` variable; it's set to each frame's GID.
///
/// `visit` is called once per node, after its result is recorded. It may
/// change the frame's context; returning `ControlFlow::Break(())` stops the
/// walk.
pub async fn walk<E, V>(
    start_gid: &str,
    query: &PreparedQuery,
    executor: &E,
    options: &WalkOptions,
    mut visit: V,
) -> WalkSummary
where
    E: Executor,
    V: FnMut(&mut Frame) -> ControlFlow<()>,
{
    let mut queue = options.queue();
    if !queue.offer_gid(start_gid, None) {
        warn!(
            start = start_gid,
            max_queue_size = ?options.max_queue_size,
            "start node rejected by the queue, nothing to walk"
        );
    }
    info!(start = start_gid, concurrency = options.concurrency.max(1), "starting walk");

    let concurrency = options.concurrency.max(1);
    let mut in_flight = FuturesUnordered::new();
    let mut launched = 0usize;
    let mut summary = WalkSummary::default();

    loop {
        while in_flight.len() < concurrency && options.max_visits.map_or(true, |max| launched < max) {
            let Some(frame) = queue.pop_front() else {
                break;
            };
            launched += 1;
            in_flight.push(run_node_query(executor, query, options, frame));
        }

        let Some((mut frame, outcome)) = in_flight.next().await else {
            break;
        };
        record(&mut frame, outcome);

        summary.visited += 1;
        if frame.context().is_failure() {
            summary.failed += 1;
        }

        // Visit first, then queue the children
        let flow = visit(&mut frame);

        let frame = Arc::new(frame);
        let accepted = frame.enqueue_discovered(&mut queue);
        debug!(
            gid = frame.gid(),
            depth = frame.depth(),
            accepted,
            pending = queue.len(),
            "visited node"
        );

        if flow.is_break() {
            info!(gid = frame.gid(), "walk cancelled by visitor");
            summary.cancelled = true;
            break;
        }
    }

    summary.seen = queue.seen_count();
    summary.pending = queue.len() + in_flight.len();
    info!(
        visited = summary.visited,
        failed = summary.failed,
        seen = summary.seen,
        pending = summary.pending,
        "walk finished"
    );
    summary
}

/// Builds the walker query for `schema`, then walks from `start_gid`.
///
/// Schema problems are reported before any node query runs.
pub async fn walk_schema<E, V>(
    schema: &Schema,
    start_gid: &str,
    executor: &E,
    build_options: &BuildOptions,
    options: &WalkOptions,
    visit: V,
) -> Result<WalkSummary, SchemaError>
where
    E: Executor,
    V: FnMut(&mut Frame) -> ControlFlow<()>,
{
    let (document, text) = QueryBuilder::build(schema, build_options)?;
    let query = PreparedQuery::from_parts(document, text);
    Ok(walk(start_gid, &query, executor, options, visit).await)
}

async fn run_node_query<E: Executor>(
    executor: &E,
    query: &PreparedQuery,
    options: &WalkOptions,
    frame: Frame,
) -> (Frame, Result<Response, ExecuteError>) {
    let mut variables = options.extra_variables.clone();
    variables.insert(ID_VARIABLE.to_string(), Value::String(frame.gid().to_string()));

    let outcome = executor.execute(query, &variables, &options.extra_context).await;
    (frame, outcome)
}

// Stores the outcome on the frame. Anything short of data degrades to an
// empty result
fn record(frame: &mut Frame, outcome: Result<Response, ExecuteError>) {
    match outcome {
        Ok(response) => {
            if !response.is_ok() {
                warn!(
                    gid = frame.gid(),
                    has_data = response.has_data(),
                    errors = response.errors().len(),
                    "node query returned errors"
                );
            }
            frame.set_result(response.data_value());
            frame.context_mut().response = Some(response);
        }
        Err(error) => {
            warn!(gid = frame.gid(), %error, "node query failed");
            frame.set_result(Value::Object(Map::new()));
            frame.context_mut().failure = Some(error);
        }
    }
}
