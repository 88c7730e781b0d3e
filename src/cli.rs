// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - query: print the walker query synthesized from a schema file
// - walk: walk a live endpoint from a start node and report what was visited
//
// Options that shape the query (--first, --only, --except, --seed) are shared
// by both subcommands through QueryArgs.
// =============================================================================

use clap::{ArgAction, Args, Parser, Subcommand};
use relay_walker::query::{BuildOptions, TypeFilter, DEFAULT_FIRST};
use relay_walker::walk::WalkOptions;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "relay-walker",
    version,
    about = "Walk a Relay-style GraphQL API breadth-first, one node query per node",
    long_about = "relay-walker builds a single generic `node(id: $id)` query from a GraphQL schema \
                  that selects every reachable node id, then runs it node by node to visit \
                  everything reachable from a start node."
)]
pub struct Cli {
    /// More logging on stderr (-v info, -vv debug). RUST_LOG overrides this
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the walker query for a schema
    ///
    /// Example: relay-walker query --schema schema.json --only User --only Repository
    Query {
        /// Introspection result (JSON) to build the query from
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,

        #[command(flatten)]
        query: QueryArgs,

        /// Print field names without their random aliases
        #[arg(long)]
        no_aliases: bool,
    },

    /// Walk an endpoint starting from one node
    ///
    /// Example: relay-walker walk https://api.github.com/graphql --from MDQ6VXNlcjE= --max-visits 500
    Walk(WalkArgs),
}

/// Options that shape the synthesized query.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Page size requested from every connection
    #[arg(long, default_value_t = DEFAULT_FIRST)]
    pub first: i64,

    /// Only walk into nodes of this type (repeatable)
    #[arg(long = "only", value_name = "TYPE", conflicts_with = "except")]
    pub only: Vec<String>,

    /// Never walk into nodes of this type (repeatable)
    #[arg(long = "except", value_name = "TYPE")]
    pub except: Vec<String>,

    /// Seed for field aliases and random queue insertion
    #[arg(long)]
    pub seed: Option<u64>,
}

impl QueryArgs {
    pub fn build_options(&self) -> BuildOptions {
        let mut options = BuildOptions::default().with_connection_argument("first", self.first);
        if !self.only.is_empty() {
            options = options.with_type_filter(TypeFilter::only(self.only.clone()));
        } else if !self.except.is_empty() {
            options = options.with_type_filter(TypeFilter::except(self.except.clone()));
        }
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        options
    }
}

#[derive(Args, Debug, Clone)]
pub struct WalkArgs {
    /// GraphQL endpoint URL (e.g., https://api.github.com/graphql)
    pub endpoint: String,

    /// GID to start from. Defaults to the id of `viewer`
    #[arg(long = "from", value_name = "GID")]
    pub from: Option<String>,

    /// Introspection result (JSON) to use instead of introspecting the endpoint
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Bearer token for the endpoint
    #[arg(long, env = "GRAPHQL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Cap on the number of nodes waiting to be visited (at least 1)
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub max_queue_size: Option<usize>,

    /// Insert discovered nodes at random queue positions instead of the end
    #[arg(long)]
    pub random: bool,

    /// Stop after visiting this many nodes
    #[arg(long, value_name = "N")]
    pub max_visits: Option<usize>,

    /// Node queries in flight at once
    #[arg(long, default_value_t = 1, value_parser = parse_positive)]
    pub concurrency: usize,

    /// Extra query variable, NAME=VALUE (repeatable). VALUE is parsed as
    /// JSON when it is valid JSON, otherwise taken as a string
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print progress to stderr every N visited nodes (0 = never)
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub progress_every: usize,

    /// Output the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl WalkArgs {
    pub fn walk_options(&self) -> WalkOptions {
        let mut options = WalkOptions::default().with_concurrency(self.concurrency);
        if let Some(max) = self.max_queue_size {
            options = options.with_max_queue_size(max);
        }
        if let Some(max) = self.max_visits {
            options = options.with_max_visits(max);
        }
        if self.random {
            options = options.with_random_insertion(self.query.seed);
        }
        for (name, value) in &self.vars {
            options = options.with_variable(name.clone(), value.clone());
        }
        options
    }
}

// Parses NAME=VALUE. `--var first=10` gives the number 10,
// `--var login=octocat` the string "octocat"
fn parse_var(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("variable name is empty in `{}`", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

// A count that must be at least 1. A zero queue size would reject even the
// start node
fn parse_positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
