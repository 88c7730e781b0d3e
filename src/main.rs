// src/main.rs
// =============================================================================
// This is the entry point of the relay-walker CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging to stderr
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = clean walk, 1 = some node queries failed,
//    2 = error before or outside the walk, 130 = Ctrl-C pressed twice)
//
// Rust concepts used:
// - async/await: Node queries go over the network, tokio drives them
// - Result<T, E> with anyhow: Any error bubbles up with ? and gets context
// - Closures: The visitor passed to walk_schema borrows our stats mutably
// - Arc<AtomicBool>: A flag shared between the Ctrl-C task and the visitor
// =============================================================================

// Module declarations - the binary's own files; everything else lives in the
// relay_walker library
mod cli;           // src/cli.rs - command-line parsing
mod report;        // src/report.rs - walk statistics and output

use cli::{Cli, Commands, QueryArgs, WalkArgs};
use clap::Parser;  // Parser trait enables the parse() method

// anyhow::Result lets us return any error type with the ? operator;
// Context adds a "while doing X" line on top of it
use anyhow::{anyhow, Context, Result};

use relay_walker::query::QueryBuilder;
use relay_walker::schema::Schema;
use relay_walker::transport::{fetch_schema, HttpExecutor, HttpOptions};
use relay_walker::walk::walk_schema;
use report::WalkStats;
use serde_json::Map;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Used when --from is not given
const VIEWER_ID_QUERY: &str = "query { viewer { id } }";

// 128 + SIGINT, what shells report for a process killed by Ctrl-C
const INTERRUPTED_EXIT_CODE: i32 = 130;

// The #[tokio::main] attribute creates a tokio runtime and runs our async
// main inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run our application logic and capture the exit code
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for the query or the report.
// RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,relay_walker={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = every node query succeeded (or the query was printed)
//   Ok(1) = some node queries failed
//   Err = anything that stopped us before or outside the walk
async fn run(cli: Cli) -> Result<i32> {
    // Each branch handles a different subcommand (query, walk)
    match cli.command {
        Commands::Query { schema, query, no_aliases } => handle_query(&schema, &query, no_aliases),
        Commands::Walk(args) => handle_walk(&args).await,
    }
}

// Handles the 'query' subcommand: prints the synthesized query
fn handle_query(schema_path: &Path, args: &QueryArgs, no_aliases: bool) -> Result<i32> {
    let schema = load_schema_file(schema_path)?;
    let (mut document, text) = QueryBuilder::build(&schema, &args.build_options())?;

    // The query is the only thing on stdout, so it can be piped elsewhere
    if no_aliases {
        document.strip_aliases();
        println!("{}", document.to_query_string());
    } else {
        println!("{}", text);
    }
    Ok(0)
}

// Handles the 'walk' subcommand
// Status lines go to stderr; stdout only gets the final report
async fn handle_walk(args: &WalkArgs) -> Result<i32> {
    let executor = HttpExecutor::new(
        &args.endpoint,
        HttpOptions {
            token: args.token.clone(),
            timeout: Duration::from_secs(args.timeout),
            ..HttpOptions::default()
        },
    )?;

    // A schema file skips the introspection round trip
    let schema = match &args.schema {
        Some(path) => load_schema_file(path)?,
        None => {
            eprintln!("🔍 Loading schema from {}", args.endpoint);
            fetch_schema(&executor)
                .await
                .with_context(|| format!("could not introspect {}", args.endpoint))?
        }
    };

    let start = match &args.from {
        Some(gid) => gid.clone(),
        None => viewer_id(&executor).await?,
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&interrupted));

    eprintln!("🌐 Walking {} from {}", args.endpoint, start);
    let progress_every = args.progress_every;
    let mut stats = WalkStats::default();

    // The visitor: called once per node, in visiting order
    let summary = walk_schema(
        &schema,
        &start,
        &executor,
        &args.query.build_options(),
        &args.walk_options(),
        |frame| {
            for message in stats.record(frame) {
                eprintln!("❌ {}: {}", frame.gid(), message);
            }

            if progress_every > 0 && stats.total % progress_every == 0 {
                match serde_json::to_string(&stats.depth) {
                    Ok(depths) => eprintln!(
                        "📊 Visited {} ({} failed), by depth: {}",
                        stats.total, stats.failed, depths
                    ),
                    Err(e) => warn!(error = %e, "could not print progress"),
                }
            }

            // Break stops the walk after this node; the report still prints
            if interrupted.load(Ordering::SeqCst) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
    )
    .await?;

    info!(visited = summary.visited, "walk done");
    stats.summary = Some(summary);
    report::print_report(&stats, args.json)?;

    Ok(stats.exit_code())
}

// First Ctrl-C: finish the current node, then report. Second: exit now
fn spawn_interrupt_handler(interrupted: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if second_interrupt(&interrupted) {
                eprintln!("\n⛔ Interrupted again, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            eprintln!("\n⏸️  Stopping after the current node (Ctrl-C again to quit now)");
        }
    });
}

// Raises the flag. Returns true if it was already raised
fn second_interrupt(interrupted: &AtomicBool) -> bool {
    interrupted.swap(true, Ordering::SeqCst)
}

fn load_schema_file(path: &Path) -> Result<Schema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read schema file {}", path.display()))?;
    Schema::from_introspection_json(&text)
        .with_context(|| format!("could not load schema from {}", path.display()))
}

// Asks the endpoint who we are, for walks without --from
async fn viewer_id(executor: &HttpExecutor) -> Result<String> {
    let response = executor
        .execute_text(VIEWER_ID_QUERY, &Map::new())
        .await
        .context("could not query viewer")?;

    // pointer() walks a JSON path; any missing step gives None
    response
        .data_value()
        .pointer("/viewer/id")
        .and_then(|id| id.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("endpoint returned no viewer id; pass --from <GID>"))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does the visitor return ControlFlow?
//    - ControlFlow::Continue(()) means "keep walking"
//    - ControlFlow::Break(()) means "stop after this node"
//    - It's the std type for "carry on or stop early", used by try_for_each too
//
// 2. What is AtomicBool and why is it in an Arc?
//    - The Ctrl-C handler runs as its own tokio task
//    - Both the task and the visitor need the same flag, so it's shared with Arc
//    - AtomicBool can be changed through a shared reference without a Mutex
//    - swap() sets the new value and hands back the old one in one step,
//      which is how we tell the first Ctrl-C from the second
//
// 3. Why eprintln! for status lines?
//    - stdout carries the report (or the query), often piped to a file or jq
//    - stderr carries everything meant for the human watching
//
// 4. Why does main() call std::process::exit?
//    - The exit code tells scripts how the walk went (0, 1, 2 or 130)
//    - exit() ends the process right away, so it's the last thing we do
// -----------------------------------------------------------------------------
