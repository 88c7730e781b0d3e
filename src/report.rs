// src/report.rs
// =============================================================================
// Collects statistics while walking and prints them at the end.
//
// What is tracked:
// - How many nodes were visited, and how many at each depth
// - Which node queries failed, with the path that led to them
//
// Output is either a table for humans or JSON for scripts, like every other
// command of the CLI.
//
// Rust concepts used:
// - BTreeMap: Keeps depths sorted, so the table and the JSON list them in order
// - #[derive(Serialize)]: The --json output is just these structs
// - &Frame: record() only borrows the frame, the walker keeps ownership
// =============================================================================

use anyhow::Result;
use relay_walker::walk::{Frame, WalkSummary};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

// Failures beyond this many are only counted
const MAX_FAILURES_KEPT: usize = 100;

#[derive(Debug, Default, Serialize)]
pub struct WalkStats {
    pub total: usize,
    pub failed: usize,
    /// Visited nodes per depth; the start node is depth 1.
    pub depth: BTreeMap<usize, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<WalkSummary>,
}

#[derive(Debug, Serialize)]
pub struct FailedNode {
    pub gid: String,
    /// GIDs from the start node down to this one.
    pub path: Vec<String>,
    pub errors: Vec<String>,
}

impl WalkStats {
    /// Counts one visited frame. Returns its distinct error messages, if any.
    pub fn record(&mut self, frame: &Frame) -> Vec<String> {
        self.total += 1;
        *self.depth.entry(frame.depth()).or_insert(0) += 1;

        if !frame.context().is_failure() {
            return Vec::new();
        }

        self.failed += 1;

        // The same message often repeats once per failed field; keep one
        let mut seen = HashSet::new();
        let errors: Vec<String> = frame
            .context()
            .error_messages()
            .into_iter()
            .filter(|message| seen.insert(message.clone()))
            .collect();

        // A walk can fail thousands of nodes; the count stays exact, the list doesn't grow
        if self.failures.len() < MAX_FAILURES_KEPT {
            self.failures.push(FailedNode {
                gid: frame.gid().to_string(),
                path: frame.path().into_iter().map(str::to_string).collect(),
                errors: errors.clone(),
            });
        }
        errors
    }

    /// 0 when every node query succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

// Prints the stats either as a table or JSON
// Parameters:
//   stats: everything collected during the walk
//   json: whether to output JSON format
pub fn print_report(stats: &WalkStats, json: bool) -> Result<()> {
    if json {
        // Serialize the stats to JSON and print
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        // Print human-readable table
        print_table(stats);
    }
    Ok(())
}

// Prints the stats as a human-readable table in the terminal
fn print_table(stats: &WalkStats) {
    // Visited nodes per depth
    println!("{:<10} {:>10}", "DEPTH", "VISITED");
    println!("{}", "=".repeat(21));
    for (depth, count) in &stats.depth {
        println!("{:<10} {:>10}", depth, count);
    }
    println!();

    // Failed nodes, if any
    if !stats.failures.is_empty() {
        println!("{:<40} {:<60}", "FAILED NODE", "ERROR");
        println!("{}", "=".repeat(101));
        for failure in &stats.failures {
            println!("{:<40} {:<60}", truncate(&failure.gid, 37), failure.errors.join("; "));
        }
        if stats.failed > stats.failures.len() {
            println!("... and {} more", stats.failed - stats.failures.len());
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   ✅ OK: {}", stats.total - stats.failed);
    println!("   ❌ Failed: {}", stats.failed);
    println!("   📋 Visited: {}", stats.total);
    if let Some(summary) = &stats.summary {
        println!("   🔍 Seen: {}", summary.seen);
        println!("   ⏳ Left in queue: {}", summary.pending);
        if summary.cancelled {
            println!("   ⏹️  Walk was cancelled");
        }
    }
}

// Cuts long GIDs so the table columns line up. Counts chars, not bytes,
// so a multi-byte character is never split
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why skip_serializing_if?
//    - Empty failure lists and a missing summary would just be noise in --json
//    - serde calls the given function and leaves the field out when it's true
//
// 2. Why .entry(...).or_insert(0)?
//    - entry() finds the slot for a key, inserting it if needed
//    - or_insert(0) gives back a &mut to the count, so += 1 works in one line
//
// 3. Why chars() instead of slicing with [..37]?
//    - String slices index bytes; cutting inside a multi-byte char panics
//    - chars() walks whole characters, so it's always safe
// -----------------------------------------------------------------------------
