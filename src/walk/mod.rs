// src/walk/mod.rs
// =============================================================================
// This module walks a Relay graph, one node query per node.
//
// Features:
// - Breadth-first traversal from a start GID
// - Each GID is visited at most once, however many paths lead to it
// - Optional frontier cap and random insertion for huge graphs
// - A failing node query never stops the walk
// - The visitor can stop the walk at any point
//
// Submodules:
// - frame: One step of the walk and its provenance
// - queue: The frontier plus the seen-set
// - walker: The loop that ties them to an Executor
// =============================================================================

mod frame;
mod queue;
mod walker;

pub use frame::{discovered_gids, Frame, FrameContext, Gid};
pub use queue::{Drain, TraversalQueue};
pub use walker::{walk, walk_schema, WalkOptions, WalkSummary};
