//! slate - Schedule-Aware Task Tracker Library
//!
//! This library provides the core functionality for the slate CLI tool:
//! tasks, epics, and subtasks with derived epic rollups, exclusive time
//! slots, a recently-viewed history, and flat-file persistence.
//!
//! # Core Concepts
//!
//! - **Tasks**: Standalone work items with optional start time and duration
//! - **Epics**: Containers whose status and schedule derive from their subtasks
//! - **Subtasks**: Work items bound to exactly one epic
//! - **Slots**: Half-open reservation intervals; no two items may overlap
//! - **History**: Bounded, deduplicated list of recently viewed items
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `codec`: Flat-file encode/decode with replay on load
//! - `config`: Configuration loading from `.slate.toml`
//! - `error`: Error types and result aliases
//! - `history`: Viewed-history tracker
//! - `ids`: Monotonic id generator
//! - `model`: Entity records, statuses, drafts
//! - `output`: Human and JSON output envelopes
//! - `persist`: File and in-memory persistence backends
//! - `rollup`: Epic status and time-envelope aggregation
//! - `slot`: Time-slot reservation index
//! - `store`: The task store and its invariants

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod ids;
pub mod model;
pub mod output;
pub mod persist;
pub mod rollup;
pub mod slot;
pub mod store;

pub use error::{Error, Result};
