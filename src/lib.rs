//! Resplice: apply code-rewrite results from an external analysis tool.
//!
//! A search-and-rewrite engine runs elsewhere and emits, per matched file, a
//! list of proposed *actions*: byte-range edits, grouped edits, whole-file
//! additions and removals, all addressed against the file's original text.
//! This crate is the application half of that pipeline. It parses the tool's
//! JSON output, hydrates each result with workspace context, splices accepted
//! edits into the target files, and keeps the bookkeeping straight while a
//! collaborator applies or discards results one by one.
//!
//! # Architecture
//!
//! All edit application compiles down to a single primitive: splice each
//! accepted `[start, end)` range into the original text in descending offset
//! order, then replace the file atomically ([`applier`]). Everything else is
//! data plumbing: the wire model ([`action`], [`result`]), the
//! parse/hydrate pipeline ([`loader`]), and the index-addressed review state
//! a host mutates as the collaborator works through results ([`manager`]).
//!
//! # Safety
//!
//! - Full validation before the first byte is written
//! - Atomic file writes (tempfile + fsync + rename)
//! - Lexical workspace-root containment for result paths
//! - Failed operations leave the result set unchanged
//!
//! # Example
//!
//! ```no_run
//! use resplice::{hydrate, results_from_str, ResultSet};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let raw = std::fs::read_to_string("results.json")?;
//!     let mut results = results_from_str(&raw)?;
//!     hydrate(&mut results, Path::new("/work/project"))?;
//!
//!     let mut set = ResultSet::new(results);
//!     let report = set.apply_all();
//!     if let Some(message) = report.error_message() {
//!         eprintln!("{message}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod applier;
pub mod loader;
pub mod manager;
pub mod paths;
pub mod position;
pub mod result;

// Re-exports
pub use action::{validate_actions, Action, ActionKind, MalformedAction};
pub use applier::{
    apply_action, apply_result, splice_actions, ActionEffect, AppliedEffect, ApplyError,
};
pub use loader::{hydrate, results_from_str, LoadError};
pub use manager::{AppliedAction, ApplyReport, RemovedAction, ResultSet, ResultSetError};
pub use paths::PathError;
pub use position::{line_of, line_span};
pub use result::RewriteResult;
