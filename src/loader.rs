//! Ingestion of analysis-tool output.
//!
//! The tool's dry run emits a JSON array of per-file results. Parsing alone is
//! not enough to act on them: the tool knows nothing about the collaborator's
//! machine, so [`hydrate`] attaches the workspace root and reads each target
//! file's current content before anything can be applied.

use crate::action::{validate_actions, ActionKind, MalformedAction};
use crate::paths::{self, PathError};
use crate::result::RewriteResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while parsing or hydrating tool output.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse analysis output: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed result for {file_path}: {source}")]
    Malformed {
        file_path: String,
        #[source]
        source: MalformedAction,
    },

    #[error("source file for {file_path} is missing: {}", path.display())]
    MissingFile { file_path: String, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Parse a batch of results from the tool's JSON output and shape-check every
/// action list.
///
/// Validation here is structural only; offsets are checked against the actual
/// source when a result is applied.
pub fn results_from_str(json: &str) -> Result<Vec<RewriteResult>, LoadError> {
    let results: Vec<RewriteResult> =
        serde_json::from_str(json).map_err(|source| LoadError::Json { source })?;
    for result in &results {
        validate_actions(&result.actions).map_err(|source| LoadError::Malformed {
            file_path: result.file_path.clone(),
            source,
        })?;
    }
    tracing::debug!(results = results.len(), "parsed analysis output");
    Ok(results)
}

/// Attach the workspace root to each result and read each target file's
/// current content into `file_source`.
///
/// A missing file is an error unless the result's sole action is `add_file`,
/// which legitimately targets a file that does not exist yet. On error,
/// results visited earlier keep their hydration; callers normally drop the
/// whole batch.
pub fn hydrate(results: &mut [RewriteResult], root: &Path) -> Result<(), LoadError> {
    for result in results.iter_mut() {
        result.root_path = Some(root.to_path_buf());
        let target = paths::resolve(root, &result.file_path)?;
        match fs::read_to_string(&target) {
            Ok(source) => result.file_source = Some(source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if result.sole_file_action() != Some(ActionKind::AddFile) {
                    return Err(LoadError::MissingFile {
                        file_path: result.file_path.clone(),
                        path: target,
                    });
                }
                result.file_source = None;
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: target,
                    source,
                })
            }
        }
    }
    Ok(())
}
