//! File-system application of rewrite results.
//!
//! Every edit-based application funnels through one primitive: splice each
//! action's `[start, end)` range into the original text in descending offset
//! order, then replace the file in a single atomic write. File-level actions
//! (`add_file`, `remove_file`) bypass the splice and operate on the file as a
//! whole. All validation happens before the first byte is written, so a
//! rejected result leaves the disk exactly as it was.

use crate::action::{validate_actions, Action, ActionKind, MalformedAction};
use crate::paths::{self, PathError};
use crate::result::RewriteResult;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Concrete file-system effect produced by applying a result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the effect reports which file was touched and how"]
pub enum AppliedEffect {
    /// File rewritten with its edits spliced in.
    Wrote { path: PathBuf },
    /// File created (or overwritten) whole.
    Created { path: PathBuf },
    /// File deleted.
    Removed { path: PathBuf },
}

impl AppliedEffect {
    pub fn path(&self) -> &Path {
        match self {
            AppliedEffect::Wrote { path }
            | AppliedEffect::Created { path }
            | AppliedEffect::Removed { path } => path,
        }
    }
}

impl fmt::Display for AppliedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedEffect::Wrote { path } => write!(f, "wrote {}", path.display()),
            AppliedEffect::Created { path } => write!(f, "created {}", path.display()),
            AppliedEffect::Removed { path } => write!(f, "removed {}", path.display()),
        }
    }
}

/// Outcome of applying a single action, with the data the review bookkeeping
/// needs afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the effect carries the offset delta needed to fix up pending actions"]
pub enum ActionEffect {
    /// A file-level action ran; the owning result is fully consumed.
    File(AppliedEffect),
    /// One edit (or one group) was spliced into the on-disk content.
    Spliced {
        path: PathBuf,
        /// Net length change of the whole splice.
        delta: isize,
        /// The file's new content, for refreshing a cached source.
        new_source: String,
    },
}

/// Failure while applying a result or action to the file system.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The result points at a file that no longer exists on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Edit-based result without its original source attached.
    #[error("result for {file_path} has no file source; hydrate it before applying")]
    MissingSource { file_path: String },

    /// Result without a workspace root attached.
    #[error("result for {file_path} has no root path; hydrate it before applying")]
    MissingRoot { file_path: String },

    #[error("result for {file_path} has no action {index} ({count} actions)")]
    NoSuchAction {
        file_path: String,
        index: usize,
        count: usize,
    },

    #[error(transparent)]
    Malformed(#[from] MalformedAction),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Splice a list of `edit` and `group` actions into `source`, returning the
/// new text.
///
/// Offsets all address the *original* `source`; applying in descending start
/// order keeps every pending offset valid while earlier (lower) ranges are
/// still untouched. The input list may arrive in any order. Insertions at the
/// same point come out in list order, and an insertion at the boundary of a
/// replacement lands before the replacement text.
///
/// An empty list returns the source unchanged.
pub fn splice_actions(source: &str, actions: &[Action]) -> Result<String, MalformedAction> {
    let mut edits = flatten_edits(actions)?;

    for edit in &edits {
        if edit.end > source.len() {
            return Err(MalformedAction::OutOfBounds {
                start: edit.start,
                end: edit.end,
                source_len: source.len(),
            });
        }
        for offset in [edit.start, edit.end] {
            if !source.is_char_boundary(offset) {
                return Err(MalformedAction::NotCharBoundary { offset });
            }
        }
    }

    // Reverse-then-stable-sort: descending by (start, end), with fully tied
    // ranges kept in reverse list order so same-point insertions end up in
    // list order in the output.
    edits.reverse();
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    for pair in edits.windows(2) {
        let (later, earlier) = (&pair[0], &pair[1]);
        if earlier.end > later.start {
            return Err(MalformedAction::Overlap {
                a_start: earlier.start,
                a_end: earlier.end,
                b_start: later.start,
                b_end: later.end,
            });
        }
    }

    let mut output = source.to_string();
    for edit in &edits {
        output.replace_range(edit.start..edit.end, edit.text);
    }
    Ok(output)
}

/// Apply one whole result to the file system.
///
/// A sole `add_file` or `remove_file` action operates on the file itself.
/// Anything else splices the result's actions into the hydrated `file_source`
/// and atomically replaces the target, which must still exist.
pub fn apply_result(result: &RewriteResult) -> Result<AppliedEffect, ApplyError> {
    validate_actions(&result.actions)?;
    let target = resolve_target(result)?;
    tracing::debug!(
        path = %target.display(),
        actions = result.actions.len(),
        "applying result"
    );

    match result.actions.as_slice() {
        [action] if action.kind == ActionKind::AddFile => {
            write_new_file(&target, new_code_of(action)?)
        }
        [action] if action.kind == ActionKind::RemoveFile => remove_target(&target),
        _ => {
            let source =
                result
                    .file_source
                    .as_deref()
                    .ok_or_else(|| ApplyError::MissingSource {
                        file_path: result.file_path.clone(),
                    })?;
            let new_source = splice_actions(source, &result.actions)?;
            if !target.exists() {
                return Err(ApplyError::FileNotFound { path: target });
            }
            atomic_write(&target, new_source.as_bytes())?;
            Ok(AppliedEffect::Wrote { path: target })
        }
    }
}

/// Apply a single action of a result to the file system.
///
/// Unlike [`apply_result`] this reads the file's *current* content from disk,
/// so a sequence of single-action applications composes: each splice runs
/// against the text the previous one wrote. The caller is expected to shift
/// the result's remaining offsets afterwards (see
/// [`RewriteResult::shift_offsets_after`]).
pub fn apply_action(
    result: &RewriteResult,
    action_index: usize,
) -> Result<ActionEffect, ApplyError> {
    validate_actions(&result.actions)?;
    let Some(action) = result.actions.get(action_index) else {
        return Err(ApplyError::NoSuchAction {
            file_path: result.file_path.clone(),
            index: action_index,
            count: result.actions.len(),
        });
    };
    let target = resolve_target(result)?;
    tracing::debug!(
        path = %target.display(),
        action = action_index,
        kind = %action.kind,
        "applying single action"
    );

    match action.kind {
        ActionKind::AddFile => Ok(ActionEffect::File(write_new_file(
            &target,
            new_code_of(action)?,
        )?)),
        ActionKind::RemoveFile => Ok(ActionEffect::File(remove_target(&target)?)),
        ActionKind::Edit | ActionKind::Group => {
            let current = read_target(&target)?;
            let new_source = splice_actions(&current, std::slice::from_ref(action))?;
            let delta = action.offset_delta();
            atomic_write(&target, new_source.as_bytes())?;
            Ok(ActionEffect::Spliced {
                path: target,
                delta,
                new_source,
            })
        }
    }
}

struct FlatEdit<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn flatten_edits(actions: &[Action]) -> Result<Vec<FlatEdit<'_>>, MalformedAction> {
    let mut edits = Vec::with_capacity(actions.len());
    for action in actions {
        if action.kind.is_file_level() {
            return Err(MalformedAction::FileActionInEdits { kind: action.kind });
        }
        action.validate_shape()?;
        for leaf in action.leaf_edits() {
            edits.push(flat_edit(leaf)?);
        }
    }
    Ok(edits)
}

fn flat_edit(action: &Action) -> Result<FlatEdit<'_>, MalformedAction> {
    let text = action
        .new_code
        .as_deref()
        .ok_or(MalformedAction::MissingNewCode { kind: action.kind })?;
    Ok(FlatEdit {
        start: action.start,
        end: action.end,
        text,
    })
}

fn resolve_target(result: &RewriteResult) -> Result<PathBuf, ApplyError> {
    let root = result
        .root_path
        .as_deref()
        .ok_or_else(|| ApplyError::MissingRoot {
            file_path: result.file_path.clone(),
        })?;
    Ok(paths::resolve(root, &result.file_path)?)
}

fn new_code_of(action: &Action) -> Result<&str, ApplyError> {
    action
        .new_code
        .as_deref()
        .ok_or_else(|| MalformedAction::MissingNewCode { kind: action.kind }.into())
}

fn read_target(path: &Path) -> Result<String, ApplyError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ApplyError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ApplyError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_new_file(path: &Path, content: &str) -> Result<AppliedEffect, ApplyError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ApplyError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    atomic_write(path, content.as_bytes())?;
    Ok(AppliedEffect::Created {
        path: path.to_path_buf(),
    })
}

fn remove_target(path: &Path) -> Result<AppliedEffect, ApplyError> {
    fs::remove_file(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ApplyError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ApplyError::Remove {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(AppliedEffect::Removed {
        path: path.to_path_buf(),
    })
}

/// Write via a temp file in the same directory, then rename over the target.
/// Readers see either the old content or the new, never a half-written file.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), ApplyError> {
    let write_err = |source: io::Error| ApplyError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
