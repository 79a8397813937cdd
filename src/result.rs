use crate::action::{Action, ActionKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file's proposed actions, plus the context needed to apply or discard
/// them.
///
/// The analysis tool emits `file_path`, the advisory flags and `actions`;
/// `root_path` and `file_source` are attached locally by
/// [`hydrate`](crate::loader::hydrate) because the tool has no knowledge of
/// the collaborator's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    /// Path of the target file, relative to `root_path`.
    pub file_path: String,
    /// Absolute workspace root the file path resolves against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,
    /// File content captured when the result was produced. `None` only for
    /// results that create a brand-new file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_source: Option<String>,
    /// Advisory flag from the tool: the file had at least one match.
    #[serde(default = "default_true")]
    pub affected: bool,
    /// Advisory flag from the tool: matches overlapped each other.
    #[serde(default)]
    pub conflicted: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_true() -> bool {
    true
}

impl RewriteResult {
    pub fn new(file_path: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            file_path: file_path.into(),
            root_path: None,
            file_source: None,
            affected: true,
            conflicted: false,
            actions,
        }
    }

    /// Number of top-level pending actions. A group counts as one.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// The file-level kind this result carries, if it is a sole-action
    /// `add_file` or `remove_file` result.
    pub fn sole_file_action(&self) -> Option<ActionKind> {
        match self.actions.as_slice() {
            [action] if action.kind.is_file_level() => Some(action.kind),
            _ => None,
        }
    }

    /// Shift every pending action that starts at or after `from` by `delta`.
    pub fn shift_offsets_from(&mut self, from: usize, delta: isize) {
        for action in &mut self.actions {
            action.shift_from(from, delta);
        }
    }

    /// Shift the pending actions to follow `applied` having been spliced on
    /// its own, so the survivors keep pointing at the text they were produced
    /// against.
    ///
    /// Each leaf edit of the applied action moves later offsets
    /// independently. Leaves are processed in descending end order, so an
    /// action sitting in the gap between a group's children picks up exactly
    /// the deltas of the leaves before it and none of the leaves after it.
    pub fn shift_offsets_after(&mut self, applied: &Action) {
        let mut leaves: Vec<&Action> = applied.leaf_edits().iter().collect();
        leaves.sort_by(|a, b| b.end.cmp(&a.end));
        for leaf in leaves {
            self.shift_offsets_from(leaf.end, leaf.offset_delta());
        }
    }
}
