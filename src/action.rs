use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of change a single action describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Replace the half-open range `[start, end)` with `new_code`.
    Edit,
    /// Container whose child edits apply together as one logical unit.
    Group,
    /// Create (or overwrite) the whole file with `new_code`.
    AddFile,
    /// Delete the whole file.
    RemoveFile,
}

impl ActionKind {
    /// File-level kinds describe the whole file rather than a byte range.
    pub fn is_file_level(self) -> bool {
        matches!(self, ActionKind::AddFile | ActionKind::RemoveFile)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Group => "group",
            ActionKind::AddFile => "add_file",
            ActionKind::RemoveFile => "remove_file",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The smallest unit of proposed change within one file.
///
/// `start` and `end` are byte offsets into the file's *original* text and must
/// lie on UTF-8 character boundaries. They are only meaningful for `edit`
/// actions; file-level actions ignore them and a `group` carries child edits
/// instead of a range of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub kind: ActionKind,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    /// Replacement text for `edit`, full file content for `add_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_code: Option<String>,
    /// Child edits, present only for `group`. Children share the offset space
    /// of their top-level siblings; a group is not a nested scope.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Action>,
}

/// Validation failure detected before any splice or write is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedAction {
    #[error("action range is inverted: start {start} > end {end}")]
    InvertedRange { start: usize, end: usize },

    #[error("{kind} action has no replacement text")]
    MissingNewCode { kind: ActionKind },

    #[error("group action has no children")]
    EmptyGroup,

    #[error("group child must be an edit action, found {kind}")]
    NonEditChild { kind: ActionKind },

    #[error("{kind} action must be the only action in its result")]
    FileActionWithSiblings { kind: ActionKind },

    #[error("{kind} action has no byte range to splice")]
    FileActionInEdits { kind: ActionKind },

    #[error("action range [{start}, {end}) exceeds source length {source_len}")]
    OutOfBounds {
        start: usize,
        end: usize,
        source_len: usize,
    },

    #[error("offset {offset} is not a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("action ranges overlap: [{a_start}, {a_end}) and [{b_start}, {b_end})")]
    Overlap {
        a_start: usize,
        a_end: usize,
        b_start: usize,
        b_end: usize,
    },

    #[error("result has no actions")]
    EmptyResult,
}

impl Action {
    /// An `edit` action replacing `[start, end)` with `new_code`.
    pub fn edit(start: usize, end: usize, new_code: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Edit,
            start,
            end,
            new_code: Some(new_code.into()),
            children: Vec::new(),
        }
    }

    /// A `group` action applying `children` together as one unit.
    pub fn group(children: Vec<Action>) -> Self {
        Self {
            kind: ActionKind::Group,
            start: 0,
            end: 0,
            new_code: None,
            children,
        }
    }

    /// An `add_file` action writing `content` as the whole file.
    pub fn add_file(content: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::AddFile,
            start: 0,
            end: 0,
            new_code: Some(content.into()),
            children: Vec::new(),
        }
    }

    /// A `remove_file` action deleting the whole file.
    pub fn remove_file() -> Self {
        Self {
            kind: ActionKind::RemoveFile,
            start: 0,
            end: 0,
            new_code: None,
            children: Vec::new(),
        }
    }

    /// Net change in length this action introduces when spliced.
    ///
    /// Meaningful for `edit` and `group` (sum over children); always 0 for
    /// file-level kinds.
    pub fn offset_delta(&self) -> isize {
        match self.kind {
            ActionKind::Edit => {
                let inserted = self.new_code.as_deref().map_or(0, str::len) as isize;
                inserted - self.end.saturating_sub(self.start) as isize
            }
            ActionKind::Group => self.children.iter().map(Action::offset_delta).sum(),
            ActionKind::AddFile | ActionKind::RemoveFile => 0,
        }
    }

    /// The concrete edits this action splices: itself for an `edit`, its
    /// children for a `group`. Empty for file-level kinds.
    pub fn leaf_edits(&self) -> &[Action] {
        match self.kind {
            ActionKind::Edit => std::slice::from_ref(self),
            ActionKind::Group => &self.children,
            ActionKind::AddFile | ActionKind::RemoveFile => &[],
        }
    }

    /// Shift this action's offsets by `delta` if its range starts at or after
    /// `from`. Group children shift individually.
    pub fn shift_from(&mut self, from: usize, delta: isize) {
        match self.kind {
            ActionKind::Edit => {
                if self.start >= from {
                    self.start = self.start.saturating_add_signed(delta);
                    self.end = self.end.saturating_add_signed(delta);
                }
            }
            ActionKind::Group => {
                for child in &mut self.children {
                    child.shift_from(from, delta);
                }
            }
            ActionKind::AddFile | ActionKind::RemoveFile => {}
        }
    }

    /// Structural checks that need no source text.
    pub fn validate_shape(&self) -> Result<(), MalformedAction> {
        match self.kind {
            ActionKind::Edit => {
                if self.start > self.end {
                    return Err(MalformedAction::InvertedRange {
                        start: self.start,
                        end: self.end,
                    });
                }
                if self.new_code.is_none() {
                    return Err(MalformedAction::MissingNewCode { kind: self.kind });
                }
                Ok(())
            }
            ActionKind::Group => {
                if self.children.is_empty() {
                    return Err(MalformedAction::EmptyGroup);
                }
                for child in &self.children {
                    if child.kind != ActionKind::Edit {
                        return Err(MalformedAction::NonEditChild { kind: child.kind });
                    }
                    child.validate_shape()?;
                }
                Ok(())
            }
            ActionKind::AddFile => {
                if self.new_code.is_none() {
                    return Err(MalformedAction::MissingNewCode { kind: self.kind });
                }
                Ok(())
            }
            ActionKind::RemoveFile => Ok(()),
        }
    }
}

/// Structural checks for a result's whole action list.
///
/// Beyond per-action shape this enforces the list-level rules: a result must
/// have at least one action, and a file-level action must be its only one.
pub fn validate_actions(actions: &[Action]) -> Result<(), MalformedAction> {
    if actions.is_empty() {
        return Err(MalformedAction::EmptyResult);
    }
    for action in actions {
        action.validate_shape()?;
        if action.kind.is_file_level() && actions.len() > 1 {
            return Err(MalformedAction::FileActionWithSiblings { kind: action.kind });
        }
    }
    Ok(())
}
