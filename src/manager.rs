//! Review bookkeeping over a set of pending rewrite results.
//!
//! A [`ResultSet`] is the mutable collection a review surface walks: indices
//! into it are the identifiers a collaborator acts on. Every operation either
//! succeeds and updates the set, or fails and leaves it exactly as it was, so
//! the host can keep rendering from the same value after an error.

use crate::applier::{self, ActionEffect, AppliedEffect, ApplyError};
use crate::result::RewriteResult;
use serde::{Deserialize, Serialize};
use std::slice;
use thiserror::Error;

/// Ordered, index-addressed collection of pending rewrite results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<RewriteResult>,
}

/// Failure of a [`ResultSet`] operation. The set is unchanged.
#[derive(Debug, Error)]
pub enum ResultSetError {
    #[error("no result at index {index} ({len} results)")]
    ResultIndex { index: usize, len: usize },

    #[error("result {result_index} has no action at index {action_index} ({len} actions)")]
    ActionIndex {
        result_index: usize,
        action_index: usize,
        len: usize,
    },

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Index bookkeeping returned by [`ResultSet::apply_action`], for reconciling
/// a displayed list without a full re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAction {
    /// Index the result had when the action was applied.
    pub result_index: usize,
    /// Index the action had within the result.
    pub action_index: usize,
    /// Net length change the splice introduced. 0 for file-level actions.
    pub offset_delta: isize,
    /// Whether the owning result was consumed and removed from the set.
    pub result_resolved: bool,
}

/// Index bookkeeping returned by the discard operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedAction {
    pub result_index: usize,
    pub action_index: usize,
    /// Whether discarding this action emptied and removed the result.
    pub result_resolved: bool,
}

/// Per-result outcomes of one best-effort [`ResultSet::apply_all`] pass.
#[derive(Debug)]
#[must_use = "the report carries per-result failures"]
pub struct ApplyReport {
    /// One entry per result, in the order the set held them.
    pub outcomes: Vec<(String, Result<AppliedEffect, ApplyError>)>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Number of results applied and removed from the set.
    pub fn applied(&self) -> usize {
        self.outcomes.len() - self.failed()
    }

    /// Number of results that failed and stayed pending.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .count()
    }

    /// Aggregate message naming every failed result, or `None` when clean.
    pub fn error_message(&self) -> Option<String> {
        let failed = self.failed();
        if failed == 0 {
            return None;
        }
        let mut message = format!(
            "failed to apply {failed} of {} results:",
            self.outcomes.len()
        );
        for (file_path, outcome) in &self.outcomes {
            if let Err(err) = outcome {
                message.push_str(&format!("\n  {file_path}: {err}"));
            }
        }
        Some(message)
    }
}

impl ResultSet {
    pub fn new(results: Vec<RewriteResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RewriteResult> {
        self.results.get(index)
    }

    pub fn results(&self) -> &[RewriteResult] {
        &self.results
    }

    pub fn iter(&self) -> slice::Iter<'_, RewriteResult> {
        self.results.iter()
    }

    pub fn into_results(self) -> Vec<RewriteResult> {
        self.results
    }

    /// Total pending top-level actions across all results.
    pub fn total_actions(&self) -> usize {
        self.results.iter().map(RewriteResult::action_count).sum()
    }

    /// Apply every pending result, best effort.
    ///
    /// Results that apply cleanly are removed from the set; failing ones keep
    /// their relative order and stay pending, so the collaborator can fix the
    /// cause and retry. The report pairs each result's file path with its
    /// outcome, in the order the set held them.
    pub fn apply_all(&mut self) -> ApplyReport {
        tracing::debug!(results = self.results.len(), "applying all pending results");
        let mut outcomes = Vec::with_capacity(self.results.len());
        let mut kept = Vec::new();
        for result in self.results.drain(..) {
            let file_path = result.file_path.clone();
            match applier::apply_result(&result) {
                Ok(effect) => outcomes.push((file_path, Ok(effect))),
                Err(err) => {
                    tracing::warn!(
                        path = %file_path,
                        error = %err,
                        "result failed to apply, keeping it pending"
                    );
                    outcomes.push((file_path, Err(err)));
                    kept.push(result);
                }
            }
        }
        self.results = kept;
        ApplyReport { outcomes }
    }

    /// Apply the result at `index` and remove it from the set.
    ///
    /// On error the set still holds the result, untouched.
    pub fn apply_result(&mut self, index: usize) -> Result<AppliedEffect, ResultSetError> {
        let result = self
            .results
            .get(index)
            .ok_or_else(|| self.result_index_error(index))?;
        let effect = applier::apply_result(result)?;
        self.results.remove(index);
        Ok(effect)
    }

    /// Apply one action of one result, leaving its siblings pending.
    ///
    /// The applied action is removed from the result. For an edit or group,
    /// the remaining actions' offsets shift past each spliced range and the
    /// cached `file_source` refreshes to the new content, so they keep
    /// addressing the text now on disk. A file-level action consumes the whole
    /// result. Either way, a result left with no actions is removed.
    pub fn apply_action(
        &mut self,
        result_index: usize,
        action_index: usize,
    ) -> Result<AppliedAction, ResultSetError> {
        let len = self.results.len();
        let result = self
            .results
            .get_mut(result_index)
            .ok_or(ResultSetError::ResultIndex {
                index: result_index,
                len,
            })?;
        if action_index >= result.actions.len() {
            return Err(ResultSetError::ActionIndex {
                result_index,
                action_index,
                len: result.actions.len(),
            });
        }

        match applier::apply_action(result, action_index)? {
            ActionEffect::File(effect) => {
                tracing::debug!(effect = %effect, "file-level action resolved its result");
                self.results.remove(result_index);
                Ok(AppliedAction {
                    result_index,
                    action_index,
                    offset_delta: 0,
                    result_resolved: true,
                })
            }
            ActionEffect::Spliced {
                delta, new_source, ..
            } => {
                let applied = result.actions.remove(action_index);
                result.shift_offsets_after(&applied);
                result.file_source = Some(new_source);
                let result_resolved = result.actions.is_empty();
                if result_resolved {
                    self.results.remove(result_index);
                }
                Ok(AppliedAction {
                    result_index,
                    action_index,
                    offset_delta: delta,
                    result_resolved,
                })
            }
        }
    }

    /// Discard the result at `index` without touching the file system,
    /// returning it.
    pub fn remove_result(&mut self, index: usize) -> Result<RewriteResult, ResultSetError> {
        if index >= self.results.len() {
            return Err(self.result_index_error(index));
        }
        Ok(self.results.remove(index))
    }

    /// Discard one action of one result without touching the file system.
    ///
    /// Remaining offsets need no adjustment: the file did not change. A result
    /// left with no actions is removed, same as the apply variant.
    pub fn remove_action(
        &mut self,
        result_index: usize,
        action_index: usize,
    ) -> Result<RemovedAction, ResultSetError> {
        let len = self.results.len();
        let result = self
            .results
            .get_mut(result_index)
            .ok_or(ResultSetError::ResultIndex {
                index: result_index,
                len,
            })?;
        if action_index >= result.actions.len() {
            return Err(ResultSetError::ActionIndex {
                result_index,
                action_index,
                len: result.actions.len(),
            });
        }

        result.actions.remove(action_index);
        let result_resolved = result.actions.is_empty();
        if result_resolved {
            self.results.remove(result_index);
        }
        Ok(RemovedAction {
            result_index,
            action_index,
            result_resolved,
        })
    }

    fn result_index_error(&self, index: usize) -> ResultSetError {
        ResultSetError::ResultIndex {
            index,
            len: self.results.len(),
        }
    }
}

impl From<Vec<RewriteResult>> for ResultSet {
    fn from(results: Vec<RewriteResult>) -> Self {
        Self::new(results)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a RewriteResult;
    type IntoIter = slice::Iter<'a, RewriteResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
