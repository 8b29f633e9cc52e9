//! Version-history model for multi-region workflow replication.
//!
//! A workflow execution's history can diverge across regions. Each line of
//! history is tracked as a branch: an ordered run of (event id, version)
//! checkpoints plus an opaque branch token addressing the events in storage.
//! The types here carry the branch bookkeeping and the pure comparisons
//! (containment, lowest common ancestor) replication uses to reconcile
//! divergent histories.

use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, MeridianResult};

/// Event ids are 1-based; the first event of every execution has this id.
pub const FIRST_EVENT_ID: i64 = 1;

// ============================================================================
// VERSION HISTORY ITEM
// ============================================================================

/// A single checkpoint in a version-history branch.
///
/// The checkpoint records that the branch covers events up to and including
/// `event_id` at failover `version`. Within a branch, items are ordered by
/// strictly increasing event id and strictly increasing version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionHistoryItem {
    /// Highest event id covered by this checkpoint (inclusive).
    pub event_id: i64,
    /// Failover version the covered events were written at.
    pub version: i64,
}

impl VersionHistoryItem {
    /// Create a new checkpoint.
    pub const fn new(event_id: i64, version: i64) -> Self {
        Self { event_id, version }
    }
}

// ============================================================================
// VERSION HISTORY (single branch)
// ============================================================================

/// One branch of a workflow's version-history tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHistory {
    branch_token: Vec<u8>,
    items: Vec<VersionHistoryItem>,
}

impl VersionHistory {
    /// Create a branch from a token and an ordered checkpoint run.
    pub fn new(branch_token: Vec<u8>, items: Vec<VersionHistoryItem>) -> Self {
        Self {
            branch_token,
            items,
        }
    }

    /// Opaque token addressing this branch in underlying storage.
    pub fn branch_token(&self) -> &[u8] {
        &self.branch_token
    }

    /// Checkpoints of this branch, oldest first.
    pub fn items(&self) -> &[VersionHistoryItem] {
        &self.items
    }

    /// Whether the branch has no checkpoints.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether this branch covers the given (event id, version) pair.
    ///
    /// Checkpoints partition the branch into version segments: a checkpoint
    /// at (e, v) covers the events after the previous checkpoint's event id
    /// up to and including `e`, all at version `v`. The pair is contained
    /// iff it falls inside the segment of its version. Versions ascend
    /// along a branch, so the scan can stop early once it passes the
    /// requested version.
    pub fn contains_item(&self, item: VersionHistoryItem) -> bool {
        let mut prev_event_id = FIRST_EVENT_ID - 1;
        for current in &self.items {
            if item.version == current.version {
                if prev_event_id < item.event_id && item.event_id <= current.event_id {
                    return true;
                }
            } else if item.version < current.version {
                return false;
            }
            prev_event_id = current.event_id;
        }
        false
    }

    /// Last checkpoint of the branch.
    pub fn last_item(&self) -> MeridianResult<VersionHistoryItem> {
        self.items
            .last()
            .copied()
            .ok_or_else(|| HistoryError::EmptyHistory.into())
    }

    /// Record that the branch now covers `item`.
    ///
    /// If `item` carries the same version as the last checkpoint, the
    /// checkpoint is extended in place; a higher version appends a new
    /// checkpoint. Event ids must grow and versions must not regress -
    /// anything else is a malformed update and is rejected.
    pub fn add_or_update_item(&mut self, item: VersionHistoryItem) -> MeridianResult<()> {
        let Some(last) = self.items.last_mut() else {
            self.items.push(item);
            return Ok(());
        };

        if item.version < last.version {
            return Err(HistoryError::MalformedHistory {
                reason: format!(
                    "cannot update version history with a lower version {}, last version: {}",
                    item.version, last.version
                ),
            }
            .into());
        }
        if item.event_id <= last.event_id {
            return Err(HistoryError::MalformedHistory {
                reason: format!(
                    "cannot add version history item with a lower event id {}, last event id: {}",
                    item.event_id, last.event_id
                ),
            }
            .into());
        }

        if item.version == last.version {
            last.event_id = item.event_id;
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Find the lowest common ancestor checkpoint of two branches.
    ///
    /// Walks both checkpoint runs backwards. At the first version both
    /// branches share, the joint point is the smaller of the two event ids
    /// at that version; until then the side with the larger version steps
    /// back. Two branches of the same execution always share a root, so a
    /// missing joint point means the history metadata is corrupt.
    pub fn lowest_common_ancestor_item(
        &self,
        other: &VersionHistory,
    ) -> MeridianResult<VersionHistoryItem> {
        let mut local_index = self.items.len();
        let mut remote_index = other.items.len();

        while local_index > 0 && remote_index > 0 {
            let local = self.items[local_index - 1];
            let remote = other.items[remote_index - 1];

            if local.version == remote.version {
                return Ok(VersionHistoryItem::new(
                    local.event_id.min(remote.event_id),
                    local.version,
                ));
            } else if local.version > remote.version {
                local_index -= 1;
            } else {
                remote_index -= 1;
            }
        }

        Err(HistoryError::MalformedHistory {
            reason: "no joint point found between version histories".to_string(),
        }
        .into())
    }
}

// ============================================================================
// VERSION HISTORIES (branch set)
// ============================================================================

/// The set of version-history branches of one workflow execution.
///
/// One branch is designated current: the line of history the execution is
/// actively appending to. The other branches are forks left behind by
/// failovers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHistories {
    current_index: usize,
    histories: Vec<VersionHistory>,
}

impl VersionHistories {
    /// Create a branch set with a single, current branch.
    pub fn new(initial: VersionHistory) -> Self {
        Self {
            current_index: 0,
            histories: vec![initial],
        }
    }

    /// All branches, in insertion order.
    pub fn histories(&self) -> &[VersionHistory] {
        &self.histories
    }

    /// Index of the current branch.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Branch at `index`.
    pub fn history(&self, index: usize) -> MeridianResult<&VersionHistory> {
        self.histories.get(index).ok_or_else(|| {
            HistoryError::IndexOutOfRange {
                index,
                count: self.histories.len(),
            }
            .into()
        })
    }

    /// The current branch.
    pub fn current(&self) -> MeridianResult<&VersionHistory> {
        self.history(self.current_index)
    }

    /// Append a forked branch.
    ///
    /// The new branch becomes current when its last checkpoint's version is
    /// at least the current branch's; a lower version leaves the current
    /// designation untouched. Returns whether current changed and the new
    /// branch's index.
    pub fn add_version_history(
        &mut self,
        history: VersionHistory,
    ) -> MeridianResult<(bool, usize)> {
        let current_last = self.current()?.last_item()?;
        let new_last = history.last_item()?;

        self.histories.push(history);
        let new_index = self.histories.len() - 1;

        if new_last.version < current_last.version {
            return Ok((false, new_index));
        }
        self.current_index = new_index;
        Ok((true, new_index))
    }

    /// Find the first branch, by insertion order, covering the given pair.
    pub fn find_first_index_by_item(&self, item: VersionHistoryItem) -> MeridianResult<usize> {
        for (index, history) in self.histories.iter().enumerate() {
            if history.contains_item(item) {
                return Ok(index);
            }
        }
        Err(HistoryError::BranchNotFound {
            event_id: item.event_id,
            version: item.version,
        }
        .into())
    }
}

// ============================================================================
// EXECUTION RECORD
// ============================================================================

/// Metadata about the base execution a reset/continued run forked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseExecutionInfo {
    /// Run id of the base execution.
    pub run_id: String,
    /// Event id of the lowest common ancestor with the base run.
    pub lowest_common_ancestor_event_id: i64,
    /// Version of the lowest common ancestor event.
    pub lowest_common_ancestor_event_version: i64,
}

impl BaseExecutionInfo {
    /// Create a new base-execution record.
    pub fn new(
        run_id: impl Into<String>,
        lowest_common_ancestor_event_id: i64,
        lowest_common_ancestor_event_version: i64,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            lowest_common_ancestor_event_id,
            lowest_common_ancestor_event_version,
        }
    }
}

/// Produce an owned copy of base-execution metadata.
///
/// `None` passes through. The copy shares no state with the source, so
/// callers are free to hold or mutate it without touching storage-owned
/// records.
pub fn copy_base_execution_info(base: Option<&BaseExecutionInfo>) -> Option<BaseExecutionInfo> {
    base.cloned()
}

/// A workflow execution's replication-relevant state: optional base-run
/// metadata plus its version-history branch set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowExecutionInfo {
    /// Base-run metadata when this execution forked from another run.
    pub base_execution_info: Option<BaseExecutionInfo>,
    /// Version-history branches of this execution.
    pub version_histories: VersionHistories,
}

impl WorkflowExecutionInfo {
    /// Create a new execution record.
    pub fn new(
        base_execution_info: Option<BaseExecutionInfo>,
        version_histories: VersionHistories,
    ) -> Self {
        Self {
            base_execution_info,
            version_histories,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a well-formed branch by replaying updates and dropping the
    /// ones the branch rejects.
    fn build_branch(ops: &[(i64, i64)]) -> VersionHistory {
        let mut history = VersionHistory::new(b"prop".to_vec(), Vec::new());
        for &(event_id, version) in ops {
            let _ = history.add_or_update_item(VersionHistoryItem::new(event_id, version));
        }
        history
    }

    fn ops_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((1i64..200, 0i64..8), 0..32)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: accepted updates keep checkpoints strictly increasing
        /// in event id and non-decreasing in version.
        #[test]
        fn prop_add_or_update_keeps_branch_well_formed(ops in ops_strategy()) {
            let history = build_branch(&ops);
            for window in history.items().windows(2) {
                prop_assert!(window[0].event_id < window[1].event_id);
                prop_assert!(window[0].version < window[1].version);
            }
        }

        /// Property: a contained pair's version always appears as some
        /// checkpoint's version.
        #[test]
        fn prop_contained_version_has_segment(
            ops in ops_strategy(),
            event_id in 1i64..200,
            version in 0i64..8,
        ) {
            let history = build_branch(&ops);
            let probe = VersionHistoryItem::new(event_id, version);
            if history.contains_item(probe) {
                prop_assert!(history.items().iter().any(|i| i.version == version));
            }
        }

        /// Property: every checkpoint of a branch is contained in it.
        #[test]
        fn prop_checkpoints_are_contained(ops in ops_strategy()) {
            let history = build_branch(&ops);
            for &checkpoint in history.items() {
                prop_assert!(history.contains_item(checkpoint));
            }
        }

        /// Property: the lowest common ancestor is symmetric.
        #[test]
        fn prop_lca_is_symmetric(a_ops in ops_strategy(), b_ops in ops_strategy()) {
            let a = build_branch(&a_ops);
            let b = build_branch(&b_ops);

            match (a.lowest_common_ancestor_item(&b), b.lowest_common_ancestor_item(&a)) {
                (Ok(ab), Ok(ba)) => prop_assert_eq!(ab, ba),
                (Err(_), Err(_)) => {}
                (ab, ba) => prop_assert!(
                    false,
                    "asymmetric outcome: {:?} vs {:?}",
                    ab.is_ok(),
                    ba.is_ok()
                ),
            }
        }
    }
}
