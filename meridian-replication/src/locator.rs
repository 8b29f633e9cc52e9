//! Branch resolution for incoming replication tasks.
//!
//! A replication task names an event position (id plus failover version).
//! Before its events can be cached or applied, that position has to be
//! located inside the target execution's version histories to recover the
//! branch it extends.

use meridian_core::{
    copy_base_execution_info, BaseExecutionInfo, MeridianResult, VersionHistoryItem,
    WorkflowExecutionInfo,
};

/// The branch an event position resolved to, detached from the execution
/// record it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    /// Items of the matched branch.
    pub version_history_items: Vec<VersionHistoryItem>,
    /// Storage token of the matched branch.
    pub branch_token: Vec<u8>,
    /// Copy of the execution's reset point, if it had one.
    pub base_execution_info: Option<BaseExecutionInfo>,
}

/// Locate the branch of `execution_info` containing the event at
/// (`event_id`, `version`).
///
/// When several branches contain the position (they share history up to a
/// fork), the first match in insertion order is returned. The result owns
/// its data, so callers can hold it without borrowing the execution record.
pub fn resolve_branch_for_item(
    execution_info: &WorkflowExecutionInfo,
    event_id: i64,
    version: i64,
) -> MeridianResult<ResolvedBranch> {
    let base_execution_info =
        copy_base_execution_info(execution_info.base_execution_info.as_ref());

    let item = VersionHistoryItem::new(event_id, version);
    let index = execution_info
        .version_histories
        .find_first_index_by_item(item)?;
    let history = execution_info.version_histories.history(index)?;

    Ok(ResolvedBranch {
        version_history_items: history.items().to_vec(),
        branch_token: history.branch_token().to_vec(),
        base_execution_info,
    })
}

// =============================================================================
// TESTS
// =============================================================================
