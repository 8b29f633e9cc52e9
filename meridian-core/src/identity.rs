//! Identity types for workflow executions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a single workflow execution.
///
/// A workflow execution is addressed by three string components: the
/// namespace it runs in, the user-assigned workflow id, and the run id
/// minted for this particular execution. The combination is unique across
/// the system and is used as part of replication cache keys, so the type
/// derives field-wise `Hash`/`Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowKey {
    /// Namespace the execution belongs to.
    pub namespace_id: String,
    /// User-assigned workflow identifier.
    pub workflow_id: String,
    /// Run identifier for this execution of the workflow.
    pub run_id: String,
}

impl WorkflowKey {
    /// Create a new workflow key.
    pub fn new(
        namespace_id: impl Into<String>,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }
}

impl fmt::Display for WorkflowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace_id, self.workflow_id, self.run_id
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
