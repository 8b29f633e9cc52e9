//! Receiver-side flow control surface.
//!
//! The ingestion path asks a flow controller whether tasks of a given
//! priority may proceed before it fetches and caches their events. Only the
//! trait and a test double live here; admission policy belongs to the
//! component that implements the trait.

use std::collections::HashMap;
use std::sync::Mutex;

/// Priority class of a replication task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    High,
    Low,
}

/// Admission decision for one priority class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowControlCommand {
    /// Tasks of this priority may proceed.
    Resume,
    /// Tasks of this priority should be held back.
    Pause,
}

/// Maps a task priority to the receiver's current admission decision.
pub trait ReceiverFlowController: Send + Sync {
    fn get_flow_control_info(&self, priority: TaskPriority) -> FlowControlCommand;
}

/// In-memory [`ReceiverFlowController`] for tests.
///
/// Unconfigured priorities resume. Every query is recorded so tests can
/// assert what the caller asked about.
pub struct MockReceiverFlowController {
    commands: Mutex<HashMap<TaskPriority, FlowControlCommand>>,
    calls: Mutex<Vec<TaskPriority>>,
}

impl MockReceiverFlowController {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the command returned for `priority`.
    pub fn set_command(&self, priority: TaskPriority, command: FlowControlCommand) {
        self.commands.lock().unwrap().insert(priority, command);
    }

    /// Priorities queried so far, in call order.
    pub fn calls(&self) -> Vec<TaskPriority> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockReceiverFlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverFlowController for MockReceiverFlowController {
    fn get_flow_control_info(&self, priority: TaskPriority) -> FlowControlCommand {
        self.calls.lock().unwrap().push(priority);
        self.commands
            .lock()
            .unwrap()
            .get(&priority)
            .copied()
            .unwrap_or(FlowControlCommand::Resume)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_configured_command() {
        let controller = MockReceiverFlowController::new();
        controller.set_command(TaskPriority::Low, FlowControlCommand::Pause);

        assert_eq!(
            controller.get_flow_control_info(TaskPriority::Low),
            FlowControlCommand::Pause
        );
    }

    #[test]
    fn test_mock_defaults_to_resume() {
        let controller = MockReceiverFlowController::new();
        assert_eq!(
            controller.get_flow_control_info(TaskPriority::High),
            FlowControlCommand::Resume
        );
    }

    #[test]
    fn test_mock_records_calls_in_order() {
        let controller = MockReceiverFlowController::new();
        controller.get_flow_control_info(TaskPriority::High);
        controller.get_flow_control_info(TaskPriority::Low);
        controller.get_flow_control_info(TaskPriority::High);

        assert_eq!(
            controller.calls(),
            vec![TaskPriority::High, TaskPriority::Low, TaskPriority::High]
        );
    }
}
