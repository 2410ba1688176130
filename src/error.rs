use crate::agents::AgentId;
use crate::task::TaskId;
use thiserror::Error;

/// Recoverable coordination failures. None of these stop the swarm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwarmError {
    #[error("Agent {agent_id} is already busy with task {task_id}")]
    AgentBusy { agent_id: AgentId, task_id: TaskId },
    #[error("Agent {agent_id} has no active task to complete")]
    NoActiveTask { agent_id: AgentId },
    #[error("Recipient Agent {recipient} not found")]
    RecipientNotFound { recipient: AgentId },
    #[error("Agent {sender} has not joined the swarm")]
    SenderNotJoined { sender: AgentId },
    #[error("Agent {agent_id} is not registered")]
    AgentNotFound { agent_id: AgentId },
    #[error("Task {task_id} is already pending or in progress")]
    DuplicateTask { task_id: TaskId },
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Text generation failed: {0}")]
    Failed(String),
    #[error("Text generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SwarmError::RecipientNotFound { recipient: 99 }.to_string(),
            "Recipient Agent 99 not found"
        );
        assert_eq!(
            SwarmError::AgentBusy { agent_id: 4, task_id: 2 }.to_string(),
            "Agent 4 is already busy with task 2"
        );
        let err: SwarmError = GenerationError::Timeout { timeout_ms: 250 }.into();
        assert_eq!(err.to_string(), "Text generation timed out after 250ms");
    }
}
