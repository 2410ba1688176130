use crate::agents::AgentRole;
use crate::priority::TaskPriority;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = u64;

/// One unit of work. Immutable once created; moves from the pending queue
/// into exactly one agent and finally into that agent's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    description: String,
    priority: TaskPriority,
    required_role: AgentRole,
}

impl Task {
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        priority: TaskPriority,
        required_role: AgentRole,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
            required_role,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn required_role(&self) -> AgentRole {
        self.required_role
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {}: {} (Priority: {}, Role: {})",
            self.id, self.description, self.priority, self.required_role
        )
    }
}
