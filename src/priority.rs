use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority levels for swarm tasks
/// Higher values = attempted earlier by an assignment pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Routine work (1)
    Low = 1,
    /// Default work (2)
    Medium = 2,
    /// Urgent work (3)
    High = 3,
}

impl TaskPriority {
    /// All priorities, lowest first
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Get the numeric priority value
    pub fn value(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskPriority::High => "HIGH",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::Low => "LOW",
        };
        write!(f, "{}", label)
    }
}
