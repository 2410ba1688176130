// External producers: task generation and message text generation.
// The coordinator only sees the traits; the implementations here are the
// defaults the simulation runner wires in.

use crate::agents::AgentRole;
use crate::error::GenerationError;
use crate::priority::TaskPriority;
use crate::task::{Task, TaskId};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

/// Supplies new work. Ids are issued by the swarm and passed in.
pub trait TaskSource: Send {
    fn generate(&mut self, id: TaskId) -> Task;
}

/// Opaque `text -> text` capability used to compose agent messages.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, context: &str) -> Result<String, GenerationError>;
}

/// (description, priority, required role)
pub const TASK_TEMPLATES: [(&str, TaskPriority, AgentRole); 4] = [
    ("Monitor network traffic", TaskPriority::High, AgentRole::Monitoring),
    ("Analyze threat level", TaskPriority::Medium, AgentRole::DataAnalysis),
    ("Prepare daily report", TaskPriority::Low, AgentRole::Reporting),
    ("Secure communication channels", TaskPriority::High, AgentRole::Security),
];

/// Picks uniformly among [`TASK_TEMPLATES`].
pub struct RandomTaskSource {
    rng: StdRng,
}

impl RandomTaskSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for tests and `--seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTaskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSource for RandomTaskSource {
    fn generate(&mut self, id: TaskId) -> Task {
        let (description, priority, role) = TASK_TEMPLATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(TASK_TEMPLATES[0]);
        Task::new(id, description, priority, role)
    }
}

const CANNED_REPLIES: [&str; 4] = [
    "all systems nominal.",
    "requesting an updated threat assessment.",
    "acknowledging the latest directive.",
    "daily summary is on track.",
];

/// Stand-in for a language model: appends a canned phrase to the context.
#[derive(Debug, Default, Clone)]
pub struct TemplateTextGenerator;

#[async_trait]
impl TextGenerator for TemplateTextGenerator {
    async fn generate(&self, context: &str) -> Result<String, GenerationError> {
        let index = context.len() % CANNED_REPLIES.len();
        Ok(format!("{} {}", context.trim_end(), CANNED_REPLIES[index]))
    }
}
