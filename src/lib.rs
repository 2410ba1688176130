// Agent Swarm Library - role-typed agents pulling prioritized work from a shared queue
// This exposes the core components for testing and integration

pub mod agent_lifecycle;
pub mod agents;
pub mod config;
pub mod error;
pub mod generator;
pub mod observability;
pub mod priority;
pub mod shutdown;
pub mod simulation;
pub mod task;
pub mod telemetry;

// Re-export key types for easy access
pub use agents::routing::{Assignment, DeliveryReceipt, Message};
pub use agents::{
    Agent, AgentId, AgentRole, AgentState, AgentStatus, Completion, CompletionMode, Swarm,
};
pub use config::{AgentSpec, SwarmConfig};
pub use error::{GenerationError, SwarmError};
pub use generator::{RandomTaskSource, TaskSource, TemplateTextGenerator, TextGenerator};
pub use observability::{SwarmMetrics, SwarmStats};
pub use priority::TaskPriority;
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
pub use simulation::{RunSummary, SimulationRunner, TickOutcome};
pub use task::{Task, TaskId};
pub use telemetry::{init_telemetry, shutdown_telemetry};
