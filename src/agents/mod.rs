// Agent coordination modules
// The swarm owns every agent and the pending queue; agents never reach each other directly.

pub mod agent;
pub mod coordinator;
pub mod role;
pub mod routing;

pub use agent::{Agent, AgentId, AgentState, AgentStatus, DEFAULT_INBOX_CAPACITY};
pub use coordinator::{Completion, CompletionMode, Swarm};
pub use role::AgentRole;
