// Agent Lifecycle Module - Idle/Busy state machine
//
// Each agent owns one machine; the coordinator drives it through Agent::assign
// and Agent::complete only.

pub mod state_machine;

pub use state_machine::{AgentLifecycle, LifecycleEvent};
