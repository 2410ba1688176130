// Agent - a role-bound worker holding at most one task at a time.
// State transitions only happen through assign/complete, which the
// coordinator calls; agents never touch each other directly.

use crate::agent_lifecycle::{AgentLifecycle, LifecycleEvent};
use crate::agents::coordinator::Swarm;
use crate::agents::routing::Message;
use crate::agents::AgentRole;
use crate::error::SwarmError;
use crate::generator::{TemplateTextGenerator, TextGenerator};
use crate::task::Task;
use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub type AgentId = u64;

/// Messages kept per agent before the oldest are dropped
pub const DEFAULT_INBOX_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Busy,
}

/// Point-in-time view of one agent, as produced by `report_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: AgentId,
    pub role: AgentRole,
    pub state: AgentState,
    pub current_task: Option<String>,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, &self.current_task) {
            (AgentState::Busy, Some(description)) => write!(
                f,
                "Agent {} ({}) is busy. Current task: {}",
                self.agent_id, self.role, description
            ),
            (AgentState::Busy, None) => write!(f, "Agent {} ({}) is busy.", self.agent_id, self.role),
            (AgentState::Idle, _) => write!(f, "Agent {} ({}) is idle.", self.agent_id, self.role),
        }
    }
}

pub struct Agent {
    id: AgentId,
    role: AgentRole,
    lifecycle: StateMachine<AgentLifecycle>,
    inbox: VecDeque<Message>,
    inbox_capacity: usize,
    text_generator: Arc<dyn TextGenerator>,
}

impl Agent {
    pub fn new(id: AgentId, role: AgentRole) -> Self {
        Self {
            id,
            role,
            lifecycle: AgentLifecycle::new(id).state_machine(),
            inbox: VecDeque::new(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            text_generator: Arc::new(TemplateTextGenerator),
        }
    }

    /// Swap in a different text generation capability
    pub fn with_text_generator(mut self, text_generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = text_generator;
        self
    }

    /// Bound the inbox; a capacity of zero is treated as one
    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity.max(1);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn state(&self) -> AgentState {
        if self.lifecycle.inner().is_available() {
            AgentState::Idle
        } else {
            AgentState::Busy
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == AgentState::Idle
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.lifecycle.inner().current_task()
    }

    /// Completed tasks, oldest first
    pub fn history(&self) -> &[Task] {
        self.lifecycle.inner().history()
    }

    /// Received messages, oldest first, at most `inbox_capacity` of them
    pub fn inbox(&self) -> &VecDeque<Message> {
        &self.inbox
    }

    pub fn text_generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.text_generator)
    }

    /// Register with a swarm. Returns the agent previously registered under
    /// the same id, if any (last write wins).
    pub fn join(self, swarm: &mut Swarm) -> Option<Agent> {
        swarm.register_agent(self)
    }

    /// Start a task. A busy agent rejects the assignment and keeps its state;
    /// what happens to the rejected task is the caller's decision.
    pub fn assign(&mut self, task: Task) -> Result<(), SwarmError> {
        if let Some(current) = self.current_task() {
            let task_id = current.id();
            warn!(
                agent_id = self.id,
                task_id,
                rejected_task_id = task.id(),
                "Agent {} is already busy with task {}.",
                self.id,
                task_id
            );
            return Err(SwarmError::AgentBusy {
                agent_id: self.id,
                task_id,
            });
        }

        info!(
            agent_id = self.id,
            task_id = task.id(),
            role = %self.role,
            "Agent {} ({}) started task: {}",
            self.id,
            self.role,
            task.description()
        );
        self.lifecycle.handle(&LifecycleEvent::Assign { task });
        Ok(())
    }

    /// Finish the current task and go idle. Returns the finished task.
    pub fn complete(&mut self) -> Result<Task, SwarmError> {
        if self.current_task().is_none() {
            warn!(agent_id = self.id, "Agent {} has no active task to complete.", self.id);
            return Err(SwarmError::NoActiveTask { agent_id: self.id });
        }

        self.lifecycle.handle(&LifecycleEvent::Complete);
        let finished = self
            .history()
            .last()
            .cloned()
            .ok_or(SwarmError::NoActiveTask { agent_id: self.id })?;
        info!(
            agent_id = self.id,
            task_id = finished.id(),
            "Agent {} completed task: {}",
            self.id,
            finished.description()
        );
        Ok(finished)
    }

    pub fn receive_message(&mut self, message: Message) {
        info!(
            agent_id = self.id,
            sender = message.sender,
            broadcast = message.is_broadcast(),
            "Agent {} received message from Agent {}: {}",
            self.id,
            message.sender,
            message.text
        );
        if self.inbox.len() >= self.inbox_capacity {
            self.inbox.pop_front();
        }
        self.inbox.push_back(message);
    }

    /// Compose message text with the injected generator. Does not touch
    /// lifecycle state, so it is safe to time out or drop.
    pub async fn generate_outgoing_message(&self, context: &str) -> Result<String, SwarmError> {
        Ok(self.text_generator.generate(context).await?)
    }

    pub fn report_status(&self) -> AgentStatus {
        AgentStatus {
            agent_id: self.id,
            role: self.role,
            state: self.state(),
            current_task: self.current_task().map(|task| task.description().to_string()),
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("state", &self.state())
            .field("current_task", &self.current_task().map(Task::id))
            .field("history", &self.history().len())
            .field("inbox", &self.inbox.len())
            .finish()
    }
}
