// Swarm coordination - single owner of the agent registry and the pending queue.
// All cross-agent effects (task handoff, message delivery) go through here.

use crate::agents::routing::{
    assignment_order, find_idle_agent, Assignment, DeliveryReceipt, Message,
};
use crate::agents::{Agent, AgentId, AgentStatus};
use crate::error::SwarmError;
use crate::observability::{OperationTimer, SwarmMetrics};
use crate::task::{Task, TaskId};
use crate::telemetry::{create_coordination_span, generate_correlation_id};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// When an assigned task leaves its agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    /// Tasks finish within the assignment step that started them
    #[default]
    Immediate,
    /// Agents stay busy until `Swarm::complete_task` is called
    Deferred,
}

/// Result of `Swarm::complete_task`: the finished task and whatever the
/// follow-up assignment pass handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: Task,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Default)]
pub struct Swarm {
    // Registry in join order; ids are unique
    agents: Vec<Agent>,
    pending: Vec<Task>,
    // Every id ever accepted by enqueue_task, including completed ones
    accepted: HashSet<TaskId>,
    task_counter: TaskId,
    completion: CompletionMode,
    metrics: SwarmMetrics,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion_mode(completion: CompletionMode) -> Self {
        Self {
            completion,
            ..Self::default()
        }
    }

    pub fn completion_mode(&self) -> CompletionMode {
        self.completion
    }

    /// Insert an agent keyed by id. A duplicate id replaces the earlier
    /// registration in place and hands it back.
    pub fn register_agent(&mut self, agent: Agent) -> Option<Agent> {
        let (id, role) = (agent.id(), agent.role());

        if let Some(existing) = self.agents.iter_mut().find(|a| a.id() == id) {
            warn!(
                agent_id = id,
                "Agent {} was already registered; replacing previous registration",
                id
            );
            let previous = std::mem::replace(existing, agent);
            info!(agent_id = id, role = %role, "Agent {} ({}) joined the swarm.", id, role);
            return Some(previous);
        }

        self.agents.push(agent);
        info!(agent_id = id, role = %role, "Agent {} ({}) joined the swarm.", id, role);
        None
    }

    pub fn agent(&self, agent_id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == agent_id)
    }

    fn agent_mut(&mut self, agent_id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id() == agent_id)
    }

    /// Registered agents in iteration (join) order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(Agent::id).collect()
    }

    pub fn is_registered(&self, agent_id: AgentId) -> bool {
        self.agent(agent_id).is_some()
    }

    /// Pending tasks in arrival order
    pub fn pending_tasks(&self) -> &[Task] {
        &self.pending
    }

    pub fn task_counter(&self) -> TaskId {
        self.task_counter
    }

    pub fn metrics(&self) -> &SwarmMetrics {
        &self.metrics
    }

    /// Issue the next task id. Strictly increasing for the life of the swarm.
    pub fn next_task_id(&mut self) -> TaskId {
        self.task_counter = self.task_counter.saturating_add(1);
        self.task_counter
    }

    /// Queue a task and immediately run an assignment pass.
    pub fn enqueue_task(&mut self, task: Task) -> Result<Vec<Assignment>, SwarmError> {
        if self.accepted.contains(&task.id()) {
            warn!(task_id = task.id(), "Rejected duplicate task: {}", task);
            return Err(SwarmError::DuplicateTask { task_id: task.id() });
        }

        // Caller-supplied ids must not collide with ids issued later
        if task.id() > self.task_counter {
            self.task_counter = task.id();
        }

        info!(
            task_id = task.id(),
            priority = %task.priority(),
            role = %task.required_role(),
            "Added task to queue: {}",
            task
        );
        self.accepted.insert(task.id());
        self.pending.push(task);
        self.metrics.record_enqueued();

        Ok(self.assign_pending_tasks())
    }

    /// Hand pending tasks to idle agents of the matching role.
    ///
    /// Tasks are attempted once each, highest priority first and in arrival
    /// order among equals. The pass walks a sorted snapshot of ids rather than
    /// the queue itself, and a task leaves the queue only after its agent has
    /// accepted it. Tasks with no idle capable agent stay queued.
    pub fn assign_pending_tasks(&mut self) -> Vec<Assignment> {
        let correlation_id = generate_correlation_id();
        let span = create_coordination_span("assign_pending_tasks", None, None, Some(&correlation_id));
        let _entered = span.enter();
        let timer = OperationTimer::new("assign_pending_tasks");

        let mut assignments = Vec::new();

        for task_id in assignment_order(&self.pending) {
            let Some(task) = self.pending.iter().find(|t| t.id() == task_id).cloned() else {
                continue;
            };

            let Some(index) = find_idle_agent(&self.agents, task.required_role()) else {
                debug!(
                    task_id,
                    role = %task.required_role(),
                    "No idle {} agent for task {}; leaving it queued",
                    task.required_role(),
                    task_id
                );
                continue;
            };
            let Some(agent) = self.agents.get_mut(index) else {
                continue;
            };

            // find_idle_agent only yields idle agents; on rejection the task stays queued
            if agent.assign(task.clone()).is_err() {
                continue;
            }

            let agent_id = agent.id();
            let role = agent.role();
            self.pending.retain(|t| t.id() != task_id);
            self.metrics.record_assigned();

            if self.completion == CompletionMode::Immediate && agent.complete().is_ok() {
                self.metrics.record_completed();
            }

            assignments.push(Assignment {
                task_id,
                agent_id,
                role,
            });
        }

        debug!(
            assigned = assignments.len(),
            still_pending = self.pending.len(),
            "Assignment pass finished"
        );
        timer.finish();
        assignments
    }

    /// Finish the agent's current task, then run an assignment pass so
    /// queued work can flow to the freed agent.
    pub fn complete_task(&mut self, agent_id: AgentId) -> Result<Completion, SwarmError> {
        let agent = self
            .agent_mut(agent_id)
            .ok_or(SwarmError::AgentNotFound { agent_id })?;
        let task = agent.complete()?;
        self.metrics.record_completed();

        let assignments = self.assign_pending_tasks();
        Ok(Completion { task, assignments })
    }

    /// Ids of agents currently holding a task
    pub fn busy_agents(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|a| !a.is_idle())
            .map(Agent::id)
            .collect()
    }

    /// Send on behalf of `sender`: direct when `recipient` is given, broadcast
    /// otherwise. Senders that have not joined are ignored.
    pub fn send_message(
        &mut self,
        sender: AgentId,
        text: &str,
        recipient: Option<AgentId>,
    ) -> Result<DeliveryReceipt, SwarmError> {
        if !self.is_registered(sender) {
            debug!(sender, "Agent {} is not part of the swarm; message not sent", sender);
            return Err(SwarmError::SenderNotJoined { sender });
        }

        match recipient {
            Some(recipient) => {
                info!(
                    sender,
                    recipient,
                    "Agent {} sending message to Agent {}: {}",
                    sender,
                    recipient,
                    text
                );
                self.route(text, sender, recipient)
            }
            None => {
                info!(sender, "Agent {} broadcasting message: {}", sender, text);
                Ok(self.broadcast(text, sender))
            }
        }
    }

    /// Deliver to every registered agent except the sender, in registry order.
    pub fn broadcast(&mut self, text: &str, sender: AgentId) -> DeliveryReceipt {
        let mut receipt = DeliveryReceipt::default();
        let message = Message::broadcast(sender, text);

        for agent in self.agents.iter_mut().filter(|a| a.id() != sender) {
            agent.receive_message(message.clone());
            receipt.recipients.push(agent.id());
        }

        self.metrics.record_delivered(receipt.recipients.len());
        receipt
    }

    /// Deliver to exactly one agent. Unknown recipients drop the message.
    pub fn route(
        &mut self,
        text: &str,
        sender: AgentId,
        recipient: AgentId,
    ) -> Result<DeliveryReceipt, SwarmError> {
        let Some(agent) = self.agent_mut(recipient) else {
            error!(sender, recipient, "Recipient Agent {} not found.", recipient);
            self.metrics.record_delivery_failure();
            return Err(SwarmError::RecipientNotFound { recipient });
        };

        agent.receive_message(Message::direct(sender, recipient, text));
        self.metrics.record_delivered(1);
        Ok(DeliveryReceipt {
            recipients: vec![recipient],
        })
    }

    /// Snapshot every agent in registry order and log one line each.
    pub fn status_report(&self) -> Vec<AgentStatus> {
        info!("Generating swarm status report:");
        self.agents
            .iter()
            .map(|agent| {
                let status = agent.report_status();
                info!(agent_id = status.agent_id, "{}", status);
                status
            })
            .collect()
    }
}
