use crate::agents::AgentId;
use crate::task::Task;
use statig::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Assign { task: Task },
    Complete,
}

/// Idle/Busy lifecycle of a single agent.
///
/// The current task lives inside the machine, so "busy" and "holds a task"
/// can never disagree: the only way into `busy` is an `Assign` carrying the
/// task, and the only way out is `Complete`, which moves it into history.
#[derive(Debug, Default)]
pub struct AgentLifecycle {
    pub agent_id: AgentId,
    current_task: Option<Task>,
    history: Vec<Task>,
}

impl AgentLifecycle {
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            ..Default::default()
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }
}

#[state_machine(initial = "State::idle()", state(derive(Debug)))]
impl AgentLifecycle {
    #[state]
    fn idle(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Assign { task } => {
                self.current_task = Some(task.clone());
                tracing::debug!(
                    agent_id = self.agent_id,
                    task_id = task.id(),
                    "Lifecycle transition idle -> busy"
                );
                Transition(State::busy())
            }
            LifecycleEvent::Complete => Handled,
        }
    }

    #[state]
    fn busy(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Complete => {
                if let Some(task) = self.current_task.take() {
                    tracing::debug!(
                        agent_id = self.agent_id,
                        task_id = task.id(),
                        "Lifecycle transition busy -> idle"
                    );
                    self.history.push(task);
                }
                Transition(State::idle())
            }
            // No preemption: a busy agent ignores further assignments
            LifecycleEvent::Assign { .. } => Handled,
        }
    }
}

impl AgentLifecycle {
    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn history(&self) -> &[Task] {
        &self.history
    }

    pub fn is_available(&self) -> bool {
        self.current_task.is_none()
    }
}
