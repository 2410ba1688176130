// Cooperative control loop: one task per tick, an occasional message
// exchange, periodic status reports. Single tokio task, no locking; the
// swarm is only ever touched from here.

use crate::agents::routing::Assignment;
use crate::agents::{Agent, AgentId, CompletionMode, Swarm};
use crate::config::{SimulationConfig, SwarmConfig};
use crate::error::{GenerationError, SwarmError};
use crate::generator::{RandomTaskSource, TaskSource};
use crate::observability::SwarmStats;
use crate::shutdown::ShutdownSignal;
use crate::task::TaskId;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{info, warn};

/// A message one agent sent another during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub sender: AgentId,
    pub recipient: AgentId,
    pub text: String,
}

/// What happened during one iteration of the loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub task_id: TaskId,
    pub completed: Vec<TaskId>,
    pub assignments: Vec<Assignment>,
    pub exchange: Option<Exchange>,
    pub reported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub interrupted: bool,
    pub stats: SwarmStats,
}

pub struct SimulationRunner {
    swarm: Swarm,
    tasks: Box<dyn TaskSource>,
    rng: StdRng,
    settings: SimulationConfig,
    ticks: u64,
}

impl SimulationRunner {
    pub fn new(swarm: Swarm, tasks: Box<dyn TaskSource>, settings: SimulationConfig) -> Self {
        let rng = match settings.seed {
            // Offset so message draws don't mirror the task source's draws
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Self {
            swarm,
            tasks,
            rng,
            settings,
            ticks: 0,
        }
    }

    /// Build the swarm from the configured roster with the default task source
    pub fn from_config(config: &SwarmConfig) -> Self {
        let mut swarm = Swarm::with_completion_mode(config.simulation.completion);
        for spec in &config.agents {
            Agent::new(spec.id, spec.role)
                .with_inbox_capacity(config.simulation.inbox_capacity)
                .join(&mut swarm);
        }

        let tasks: Box<dyn TaskSource> = match config.simulation.seed {
            Some(seed) => Box::new(RandomTaskSource::seeded(seed)),
            None => Box::new(RandomTaskSource::new()),
        };

        Self::new(swarm, tasks, config.simulation.clone())
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn swarm_mut(&mut self) -> &mut Swarm {
        &mut self.swarm
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn reached_max_ticks(&self) -> bool {
        self.settings
            .max_ticks
            .is_some_and(|max_ticks| self.ticks >= max_ticks)
    }

    /// Run until `max_ticks` or until shutdown is signalled.
    pub async fn run(&mut self, mut shutdown: ShutdownSignal) -> RunSummary {
        let interval = Duration::from_millis(self.settings.tick_interval_ms);
        let mut interrupted = false;

        info!(
            agents = self.swarm.agents().len(),
            completion = ?self.swarm.completion_mode(),
            "Starting swarm simulation"
        );

        while !self.reached_max_ticks() {
            if shutdown.is_triggered() {
                interrupted = true;
                break;
            }

            self.tick().await;

            if self.reached_max_ticks() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    interrupted = true;
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        if interrupted {
            info!(ticks = self.ticks, "Simulation stopped by user.");
        } else {
            info!(ticks = self.ticks, "Simulation finished.");
        }
        self.swarm.metrics().log_stats();

        RunSummary {
            ticks: self.ticks,
            interrupted,
            stats: self.swarm.metrics().get_stats(),
        }
    }

    /// One loop iteration.
    pub async fn tick(&mut self) -> TickOutcome {
        self.ticks = self.ticks.saturating_add(1);
        let mut outcome = TickOutcome::default();

        // Deferred mode: work handed out last tick finishes now
        if self.swarm.completion_mode() == CompletionMode::Deferred {
            for agent_id in self.swarm.busy_agents() {
                match self.swarm.complete_task(agent_id) {
                    Ok(completion) => {
                        outcome.completed.push(completion.task.id());
                        outcome.assignments.extend(completion.assignments);
                    }
                    Err(e) => warn!(agent_id, "Could not complete task: {}", e),
                }
            }
        }

        let task_id = self.swarm.next_task_id();
        let task = self.tasks.generate(task_id);
        outcome.task_id = task_id;
        match self.swarm.enqueue_task(task) {
            Ok(assignments) => outcome.assignments.extend(assignments),
            Err(e) => warn!(task_id, "Task not enqueued: {}", e),
        }

        // random_bool panics outside 0..=1, NaN included
        let probability = match self.settings.message_probability {
            p if p.is_finite() => p.clamp(0.0, 1.0),
            _ => 0.0,
        };
        if self.rng.random_bool(probability) {
            outcome.exchange = self.exchange_message().await;
        }

        let report_every = self.settings.report_every.max(1);
        if self.swarm.task_counter() % report_every == 0 {
            self.swarm.status_report();
            outcome.reported = true;
        }

        outcome
    }

    /// Pick a random sender and recipient and deliver a generated message.
    /// Picking the same agent twice skips the exchange.
    async fn exchange_message(&mut self) -> Option<Exchange> {
        let ids = self.swarm.agent_ids();
        let sender = *ids.choose(&mut self.rng)?;
        let recipient = *ids.choose(&mut self.rng)?;
        if sender == recipient {
            return None;
        }

        let context = format!("Agent {sender} says:");
        let text = match self.generate_text(sender, &context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(agent_id = sender, "Message generation failed: {}", e);
                return None;
            }
        };

        match self.swarm.send_message(sender, &text, Some(recipient)) {
            Ok(_) => Some(Exchange {
                sender,
                recipient,
                text,
            }),
            Err(e) => {
                warn!(sender, recipient, "Message not delivered: {}", e);
                None
            }
        }
    }

    // Runs outside any assign/complete step, so a timeout leaves agent state untouched
    async fn generate_text(&self, sender: AgentId, context: &str) -> Result<String, SwarmError> {
        let agent = self
            .swarm
            .agent(sender)
            .ok_or(SwarmError::SenderNotJoined { sender })?;
        let timeout_ms = self.settings.generation_timeout_ms;

        tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            agent.generate_outgoing_message(context),
        )
        .await
        .map_err(|_| SwarmError::Generation(GenerationError::Timeout { timeout_ms }))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentRole;
    use crate::priority::TaskPriority;
    use crate::task::Task;

    /// Always produces the same Security task
    struct FixedSource;

    impl TaskSource for FixedSource {
        fn generate(&mut self, id: TaskId) -> Task {
            Task::new(id, "Secure communication channels", TaskPriority::High, AgentRole::Security)
        }
    }

    fn settings(max_ticks: u64) -> SimulationConfig {
        SimulationConfig {
            tick_interval_ms: 0,
            message_probability: 0.0,
            max_ticks: Some(max_ticks),
            seed: Some(1),
            ..SimulationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_tick_enqueues_and_assigns() {
        let mut swarm = Swarm::new();
        Agent::new(4, AgentRole::Security).join(&mut swarm);
        let mut runner = SimulationRunner::new(swarm, Box::new(FixedSource), settings(1));

        let outcome = runner.tick().await;

        assert_eq!(outcome.task_id, 1);
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(outcome.assignments[0].agent_id, 4);
        assert!(outcome.exchange.is_none());
        assert!(!outcome.reported);
    }

    #[tokio::test]
    async fn test_deferred_ticks_complete_previous_work() {
        let mut swarm = Swarm::with_completion_mode(CompletionMode::Deferred);
        Agent::new(4, AgentRole::Security).join(&mut swarm);
        let mut runner = SimulationRunner::new(swarm, Box::new(FixedSource), settings(2));

        let first = runner.tick().await;
        assert!(first.completed.is_empty());
        assert_eq!(runner.swarm().busy_agents(), vec![4]);

        let second = runner.tick().await;
        assert_eq!(second.completed, vec![1]);
        assert_eq!(second.assignments.len(), 1);
        assert_eq!(second.assignments[0].task_id, 2);
    }

    #[tokio::test]
    async fn test_completion_sweep_assignments_are_reported() {
        let mut swarm = Swarm::with_completion_mode(CompletionMode::Deferred);
        Agent::new(4, AgentRole::Security).join(&mut swarm);
        for id in [1, 2] {
            swarm.enqueue_task(FixedSource.generate(id)).unwrap();
        }
        let mut runner = SimulationRunner::new(swarm, Box::new(FixedSource), settings(1));

        let outcome = runner.tick().await;

        assert_eq!(outcome.completed, vec![1]);
        assert_eq!(outcome.task_id, 3);
        assert_eq!(
            outcome.assignments,
            vec![Assignment { task_id: 2, agent_id: 4, role: AgentRole::Security }]
        );
        assert_eq!(runner.swarm().pending_tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_nan_probability_skips_exchange() {
        let mut swarm = Swarm::new();
        Agent::new(1, AgentRole::Monitoring).join(&mut swarm);
        Agent::new(4, AgentRole::Security).join(&mut swarm);
        let mut runner = SimulationRunner::new(
            swarm,
            Box::new(FixedSource),
            SimulationConfig {
                message_probability: f64::NAN,
                ..settings(10)
            },
        );

        for _ in 0..10 {
            assert!(runner.tick().await.exchange.is_none());
        }
        assert_eq!(runner.swarm().metrics().get_stats().messages_delivered, 0);
    }

    #[tokio::test]
    async fn test_report_every_fifth_task() {
        let mut swarm = Swarm::new();
        Agent::new(4, AgentRole::Security).join(&mut swarm);
        let mut runner = SimulationRunner::new(swarm, Box::new(FixedSource), settings(5));

        let mut reported = Vec::new();
        for _ in 0..5 {
            reported.push(runner.tick().await.reported);
        }

        assert_eq!(reported, vec![false, false, false, false, true]);
    }
}
