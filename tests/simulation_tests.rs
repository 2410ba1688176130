//! Control loop tests: tick limits, shutdown, and text generation failures.
//! Uses #[tokio::test] with paused time so tick delays cost nothing.

use agent_swarm::config::SimulationConfig;
use agent_swarm::{
    Agent, AgentRole, GenerationError, ShutdownCoordinator, SimulationRunner, Swarm, SwarmConfig,
    Task, TaskId, TaskPriority, TaskSource, TextGenerator,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct RoundRobinSource;

impl TaskSource for RoundRobinSource {
    fn generate(&mut self, id: TaskId) -> Task {
        let role = AgentRole::ALL[(id as usize - 1) % AgentRole::ALL.len()];
        Task::new(id, format!("job-{id}"), TaskPriority::Medium, role)
    }
}

/// Records every context it is asked about
#[derive(Default)]
struct RecordingGenerator {
    contexts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, context: &str) -> Result<String, GenerationError> {
        self.contexts.lock().unwrap().push(context.to_string());
        Ok(format!("{context} hello"))
    }
}

struct StalledGenerator;

#[async_trait]
impl TextGenerator for StalledGenerator {
    async fn generate(&self, _context: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

fn two_agents(generator: Arc<dyn TextGenerator>) -> Swarm {
    let mut swarm = Swarm::new();
    Agent::new(1, AgentRole::Monitoring)
        .with_text_generator(Arc::clone(&generator))
        .join(&mut swarm);
    Agent::new(2, AgentRole::DecisionMaking)
        .with_text_generator(generator)
        .join(&mut swarm);
    swarm
}

fn settings(max_ticks: Option<u64>, message_probability: f64) -> SimulationConfig {
    SimulationConfig {
        tick_interval_ms: 2000,
        message_probability,
        max_ticks,
        seed: Some(11),
        generation_timeout_ms: 100,
        ..SimulationConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn run_stops_at_tick_limit() {
    let config = SwarmConfig {
        simulation: settings(Some(10), 0.0),
        ..SwarmConfig::default()
    };
    let mut runner = SimulationRunner::from_config(&config);

    let summary = runner.run(ShutdownCoordinator::new().subscribe()).await;

    assert_eq!(summary.ticks, 10);
    assert!(!summary.interrupted);
    assert_eq!(summary.stats.tasks_enqueued, 10);
    // Every role has an agent and completion is immediate
    assert_eq!(summary.stats.tasks_completed, 10);
    assert!(runner.swarm().pending_tasks().is_empty());
    assert_eq!(runner.swarm().task_counter(), 10);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_loop() {
    let mut runner = SimulationRunner::new(
        two_agents(Arc::new(RecordingGenerator::default())),
        Box::new(RoundRobinSource),
        settings(None, 0.0),
    );
    let shutdown = ShutdownCoordinator::new();
    let signal = shutdown.subscribe();

    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(4500)).await;
        stopper.trigger();
    });

    let summary = runner.run(signal).await;

    assert!(summary.interrupted);
    // Ticks at t=0, 2s and 4s, then the signal lands during the next sleep
    assert_eq!(summary.ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn already_triggered_shutdown_runs_nothing() {
    let mut runner = SimulationRunner::new(
        two_agents(Arc::new(RecordingGenerator::default())),
        Box::new(RoundRobinSource),
        settings(Some(5), 0.0),
    );
    let shutdown = ShutdownCoordinator::new();
    shutdown.trigger();

    let summary = runner.run(shutdown.subscribe()).await;

    assert!(summary.interrupted);
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.stats.tasks_enqueued, 0);
}

#[tokio::test(start_paused = true)]
async fn message_exchange_uses_sender_context() {
    let generator = Arc::new(RecordingGenerator::default());
    let mut runner = SimulationRunner::new(
        two_agents(generator.clone()),
        Box::new(RoundRobinSource),
        settings(None, 1.0),
    );

    let mut exchanges = Vec::new();
    for _ in 0..20 {
        if let Some(exchange) = runner.tick().await.exchange {
            exchanges.push(exchange);
        }
    }

    assert!(!exchanges.is_empty());
    let contexts = generator.contexts.lock().unwrap().clone();
    assert_eq!(contexts.len(), exchanges.len());
    for exchange in &exchanges {
        assert_ne!(exchange.sender, exchange.recipient);
        assert_eq!(exchange.text, format!("Agent {} says: hello", exchange.sender));
        let inbox = runner.swarm().agent(exchange.recipient).unwrap().inbox();
        assert!(inbox.iter().any(|m| m.text == exchange.text && m.sender == exchange.sender));
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_generation_times_out_without_touching_agents() {
    let mut runner = SimulationRunner::new(
        two_agents(Arc::new(StalledGenerator)),
        Box::new(RoundRobinSource),
        settings(None, 1.0),
    );

    for _ in 0..10 {
        let outcome = runner.tick().await;
        assert!(outcome.exchange.is_none());
    }

    let swarm = runner.swarm();
    assert!(swarm.agents().iter().all(|agent| agent.inbox().is_empty()));
    assert!(swarm.agents().iter().all(Agent::is_idle));
    assert_eq!(swarm.metrics().get_stats().messages_delivered, 0);
}

#[tokio::test(start_paused = true)]
async fn inboxes_stay_within_configured_capacity() {
    let config = SwarmConfig {
        simulation: SimulationConfig {
            inbox_capacity: 2,
            ..settings(None, 1.0)
        },
        ..SwarmConfig::default()
    };
    let mut runner = SimulationRunner::from_config(&config);

    let mut delivered = 0;
    for _ in 0..60 {
        if runner.tick().await.exchange.is_some() {
            delivered += 1;
        }
    }

    assert!(delivered > 2 * runner.swarm().agents().len());
    assert!(runner.swarm().agents().iter().all(|agent| agent.inbox().len() <= 2));
}
