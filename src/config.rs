use crate::agents::{AgentId, AgentRole, CompletionMode, DEFAULT_INBOX_CAPACITY};
use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the agent swarm
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Control loop settings
    pub simulation: SimulationConfig,
    /// Roster of agents that join at startup, in join order
    pub agents: Vec<AgentSpec>,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay between loop iterations
    pub tick_interval_ms: u64,
    /// Chance per tick that two agents exchange a message
    pub message_probability: f64,
    /// Print a status report whenever the task counter is a multiple of this
    pub report_every: u64,
    /// Stop after this many ticks (run until interrupted when unset)
    pub max_ticks: Option<u64>,
    /// Seed for task and message randomness
    pub seed: Option<u64>,
    /// Whether tasks finish instantly or on the next tick
    pub completion: CompletionMode,
    /// Upper bound on a single text generation call
    pub generation_timeout_ms: u64,
    /// Messages each agent keeps; the oldest are dropped past this
    pub inbox_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentSpec {
    pub id: AgentId,
    pub role: AgentRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level / EnvFilter directive
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            message_probability: 0.3,
            report_every: 5,
            max_ticks: None,
            seed: None,
            completion: CompletionMode::Immediate,
            generation_timeout_ms: 5000,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// One agent per role, ids 1..=5 in role declaration order
pub fn default_roster() -> Vec<AgentSpec> {
    AgentRole::ALL
        .iter()
        .zip(1..)
        .map(|(role, id)| AgentSpec { id, role: *role })
        .collect()
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            agents: default_roster(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SwarmConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (agent-swarm.toml)
    /// 3. Environment variables (prefixed with AGENT_SWARM_, `__` between sections)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("agent-swarm.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("AGENT_SWARM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let swarm_config: SwarmConfig = config.try_deserialize()?;
        swarm_config.validate()?;
        Ok(swarm_config)
    }

    pub fn validate(&self) -> Result<()> {
        let probability = self.simulation.message_probability;
        if !(0.0..=1.0).contains(&probability) {
            anyhow::bail!("simulation.message_probability must be within 0..=1, got {probability}");
        }
        if self.simulation.inbox_capacity == 0 {
            anyhow::bail!("simulation.inbox_capacity must be at least 1");
        }
        if self.simulation.report_every == 0 {
            anyhow::bail!("simulation.report_every must be at least 1");
        }
        if let Some(agent) = self.agents.iter().find(|agent| agent.id == 0) {
            anyhow::bail!("agent ids must be positive, found {} ({})", agent.id, agent.role);
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_has_one_agent_per_role() {
        let roster = default_roster();
        assert_eq!(roster.len(), 5);
        assert_eq!(roster[0], AgentSpec { id: 1, role: AgentRole::Monitoring });
        assert_eq!(roster[4], AgentSpec { id: 5, role: AgentRole::DataAnalysis });
    }

    #[test]
    fn test_toml_round_trip_preserves_defaults() {
        let config = SwarmConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: SwarmConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let parsed: SwarmConfig = toml::from_str(
            r#"
            [simulation]
            tick_interval_ms = 10
            completion = "deferred"

            [[agents]]
            id = 9
            role = "security"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.simulation.tick_interval_ms, 10);
        assert_eq!(parsed.simulation.completion, CompletionMode::Deferred);
        assert_eq!(parsed.simulation.report_every, 5);
        assert_eq!(parsed.agents, vec![AgentSpec { id: 9, role: AgentRole::Security }]);
        assert_eq!(parsed.observability.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let mut config = SwarmConfig::default();
        config.simulation.message_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_probability() {
        let mut config = SwarmConfig::default();
        config.simulation.message_probability = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_inbox_capacity() {
        let mut config = SwarmConfig::default();
        config.simulation.inbox_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_agent_id() {
        let mut config = SwarmConfig::default();
        config.agents.push(AgentSpec { id: 0, role: AgentRole::Reporting });
        assert!(config.validate().is_err());
    }
}
