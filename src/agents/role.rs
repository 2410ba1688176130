use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tag. Every agent has exactly one, every task requires exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Monitoring,
    DecisionMaking,
    Reporting,
    Security,
    DataAnalysis,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Monitoring,
        AgentRole::DecisionMaking,
        AgentRole::Reporting,
        AgentRole::Security,
        AgentRole::DataAnalysis,
    ];

    /// Human readable label used in log lines and reports
    pub fn label(self) -> &'static str {
        match self {
            AgentRole::Monitoring => "Monitoring",
            AgentRole::DecisionMaking => "Decision-Making",
            AgentRole::Reporting => "Reporting",
            AgentRole::Security => "Security",
            AgentRole::DataAnalysis => "Data Analysis",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
