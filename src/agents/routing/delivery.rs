use crate::agents::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification travelling between agents. `recipient` is `None` for broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: AgentId,
    pub recipient: Option<AgentId>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn direct(sender: AgentId, recipient: AgentId, text: impl Into<String>) -> Self {
        Self {
            sender,
            recipient: Some(recipient),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn broadcast(sender: AgentId, text: impl Into<String>) -> Self {
        Self {
            sender,
            recipient: None,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_none()
    }
}

/// Who actually received a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReceipt {
    pub recipients: Vec<AgentId>,
}

impl DeliveryReceipt {
    pub fn delivered_to(&self, agent_id: AgentId) -> bool {
        self.recipients.contains(&agent_id)
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}
