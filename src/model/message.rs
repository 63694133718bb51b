use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::turn::{InventoryUpdate, StatChanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    System,
}

/// Deltas shown under a system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDetails {
    pub stat_changes: StatChanges,
    pub inventory_updates: Vec<InventoryUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub details: Option<TurnDetails>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), None)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text.into(), None)
    }

    pub fn system_with_details(text: impl Into<String>, details: TurnDetails) -> Self {
        Self::new(Sender::System, text.into(), Some(details))
    }

    fn new(sender: Sender, text: String, details: Option<TurnDetails>) -> Self {
        Self {
            id: next_message_id(),
            sender,
            text,
            details,
        }
    }
}

fn next_message_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen();
    format!("{millis}-{suffix:08x}")
}
