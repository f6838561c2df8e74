//! Conversation state machine.
//!
//! One `ChatFlow` value per chat, stored serialized in the session row.
//! The enum payloads accumulate the answers collected so far; transitions
//! happen only in `handlers`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChatFlow {
    #[default]
    Idle,
    AwaitingUsername,
    AwaitingPassword {
        username: String,
    },
    AwaitingTitle,
    AwaitingContent {
        title: String,
    },
    AwaitingTags {
        title: String,
        content: String,
    },
    AwaitingSearchTag,
}

impl ChatFlow {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"state":"idle"}"#.to_string())
    }

    /// Unreadable stored state degrades to Idle rather than wedging the chat.
    pub fn from_json(s: &str) -> Self {
        serde_json::from_str(s).unwrap_or_default()
    }
}
