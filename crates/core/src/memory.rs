//! Conversation memory: a read-only view of the dialogue so far.
//!
//! The memory is owned and mutated by a collaborator outside this engine
//! (chat history persistence). Strategies only read from it.

use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
}

/// A single turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Read-only view over a conversation.
pub trait ConversationMemory: Send + Sync {
    /// Total number of messages recorded in the conversation.
    fn message_count(&self) -> usize;

    /// The most recent turns, oldest first, at most `limit` of them.
    fn recent_turns(&self, limit: usize) -> Vec<Turn>;

    /// The latest turn, if any.
    fn last_turn(&self) -> Option<Turn> {
        self.recent_turns(1).pop()
    }
}

/// An owned copy of a conversation, handed to the engine by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl ConversationSnapshot {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl ConversationMemory for ConversationSnapshot {
    fn message_count(&self) -> usize {
        self.turns.len()
    }

    fn recent_turns(&self, limit: usize) -> Vec<Turn> {
        let start = self.turns.len().saturating_sub(limit);
        self.turns[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_turns_keeps_order() {
        let memory = ConversationSnapshot::new(vec![
            Turn::user("my cat sneezes"),
            Turn::assistant("how long has it been?"),
            Turn::user("two days"),
        ]);
        assert_eq!(memory.message_count(), 3);
        let recent = memory.recent_turns(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "how long has it been?");
        assert_eq!(memory.last_turn().unwrap().content, "two days");
    }

    #[test]
    fn empty_snapshot() {
        let memory = ConversationSnapshot::default();
        assert_eq!(memory.message_count(), 0);
        assert!(memory.recent_turns(5).is_empty());
        assert!(memory.last_turn().is_none());
    }

    #[test]
    fn snapshot_deserializes_from_json() {
        let json = r#"{"turns":[{"role":"user","content":"hi"}]}"#;
        let memory: ConversationSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(memory.turns[0].role, Role::User);
    }
}
