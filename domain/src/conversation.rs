//! Conversation domain entities
//!
//! [`Utterance`] is one user or assistant turn as stored in history;
//! [`Message`] is the wire-level unit sent to a language model (adds the
//! system role). [`ConversationHistory`] is bounded: once the cap is
//! exceeded, the oldest utterances are dropped. The cap is applied when
//! history is read into a turn, never concurrently.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message sent to or received from a language model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One user or assistant turn in the conversation (immutable once created)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub role: Role,
    pub text: String,
}

impl Utterance {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    /// Convert to a wire-level message
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: self.text.clone(),
        }
    }
}

/// Ordered, bounded sequence of utterances.
///
/// Insertion order is significant. When the configured cap is exceeded the
/// oldest entries are dropped, keeping the most recent context.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    utterances: Vec<Utterance>,
    cap: usize,
}

impl ConversationHistory {
    /// Default number of utterances retained
    pub const DEFAULT_CAP: usize = 20;

    pub fn new(cap: usize) -> Self {
        Self {
            utterances: Vec::new(),
            cap,
        }
    }

    /// Build a history from existing utterances, applying the cap once.
    pub fn from_utterances(utterances: Vec<Utterance>, cap: usize) -> Self {
        let mut history = Self { utterances, cap };
        history.enforce_cap();
        history
    }

    pub fn push(&mut self, utterance: Utterance) {
        self.utterances.push(utterance);
        self.enforce_cap();
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// Render all utterances as wire-level messages, in order.
    pub fn to_messages(&self) -> Vec<Message> {
        self.utterances.iter().map(|u| u.to_message()).collect()
    }

    fn enforce_cap(&mut self) {
        if self.utterances.len() > self.cap {
            let excess = self.utterances.len() - self.cap;
            self.utterances.drain(..excess);
        }
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_preserves_insertion_order() {
        let mut history = ConversationHistory::new(10);
        history.push(Utterance::user("first"));
        history.push(Utterance::assistant("second"));
        history.push(Utterance::user("third"));

        let texts: Vec<&str> = history.utterances().iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_history_drops_oldest_when_capped() {
        let mut history = ConversationHistory::new(2);
        history.push(Utterance::user("a"));
        history.push(Utterance::assistant("b"));
        history.push(Utterance::user("c"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.utterances()[0].text, "b");
        assert_eq!(history.utterances()[1].text, "c");
    }

    #[test]
    fn test_from_utterances_applies_cap_once() {
        let utterances = vec![
            Utterance::user("1"),
            Utterance::assistant("2"),
            Utterance::user("3"),
            Utterance::assistant("4"),
        ];
        let history = ConversationHistory::from_utterances(utterances, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history.utterances()[0].text, "2");
    }

    #[test]
    fn test_to_messages_maps_roles() {
        let mut history = ConversationHistory::default();
        history.push(Utterance::user("question"));
        history.push(Utterance::assistant("answer"));

        let messages = history.to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }
}
