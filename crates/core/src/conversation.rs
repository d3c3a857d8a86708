//! Conversation turns and the bounded chat history
//!
//! The history is owned by whoever creates it (the server keeps one in its
//! shared state) and every mutation happens under a single lock, so a push,
//! its eviction and the rendered snapshot always agree with each other.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Default number of entries kept in the chat history
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Prefix used when the turn is rendered into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "AI",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// `User: ...` / `AI: ...`
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

/// Bounded FIFO of recent turns
///
/// Holds at most `capacity` entries. Pushing onto a full history evicts the
/// oldest entry first.
#[derive(Debug)]
pub struct ConversationHistory {
    capacity: usize,
    turns: Mutex<VecDeque<Turn>>,
}

impl ConversationHistory {
    /// Create an empty history. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: Mutex::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.lock().is_empty()
    }

    /// Append a turn, returning the entries evicted to stay within capacity
    pub fn push(&self, turn: Turn) -> Vec<Turn> {
        let mut turns = self.turns.lock();
        Self::push_locked(&mut turns, self.capacity, turn)
    }

    /// Append a turn and render the resulting history in one critical section
    pub fn push_and_render(&self, turn: Turn) -> String {
        let mut turns = self.turns.lock();
        let evicted = Self::push_locked(&mut turns, self.capacity, turn);
        if !evicted.is_empty() {
            tracing::debug!(evicted = evicted.len(), "Evicted oldest history entries");
        }
        Self::render_locked(&turns)
    }

    /// Render all entries joined by newlines
    pub fn render(&self) -> String {
        Self::render_locked(&self.turns.lock())
    }

    /// Copy of the current entries, oldest first
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.turns.lock().clear();
    }

    fn push_locked(turns: &mut VecDeque<Turn>, capacity: usize, turn: Turn) -> Vec<Turn> {
        turns.push_back(turn);
        let mut evicted = Vec::new();
        while turns.len() > capacity {
            if let Some(oldest) = turns.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    fn render_locked(turns: &VecDeque<Turn>) -> String {
        turns
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_turn_render() {
        assert_eq!(Turn::user("hello").render(), "User: hello");
        assert_eq!(Turn::assistant("hi there").render(), "AI: hi there");
    }

    #[test]
    fn test_history_evicts_oldest_first() {
        let history = ConversationHistory::new(3);
        for i in 0..3 {
            assert!(history.push(Turn::user(format!("m{}", i))).is_empty());
        }

        let evicted = history.push(Turn::user("m3"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].content, "m0");

        let contents: Vec<_> = history.snapshot().into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_push_and_render() {
        let history = ConversationHistory::default();
        history.push(Turn::user("What is RAG?"));
        history.push(Turn::assistant("Retrieval augmented generation."));
        let rendered = history.push_and_render(Turn::user("Thanks"));
        assert_eq!(
            rendered,
            "User: What is RAG?\nAI: Retrieval augmented generation.\nUser: Thanks"
        );
    }

    #[test]
    fn test_default_capacity() {
        let history = ConversationHistory::default();
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
        for i in 0..25 {
            history.push(Turn::user(i.to_string()));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.snapshot()[0].content, "15");
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let history = ConversationHistory::new(0);
        history.push(Turn::user("a"));
        history.push(Turn::user("b"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.render(), "User: b");
    }

    #[test]
    fn test_concurrent_pushes_stay_bounded() {
        let history = std::sync::Arc::new(ConversationHistory::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        history.push_and_render(Turn::user(format!("{}-{}", t, i)));
                        assert!(history.len() <= 10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), 10);
    }

    proptest! {
        #[test]
        fn history_never_exceeds_capacity(
            capacity in 1usize..16,
            messages in proptest::collection::vec("[a-z]{0,8}", 0..64),
        ) {
            let history = ConversationHistory::new(capacity);
            for (i, message) in messages.iter().enumerate() {
                let turn = if i % 2 == 0 { Turn::user(message.clone()) } else { Turn::assistant(message.clone()) };
                history.push(turn);
                prop_assert!(history.len() <= capacity);
            }

            // The survivors are exactly the most recent entries, in order
            let expected: Vec<String> = messages
                .iter()
                .skip(messages.len().saturating_sub(capacity))
                .cloned()
                .collect();
            let actual: Vec<String> = history.snapshot().into_iter().map(|t| t.content).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
