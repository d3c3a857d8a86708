//! Prompt messages
//!
//! Backends receive a slice of [`Message`]s and map it onto their own wire
//! format: chat-style APIs keep the roles, completion-style APIs flatten the
//! messages into a single prompt with [`flatten`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Builder for a message list with an optional system instruction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    system: Option<String>,
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system instruction; blank instructions are ignored
    pub fn system(mut self, instruction: Option<impl Into<String>>) -> Self {
        self.system = instruction
            .map(Into::into)
            .filter(|s: &String| !s.trim().is_empty());
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn assistant(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }

    pub fn build(self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(system) = self.system {
            messages.push(Message::system(system));
        }
        messages.extend(self.messages);
        messages
    }
}

/// Concatenate messages into one completion prompt, system text first
pub fn flatten(messages: &[Message]) -> String {
    let system = messages.iter().filter(|m| m.role == Role::System);
    let rest = messages.iter().filter(|m| m.role != Role::System);
    system
        .chain(rest)
        .map(|m| m.content.trim_end())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System instruction of a message list, if any
pub fn system_instruction(messages: &[Message]) -> Option<String> {
    let parts: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
