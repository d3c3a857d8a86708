//! Core types for the document QA backend
//!
//! This crate provides the types shared by every other crate:
//! - Source documents and their origin
//! - Conversation turns and the bounded chat history
//! - Error types

pub mod conversation;
pub mod document;
pub mod error;

pub use conversation::{ConversationHistory, Turn, TurnRole, DEFAULT_HISTORY_CAPACITY};
pub use document::{Document, DocumentSource};
pub use error::{Error, Result};
