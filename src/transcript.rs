//! Chat transcript seam
//!
//! The engine never renders chat itself; it appends assistant messages to
//! whatever transcript the embedding application provides. Appends are
//! fire-and-forget: the engine consumes no return value for control flow.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.1.0: Added MpscTranscript default implementation
//! - 1.0.0: Initial trait definition

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Attribution of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
    System,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
            Sender::System => "system",
        }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub sender: Sender,
}

/// External transcript collaborator
#[async_trait]
pub trait Transcript: Send + Sync {
    /// Append one message to the conversation. Must not fail from the
    /// engine's point of view; implementations swallow and log transport
    /// errors themselves.
    async fn append(&self, content: &str, sender: Sender);
}

/// Transcript implementation that forwards messages over an unbounded
/// channel, for hosts that consume engine output from an event loop.
#[derive(Clone)]
pub struct MpscTranscript {
    sender: mpsc::UnboundedSender<ChatMessage>,
}

impl MpscTranscript {
    /// Create a transcript plus the receiving end the host drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (MpscTranscript { sender }, receiver)
    }
}

#[async_trait]
impl Transcript for MpscTranscript {
    async fn append(&self, content: &str, sender: Sender) {
        let message = ChatMessage {
            content: content.to_string(),
            sender,
        };

        if let Err(e) = self.sender.send(message) {
            warn!("Transcript receiver dropped, discarding message: {e}");
        }
    }
}
