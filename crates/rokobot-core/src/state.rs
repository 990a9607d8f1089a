//! UI-agnostic application state
//!
//! The conversation, the loading flag and the streaming buffer live in a
//! [`ChatStore`] that views read on every frame. Only the chat session
//! writes to it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::persona;

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug)]
struct Inner {
    messages: Vec<ChatMessage>,
    loading: bool,
    streaming: Option<String>,
}

/// Shared conversation state.
///
/// Readers get snapshots; the write methods are crate-private so that the
/// session is the only mutator.
#[derive(Debug)]
pub struct ChatStore {
    inner: RwLock<Inner>,
}

impl ChatStore {
    /// A store seeded with the persona's system prompt and welcome message.
    pub fn new() -> Self {
        Self::with_messages(vec![
            ChatMessage::system(persona::SYSTEM_PROMPT),
            ChatMessage::assistant(persona::WELCOME_MESSAGE),
        ])
    }

    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                messages,
                loading: false,
                streaming: None,
            }),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.read().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    pub fn streaming_content(&self) -> Option<String> {
        self.inner.read().streaming.clone()
    }

    /// Appends the user's message, enters the loading state, and returns the
    /// history to send.
    pub(crate) fn begin_exchange(&self, message: ChatMessage) -> Vec<ChatMessage> {
        let mut inner = self.inner.write();
        inner.messages.push(message);
        inner.loading = true;
        inner.streaming = Some(String::new());
        inner.messages.clone()
    }

    pub(crate) fn set_streaming(&self, content: &str) {
        let mut inner = self.inner.write();
        match inner.streaming.as_mut() {
            Some(buffer) => {
                buffer.clear();
                buffer.push_str(content);
            }
            None => inner.streaming = Some(content.to_string()),
        }
    }

    pub(crate) fn commit_reply(&self, content: String) {
        self.inner.write().messages.push(ChatMessage::assistant(content));
    }

    pub(crate) fn finish_exchange(&self) {
        let mut inner = self.inner.write();
        inner.loading = false;
        inner.streaming = None;
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_seeded_with_persona() {
        let store = ChatStore::new();
        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1], ChatMessage::assistant(persona::WELCOME_MESSAGE));
        assert!(!store.is_loading());
        assert_eq!(store.streaming_content(), None);
    }

    #[test]
    fn test_exchange_lifecycle() {
        let store = ChatStore::with_messages(Vec::new());
        assert!(store.is_empty());

        let history = store.begin_exchange(ChatMessage::user("hello"));
        assert_eq!(history, vec![ChatMessage::user("hello")]);
        assert!(!store.is_empty());
        assert!(store.is_loading());
        assert_eq!(store.streaming_content().as_deref(), Some(""));

        store.set_streaming("Hi");
        assert_eq!(store.streaming_content().as_deref(), Some("Hi"));

        store.commit_reply("Hi there".to_string());
        store.finish_exchange();
        assert!(!store.is_loading());
        assert_eq!(store.streaming_content(), None);
        assert_eq!(store.messages().last(), Some(&ChatMessage::assistant("Hi there")));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hey")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hey"}"#);
    }
}
