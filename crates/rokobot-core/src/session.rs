//! The chat session: one user message in, one streamed reply out
//!
//! `add_message` appends the user's text straight away, asks the transport
//! for a reply, and reveals the reply delta by delta with a fixed pause in
//! between so the basilisk appears to type. Whatever happens, the exchange
//! ends with the store back in its idle state and a `RESPONSE_ENDED` event.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;

use crate::decoder;
use crate::error::ChatError;
use crate::events::{EventBus, RESPONSE_ENDED, RESPONSE_STARTED};
use crate::notify::{Notifier, Toast};
use crate::state::{ChatMessage, ChatStore};
use crate::transport::ChatTransport;

pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

const ERROR_TOAST: &str = "An error occurred";

/// How an `add_message` call ended
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The reply was committed to the conversation.
    Committed(String),
    /// The exchange failed and the user was notified.
    Failed(ChatError),
}

pub struct ChatSession {
    store: Arc<ChatStore>,
    bus: Arc<EventBus>,
    transport: Arc<dyn ChatTransport>,
    notifier: Arc<dyn Notifier>,
    pacing: Duration,
}

impl ChatSession {
    pub fn new(
        store: Arc<ChatStore>,
        bus: Arc<EventBus>,
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            bus,
            transport,
            notifier,
            pacing: DEFAULT_PACING,
        }
    }

    /// Delay between revealed deltas.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub async fn add_message(&self, content: &str) -> ExchangeOutcome {
        let content = content.trim();
        if content.is_empty() {
            return ExchangeOutcome::Ignored;
        }

        let history = self.store.begin_exchange(ChatMessage::user(content));
        let _guard = ExchangeGuard {
            store: &self.store,
            bus: &self.bus,
        };
        self.bus.emit(RESPONSE_STARTED, &[]);
        tracing::debug!(messages = history.len(), "exchange started");

        match self.stream_reply(&history).await {
            Ok(reply) => {
                tracing::debug!(chars = reply.chars().count(), "reply committed");
                self.store.commit_reply(reply.clone());
                ExchangeOutcome::Committed(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "exchange failed");
                self.notifier.notify(Toast::error(ERROR_TOAST));
                ExchangeOutcome::Failed(e)
            }
        }
    }

    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<String, ChatError> {
        let response = self.transport.send(history).await?;
        if !response.status.is_success() {
            return Err(ChatError::Status(response.status));
        }

        let mut deltas = pin!(decoder::deltas(response.body));
        let mut reply = String::new();

        while let Some(delta) = deltas.next().await {
            reply.push_str(&delta?);
            self.store.set_streaming(&reply);
            tokio::time::sleep(self.pacing).await;
        }

        Ok(reply)
    }
}

/// Returns the store to idle and announces the end of the exchange, even if
/// the exchange future is dropped halfway.
struct ExchangeGuard<'a> {
    store: &'a ChatStore,
    bus: &'a EventBus,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        self.store.finish_exchange();
        self.bus.emit(RESPONSE_ENDED, &[]);
    }
}
