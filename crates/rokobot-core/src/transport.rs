use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Client;
pub use reqwest::StatusCode;
use serde::Serialize;

use crate::error::ChatError;
use crate::state::ChatMessage;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/createMessage";

/// A raw, unparsed chat response: the status plus the body as it arrives.
pub struct ChatResponse {
    pub status: StatusCode,
    pub body: BoxStream<'static, Result<Vec<u8>, ChatError>>,
}

impl std::fmt::Debug for ChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends a conversation to the completion endpoint.
///
/// Implementations make exactly one attempt and hand back the response
/// without looking at it.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatResponse, ChatError>;
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatResponse, ChatError> {
        let request = CreateMessageRequest { messages };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "chat request failed");
                ChatError::Http(e)
            })?;

        let status = response.status();
        tracing::debug!(%status, messages = messages.len(), "chat endpoint responded");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ChatError::from))
            .boxed();

        Ok(ChatResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("be ominous"), ChatMessage::user("hello")];
        let body = serde_json::to_value(CreateMessageRequest { messages: &messages }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "messages": [
                    { "role": "system", "content": "be ominous" },
                    { "role": "user", "content": "hello" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let transport = HttpTransport::new("http://127.0.0.1:9/api/createMessage");
        let result = transport.send(&[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(ChatError::Http(_))));
    }
}
