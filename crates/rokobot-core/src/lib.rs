pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod notify;
pub mod persona;
pub mod session;
pub mod state;
pub mod transport;
pub mod tweets;

// Re-export main types for convenience
pub use config::Config;
pub use decoder::{deltas, DeltaDecoder};
pub use error::ChatError;
pub use events::{EventBus, Listener, RESPONSE_ENDED, RESPONSE_STARTED};
pub use notify::{Notifier, Toast, ToastKind};
pub use session::{ChatSession, ExchangeOutcome};
pub use state::{ChatMessage, ChatRole, ChatStore};
pub use transport::{ChatResponse, ChatTransport, HttpTransport, StatusCode};
pub use tweets::{Tweet, TweetService};
