use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rokobot_core::{
    ChatMessage, ChatSession, ChatStore, Config, EventBus, ExchangeOutcome, HttpTransport,
    Listener, Notifier, Toast, Tweet, TweetService, RESPONSE_ENDED, RESPONSE_STARTED,
};
use serde_json::Value;
use tokio::task::JoinHandle;

/// How long a toast stays in the footer.
const TOAST_TTL: Duration = Duration::from_secs(4);
/// How long the virtual keyboard keeps a key lit.
const KEY_GLOW: Duration = Duration::from_millis(150);
/// Samples kept for each system panel chart.
pub const SAMPLE_WINDOW: usize = 48;

/// Collects toasts raised from session tasks until the UI shows them.
#[derive(Default)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<Toast>>,
}

impl ToastQueue {
    pub fn pop(&self) -> Option<Toast> {
        self.pending.lock().pop_front()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        self.pending.lock().push_back(toast);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TweetPanel {
    Disabled,
    Loading,
    Loaded(Vec<Tweet>),
    Failed(String),
}

/// Eye state driven purely by the bus, like the snake model's blink.
struct Blink {
    active: Arc<AtomicBool>,
    on_start: Listener,
    on_end: Listener,
}

impl Blink {
    fn subscribe(bus: &EventBus) -> Self {
        let active = Arc::new(AtomicBool::new(false));

        let flag = active.clone();
        let on_start: Listener = Arc::new(move |_: &[Value]| flag.store(true, Ordering::Relaxed));
        let flag = active.clone();
        let on_end: Listener = Arc::new(move |_: &[Value]| flag.store(false, Ordering::Relaxed));

        bus.on(RESPONSE_STARTED, on_start.clone());
        bus.on(RESPONSE_ENDED, on_end.clone());

        Self { active, on_start, on_end }
    }

    fn unsubscribe(&self, bus: &EventBus) {
        bus.off(RESPONSE_STARTED, &self.on_start);
        bus.off(RESPONSE_ENDED, &self.on_end);
    }
}

pub struct App {
    pub should_quit: bool,

    // Conversation
    pub store: Arc<ChatStore>,
    session: Arc<ChatSession>,
    bus: Arc<EventBus>,
    exchange: Option<JoinHandle<ExchangeOutcome>>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub active_key: Option<(&'static str, Instant)>,

    // Chat viewport
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,

    // Cosmetics
    blink: Blink,
    pub eye_open: bool,
    pub animation_frame: u8,
    pub started_at: Instant,
    pub cpu_usage: VecDeque<u64>,
    pub system_load: VecDeque<u64>,

    // Notifications
    toasts: Arc<ToastQueue>,
    pub toast: Option<(Toast, Instant)>,

    // Audio folder
    pub tweets: TweetPanel,
    pub visible_tweets: usize,
    tweets_task: Option<JoinHandle<anyhow::Result<Vec<Tweet>>>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let transport = Arc::new(HttpTransport::new(&config.endpoint));
        Self::with_session(config, transport)
    }

    /// Build the app around any transport; the bus, store and notifier are
    /// created here and shared with the session.
    pub fn with_session(config: &Config, transport: Arc<dyn rokobot_core::ChatTransport>) -> Self {
        let store = Arc::new(ChatStore::new());
        let bus = Arc::new(EventBus::new());
        let toasts = Arc::new(ToastQueue::default());
        let session = Arc::new(
            ChatSession::new(store.clone(), bus.clone(), transport, toasts.clone())
                .with_pacing(config.pacing()),
        );
        let blink = Blink::subscribe(&bus);

        let (tweets, tweets_task) = match (&config.api_url, &config.api_key) {
            (Some(url), key) => {
                let service = TweetService::new(url, key.as_deref().unwrap_or_default());
                let task = tokio::spawn(async move { service.audio_tweets().await });
                (TweetPanel::Loading, Some(task))
            }
            (None, _) => (TweetPanel::Disabled, None),
        };

        Self {
            should_quit: false,
            store,
            session,
            bus,
            exchange: None,
            input: String::new(),
            cursor: 0,
            active_key: None,
            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            blink,
            eye_open: true,
            animation_frame: 0,
            started_at: Instant::now(),
            cpu_usage: VecDeque::with_capacity(SAMPLE_WINDOW),
            system_load: VecDeque::with_capacity(SAMPLE_WINDOW),
            toasts,
            toast: None,
            tweets,
            visible_tweets: 0,
            tweets_task,
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.store.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.active.load(Ordering::Relaxed)
    }

    /// Send the input line. Blank input and submissions during a reply are
    /// ignored; the text stays put in the latter case.
    pub fn submit(&mut self) {
        let content = self.input.trim().to_string();
        if content.is_empty() || self.is_loading() || self.exchange.is_some() {
            return;
        }

        self.input.clear();
        self.cursor = 0;
        self.follow_tail = true;

        let session = self.session.clone();
        self.exchange = Some(tokio::spawn(async move { session.add_message(&content).await }));
    }

    pub fn press_key(&mut self, key: &'static str) {
        self.active_key = Some((key, Instant::now()));
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some((toast, Instant::now()));
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Advance animations and collect finished background work.
    pub async fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;

        // Blink roughly three times a second while a reply is on its way.
        if self.is_blinking() {
            if self.animation_frame == 0 {
                self.eye_open = !self.eye_open;
            }
        } else {
            self.eye_open = true;
        }

        // The charts are decorative; they show noise, not real load.
        push_sample(&mut self.cpu_usage, 20 + rand::random::<u64>() % 70);
        push_sample(&mut self.system_load, 10 + rand::random::<u64>() % 50);

        if self.active_key.is_some_and(|(_, at)| at.elapsed() >= KEY_GLOW) {
            self.active_key = None;
        }

        if self.toast.as_ref().is_some_and(|(_, at)| at.elapsed() >= TOAST_TTL) {
            self.toast = None;
        }
        if let Some(toast) = self.toasts.pop() {
            self.show_toast(toast);
        }

        if let TweetPanel::Loaded(tweets) = &self.tweets {
            if self.visible_tweets < tweets.len() {
                self.visible_tweets += 1;
            }
        }

        self.poll_tasks().await;
    }

    async fn poll_tasks(&mut self) {
        if self.exchange.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = self.exchange.take() {
                match handle.await {
                    Ok(outcome) => tracing::debug!(?outcome, "exchange finished"),
                    Err(e) => tracing::error!(error = %e, "exchange task died"),
                }
            }
        }

        if self.tweets_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = self.tweets_task.take() {
                let panel = match handle.await {
                    Ok(Ok(tweets)) => {
                        self.show_toast(Toast::info(format!(
                            "Audio folder synced: {} files",
                            tweets.len()
                        )));
                        TweetPanel::Loaded(tweets)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "tweet feed unavailable");
                        TweetPanel::Failed("Failed to fetch tweets".to_string())
                    }
                    Err(e) => TweetPanel::Failed(e.to_string()),
                };
                self.tweets = panel;
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Uptime as `H:MM:SS`.
    pub fn uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }

    /// Drop bus subscriptions and stop any in-flight reply.
    pub fn shutdown(&mut self) {
        self.blink.unsubscribe(&self.bus);
        if let Some(handle) = self.exchange.take() {
            handle.abort();
        }
        if let Some(handle) = self.tweets_task.take() {
            handle.abort();
        }
    }
}

fn push_sample(samples: &mut VecDeque<u64>, value: u64) {
    if samples.len() == SAMPLE_WINDOW {
        samples.pop_front();
    }
    samples.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::stream::{self, StreamExt};
    use rokobot_core::{ChatError, ChatResponse, ChatTransport, StatusCode, ToastKind};

    /// Replies with the given status and `data:` lines.
    struct ScriptedTransport {
        status: StatusCode,
        lines: Vec<&'static str>,
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, _messages: &[ChatMessage]) -> Result<ChatResponse, ChatError> {
            let chunks: Vec<Result<Vec<u8>, ChatError>> = self
                .lines
                .iter()
                .map(|line| Ok(format!("data: {line}\n").into_bytes()))
                .collect();
            Ok(ChatResponse {
                status: self.status,
                body: stream::iter(chunks).boxed(),
            })
        }
    }

    fn config() -> Config {
        Config {
            pacing_ms: 0,
            ..Config::new()
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            app.tick().await;
            if app.exchange.is_none() && !app.is_loading() {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_submit_streams_reply_into_store() {
        let transport = Arc::new(ScriptedTransport {
            status: StatusCode::OK,
            lines: vec![r#"{"content":"Your choice"}"#, r#"{"content":" has been recorded."}"#],
        });
        let mut app = App::with_session(&config(), transport);
        app.input = "  hello  ".to_string();
        app.cursor = 9;

        app.submit();
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);

        settle(&mut app).await;
        let messages = app.messages();
        assert_eq!(messages[messages.len() - 2], ChatMessage::user("hello"));
        assert_eq!(
            messages[messages.len() - 1],
            ChatMessage::assistant("Your choice has been recorded.")
        );
        assert!(!app.is_blinking());
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn test_blank_submit_does_nothing() {
        let transport = Arc::new(ScriptedTransport { status: StatusCode::OK, lines: Vec::new() });
        let mut app = App::with_session(&config(), transport);
        app.input = "   ".to_string();

        app.submit();
        assert!(app.exchange.is_none());
        assert_eq!(app.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_exchange_shows_error_toast() {
        let transport = Arc::new(ScriptedTransport {
            status: StatusCode::SERVICE_UNAVAILABLE,
            lines: Vec::new(),
        });
        let mut app = App::with_session(&config(), transport);
        app.input = "hello".to_string();

        app.submit();
        settle(&mut app).await;

        let (toast, _) = app.toast.clone().expect("toast shown");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(app.messages().last(), Some(&ChatMessage::user("hello")));
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes_blink() {
        let transport = Arc::new(ScriptedTransport { status: StatusCode::OK, lines: Vec::new() });
        let mut app = App::with_session(&config(), transport);
        assert_eq!(app.bus.listener_count(RESPONSE_STARTED), 1);

        app.shutdown();
        assert_eq!(app.bus.listener_count(RESPONSE_STARTED), 0);
        assert_eq!(app.bus.listener_count(RESPONSE_ENDED), 0);
    }

    #[tokio::test]
    async fn test_uptime_format() {
        let transport = Arc::new(ScriptedTransport { status: StatusCode::OK, lines: Vec::new() });
        let app = App::with_session(&config(), transport);
        assert_eq!(app.uptime(), "0:00:00");
    }

    #[tokio::test]
    async fn test_tick_keeps_chart_samples_bounded() {
        let transport = Arc::new(ScriptedTransport { status: StatusCode::OK, lines: Vec::new() });
        let mut app = App::with_session(&config(), transport);

        for _ in 0..SAMPLE_WINDOW + 10 {
            app.tick().await;
        }

        assert_eq!(app.cpu_usage.len(), SAMPLE_WINDOW);
        assert_eq!(app.system_load.len(), SAMPLE_WINDOW);
        assert!(app.cpu_usage.iter().all(|v| (20..90).contains(v)));
        assert!(app.system_load.iter().all(|v| (10..60).contains(v)));
    }

    #[tokio::test]
    async fn test_loaded_feed_fills_audio_folder() {
        let transport = Arc::new(ScriptedTransport { status: StatusCode::OK, lines: Vec::new() });
        let mut app = App::with_session(&config(), transport);
        let tweet = Tweet {
            media_url: "https://cdn.example/a.mp3".to_string(),
            media_id: "42".to_string(),
            content: "listen".to_string(),
        };
        let feed = vec![tweet.clone(), tweet];
        app.tweets = TweetPanel::Loading;
        app.tweets_task = Some(tokio::spawn(async move { Ok(feed) }));

        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            app.tick().await;
            if app.visible_tweets == 2 {
                break;
            }
        }

        assert!(matches!(&app.tweets, TweetPanel::Loaded(t) if t.len() == 2));
        assert_eq!(app.visible_tweets, 2);
        let (toast, _) = app.toast.clone().expect("toast shown");
        assert_eq!(toast.kind, ToastKind::Info);
    }
}
