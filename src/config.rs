//! Server configuration and shared application state.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::ratelimit::RateLimiter;
use crate::services::{ChatQueryService, MessageService};
use crate::store::ChatStore;

/// Process-wide settings, fixed at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Rate limit window length
    pub rate_limit_window: Duration,
    /// Request cap per window per client
    pub rate_limit_max_requests: u32,
    /// Known users, seeded at process start
    pub seed_users: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            rate_limit_window: Duration::from_millis(60_000),
            rate_limit_max_requests: 100,
            seed_users: ["user1", "user2", "user3", "user4"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PORT`, `RATE_LIMIT_WINDOW_MS` and
    /// `RATE_LIMIT_MAX_REQUESTS` where set and parseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = env_parse::<u16>("PORT") {
            config.port = port;
        }
        if let Some(window_ms) = env_parse::<u64>("RATE_LIMIT_WINDOW_MS") {
            config.rate_limit_window = Duration::from_millis(window_ms);
        }
        if let Some(max) = env_parse::<u32>("RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit_max_requests = max;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChatStore>,
    pub limiter: Arc<RateLimiter>,
    pub messages: Arc<MessageService>,
    pub chats: Arc<ChatQueryService>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let store = Arc::new(ChatStore::new(config.seed_users.iter().cloned()));
        Self {
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit_window,
                config.rate_limit_max_requests,
            )),
            messages: Arc::new(MessageService::new(store.clone())),
            chats: Arc::new(ChatQueryService::new(store.clone())),
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_constants() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.rate_limit_window, Duration::from_millis(60_000));
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.seed_users.len(), 4);
    }

    #[test]
    fn state_shares_one_store() {
        let state = AppState::new(&ServerConfig::default());
        let msg = state.messages.send_message("user1", "user2", "hi").unwrap();
        // The query service sees the message through the same store.
        let summaries = state.chats.chats_for_user("user2").unwrap();
        assert_eq!(summaries[0].last_message_preview.as_deref(), Some("hi"));
        assert!(state.store.find_message(&msg.id).is_some());
    }
}
