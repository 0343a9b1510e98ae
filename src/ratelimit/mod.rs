//! Fixed-window request rate limiting.
//!
//! One counter per client identity; the window restarts when the
//! current one lapses. Bursting across a window boundary is a known
//! characteristic of the fixed-window scheme. Exposed both as a plain
//! `check` call and as axum middleware that stamps `X-RateLimit-*`
//! headers on every response.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use tracing::warn;

use crate::config::AppState;
use crate::error::Error;

/// Sentinel bucket for requests whose client identity cannot be
/// determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of a single rate-limit check. Produced for denied requests
/// too, since their headers still reflect the attempt.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

struct Entry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client identity.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `client_key` at `now`. The entry map is
    /// held under a single mutex so concurrent checks on the same key
    /// never lose increments.
    pub fn check(&self, client_key: &str, now: Instant) -> RateLimitDecision {
        let key = if client_key.is_empty() {
            UNKNOWN_CLIENT
        } else {
            client_key
        };

        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_insert(Entry {
            count: 0,
            reset_at: now + self.window,
        });
        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }
        entry.count += 1;

        let remaining_window = entry.reset_at.saturating_duration_since(now);
        RateLimitDecision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_secs: (remaining_window.as_millis() as u64).div_ceil(1000),
        }
    }

    /// Administrative reset of all windows.
    pub fn reset(&self) {
        self.entries.lock().clear();
    }
}

/// Middleware gating every route. Denied requests are answered with 429
/// before any handler runs; allowed ones pass through and get the same
/// header set on the way out.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    let decision = state.limiter.check(&key, Instant::now());

    if !decision.allowed {
        warn!("Rate limit exceeded for client {}", key);
        let mut response = Error::RateLimited {
            retry_after: decision.reset_secs,
        }
        .into_response();
        apply_headers(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(req).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

/// Client identity: first X-Forwarded-For hop, else the peer socket
/// address, else the sentinel bucket.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from(decision.reset_secs),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_zero_then_denies() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let d = limiter.check("10.0.0.1", now);
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }

        let denied = limiter.check("10.0.0.1", now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.reset_secs >= 1);
    }

    #[test]
    fn denied_attempts_still_count() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(limiter.check("10.0.0.1", now).allowed);
        assert!(!limiter.check("10.0.0.1", now).allowed);
        // The window keeps advancing its count; remaining stays pinned
        // at zero rather than wrapping.
        let d = limiter.check("10.0.0.1", now);
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }

    #[test]
    fn window_lapse_resets_the_count() {
        let window = Duration::from_millis(500);
        let limiter = RateLimiter::new(window, 2);
        let start = Instant::now();

        assert!(limiter.check("10.0.0.1", start).allowed);
        assert!(limiter.check("10.0.0.1", start).allowed);
        assert!(!limiter.check("10.0.0.1", start).allowed);

        let later = start + window;
        let d = limiter.check("10.0.0.1", later);
        assert!(d.allowed);
        assert_eq!(d.remaining, 1);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(limiter.check("10.0.0.1", now).allowed);
        assert!(limiter.check("10.0.0.2", now).allowed);
        assert!(!limiter.check("10.0.0.1", now).allowed);
    }

    #[test]
    fn empty_key_shares_the_sentinel_bucket() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();

        assert!(limiter.check("", now).allowed);
        assert!(limiter.check(UNKNOWN_CLIENT, now).allowed);
        assert!(!limiter.check("", now).allowed);
    }

    #[test]
    fn reset_secs_rounds_up() {
        let limiter = RateLimiter::new(Duration::from_millis(1500), 10);
        let d = limiter.check("10.0.0.1", Instant::now());
        assert_eq!(d.reset_secs, 2);
    }

    #[test]
    fn reset_clears_all_windows() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(limiter.check("10.0.0.1", now).allowed);
        assert!(!limiter.check("10.0.0.1", now).allowed);
        limiter.reset();
        assert!(limiter.check("10.0.0.1", now).allowed);
    }
}
