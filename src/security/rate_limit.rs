//! Fixed-window per-client rate limiting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Request count for one client within its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    pub count: u32,
    pub reset_at: Instant,
}

/// Fixed-window counter keyed by client key.
///
/// The map holds at most `max_keys` entries. When a new key arrives at
/// capacity, expired entries are dropped first; if that frees nothing, the
/// entry whose window ends soonest is evicted.
#[derive(Debug)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
    window: Duration,
    max_requests: u32,
    max_keys: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32, max_keys: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
            max_requests,
            max_keys: max_keys.max(1),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.window_ms),
            config.max_requests,
            config.max_keys,
        )
    }

    /// Record a request for `key` and report whether it is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.lock();

        if let Some(entry) = entries.get_mut(key) {
            if now < entry.reset_at {
                entry.count = entry.count.saturating_add(1);
                return entry.count <= self.max_requests;
            }
            *entry = self.fresh_entry(now);
            return true;
        }

        if entries.len() >= self.max_keys {
            entries.retain(|_, e| now < e.reset_at);
            if entries.len() >= self.max_keys {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.reset_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(key.to_string(), self.fresh_entry(now));
        metrics::record_rate_limit_keys(entries.len());
        true
    }

    /// Drop every entry whose window has ended. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now < e.reset_at);
        metrics::record_rate_limit_keys(entries.len());
        before - entries.len()
    }

    /// Current entry for `key`, if tracked.
    pub fn entry(&self, key: &str) -> Option<WindowEntry> {
        self.lock().get(key).copied()
    }

    /// Number of tracked client keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically sweep expired entries until shutdown.
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep(Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Swept expired rate limit entries");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    return;
                }
            }
        }
    }

    fn fresh_entry(&self, now: Instant) -> WindowEntry {
        WindowEntry {
            count: 1,
            reset_at: now + self.window,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, WindowEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
