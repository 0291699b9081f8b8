//! Sliding-window rate limiter keyed by `(platform, strategy)`.
//!
//! Each key owns its own window behind its own mutex; the outer map is only
//! write-locked the first time a key is seen. `allow` never blocks on another
//! key's window and never waits for capacity: denial is an ordinary answer.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Window configuration: at most `max_calls` within any trailing `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_calls: usize) -> Self {
        Self {
            max_calls,
            window: Duration::from_secs(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(30)
    }
}

/// Recorded call timestamps for one key.
#[derive(Debug)]
struct RateWindow {
    config: RateLimitConfig,
    calls: VecDeque<Instant>,
}

impl RateWindow {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            calls: VecDeque::with_capacity(config.max_calls),
        }
    }

    /// Drop timestamps that fell out of the trailing window.
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.calls.front() {
            if now.saturating_duration_since(*oldest) >= self.config.window {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_record(&mut self, now: Instant) -> bool {
        self.prune(now);
        if self.calls.len() < self.config.max_calls {
            self.calls.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Per-key sliding-window limiter.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, Arc<Mutex<RateWindow>>>>,
    configs: HashMap<String, RateLimitConfig>,
    default_config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(default_config: RateLimitConfig) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            configs: HashMap::new(),
            default_config,
        }
    }

    /// Override the limit for one key. Only valid before the limiter is shared.
    pub fn with_limit(mut self, key: impl Into<String>, config: RateLimitConfig) -> Self {
        self.configs.insert(key.into(), config);
        self
    }

    /// Build the canonical key for a platform tier.
    pub fn key(platform: &str, strategy: &str) -> String {
        format!("{}:{}", platform, strategy)
    }

    /// Returns true and records the call iff fewer than `max_calls` calls were
    /// recorded for `key` in the trailing window.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let window = self.window_for(key);
        let mut window = lock_window(&window);
        let allowed = window.try_record(now);
        if !allowed {
            debug!("Rate limiter: denied call for '{}'", key);
        }
        allowed
    }

    /// Number of calls currently inside the trailing window for `key`.
    pub fn recorded(&self, key: &str) -> usize {
        let existing = {
            let windows = self.read_windows();
            windows.get(key).cloned()
        };
        match existing {
            Some(window) => {
                let mut window = lock_window(&window);
                window.prune(Instant::now());
                window.calls.len()
            }
            None => 0,
        }
    }

    pub fn config_for(&self, key: &str) -> RateLimitConfig {
        self.configs.get(key).copied().unwrap_or(self.default_config)
    }

    fn window_for(&self, key: &str) -> Arc<Mutex<RateWindow>> {
        if let Some(window) = self.read_windows().get(key) {
            return Arc::clone(window);
        }

        let mut windows = self.windows.write().unwrap_or_else(|poisoned| {
            warn!("Rate limiter map lock was poisoned, recovering");
            poisoned.into_inner()
        });
        Arc::clone(
            windows
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(RateWindow::new(self.config_for(key))))),
        )
    }

    fn read_windows(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Mutex<RateWindow>>>> {
        self.windows.read().unwrap_or_else(|poisoned| {
            warn!("Rate limiter map lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

fn lock_window(window: &Mutex<RateWindow>) -> MutexGuard<'_, RateWindow> {
    window.lock().unwrap_or_else(|poisoned| {
        warn!("Rate window mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_calls: usize, window_ms: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_calls,
            window: Duration::from_millis(window_ms),
        })
    }

    #[test]
    fn test_allows_up_to_max_then_denies() {
        let limiter = limiter(3, 60_000);
        let now = Instant::now();

        assert!(limiter.allow_at("espn:native_api", now));
        assert!(limiter.allow_at("espn:native_api", now));
        assert!(limiter.allow_at("espn:native_api", now));
        assert!(!limiter.allow_at("espn:native_api", now));
        assert_eq!(limiter.recorded("espn:native_api"), 3);
    }

    #[test]
    fn test_denial_has_no_side_effects() {
        let limiter = limiter(1, 60_000);
        let now = Instant::now();

        assert!(limiter.allow_at("k", now));
        for _ in 0..10 {
            assert!(!limiter.allow_at("k", now));
        }
        assert_eq!(limiter.recorded("k"), 1);
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2, 1_000);
        let start = Instant::now();

        assert!(limiter.allow_at("k", start));
        assert!(limiter.allow_at("k", start + Duration::from_millis(500)));
        assert!(!limiter.allow_at("k", start + Duration::from_millis(900)));

        // First call leaves the window at exactly start + 1s
        assert!(limiter.allow_at("k", start + Duration::from_millis(1_000)));
        assert!(!limiter.allow_at("k", start + Duration::from_millis(1_200)));
        assert!(limiter.allow_at("k", start + Duration::from_millis(1_500)));
    }

    #[test]
    fn test_old_entries_are_pruned() {
        let limiter = limiter(5, 100);
        let start = Instant::now();
        for i in 0..5 {
            assert!(limiter.allow_at("k", start + Duration::from_millis(i)));
        }

        let later = start + Duration::from_secs(10);
        assert!(limiter.allow_at("k", later));

        let window = limiter.window_for("k");
        assert_eq!(lock_window(&window).calls.len(), 1);
    }

    #[test]
    fn test_keys_are_isolated() {
        let limiter = limiter(1, 60_000);
        let now = Instant::now();

        assert!(limiter.allow_at("espn:native_api", now));
        assert!(!limiter.allow_at("espn:native_api", now));
        assert!(limiter.allow_at("sleeper:native_api", now));
    }

    #[test]
    fn test_per_key_override() {
        let limiter = limiter(1, 60_000).with_limit("espn:browser_automation", RateLimitConfig {
            max_calls: 3,
            window: Duration::from_secs(60),
        });
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.allow_at("espn:browser_automation", now));
        }
        assert!(!limiter.allow_at("espn:browser_automation", now));
        assert!(limiter.allow_at("espn:native_api", now));
        assert!(!limiter.allow_at("espn:native_api", now));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_max() {
        let limiter = Arc::new(limiter(25, 60_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..50).filter(|_| limiter.allow("shared")).count())
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 25);
        assert_eq!(limiter.recorded("shared"), 25);
    }

    #[test]
    fn test_key_format() {
        assert_eq!(RateLimiter::key("espn", "native_api"), "espn:native_api");
    }
}
