//! Sliding-window request counters, one set per credential (§4.2 step 6).
//!
//! Grounded on the fixed-window-with-rollover shape used by rate limiters in
//! the wider Rust ecosystem: each window tracks a start instant and a count,
//! and resets once the window has elapsed. Three resolutions run
//! independently per credential so a burst that clears the 1-minute window
//! still trips the 1-hour or 1-day one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitWindow {
    Minute,
    Hour,
    Day,
}

impl RateLimitWindow {
    fn duration(self) -> Duration {
        match self {
            RateLimitWindow::Minute => Duration::from_secs(60),
            RateLimitWindow::Hour => Duration::from_secs(60 * 60),
            RateLimitWindow::Day => Duration::from_secs(60 * 60 * 24),
        }
    }
}

/// Deserialized from `credential_limits.rate_limits` (free-form JSON). Any
/// field left `None` means that resolution is unbounded for the credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: Option<u32>,
    pub requests_per_hour: Option<u32>,
    pub requests_per_day: Option<u32>,
    pub tokens_per_minute: Option<u64>,
    pub tokens_per_hour: Option<u64>,
    pub tokens_per_day: Option<u64>,
}

struct Window {
    started_at: Instant,
    requests: u32,
    tokens: u64,
}

impl Window {
    fn fresh(now: Instant) -> Self {
        Self {
            started_at: now,
            requests: 0,
            tokens: 0,
        }
    }
}

#[derive(Default)]
struct CredentialCounters {
    minute: Option<Window>,
    hour: Option<Window>,
    day: Option<Window>,
}

impl CredentialCounters {
    fn window_mut(&mut self, which: RateLimitWindow) -> &mut Option<Window> {
        match which {
            RateLimitWindow::Minute => &mut self.minute,
            RateLimitWindow::Hour => &mut self.hour,
            RateLimitWindow::Day => &mut self.day,
        }
    }
}

/// In-process, per-instance rate limiter. Not shared across gateway
/// replicas; acceptable for this crate the same way upstream credential
/// cooldowns (`CredentialPool`) are instance-local.
pub struct RateLimiter {
    state: Arc<RwLock<HashMap<i64, CredentialCounters>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Checks every configured resolution against its limit, then records one
    /// request against each. Returns `Err(retry_after_secs)` on the first
    /// resolution that would be exceeded, recording nothing in that case.
    pub async fn check_and_record_request(
        &self,
        credential_id: i64,
        cfg: &RateLimitConfig,
    ) -> Result<(), u64> {
        let now = Instant::now();
        let mut guard = self.state.write().await;
        let counters = guard.entry(credential_id).or_default();

        for (which, limit) in [
            (RateLimitWindow::Minute, cfg.requests_per_minute),
            (RateLimitWindow::Hour, cfg.requests_per_hour),
            (RateLimitWindow::Day, cfg.requests_per_day),
        ] {
            let Some(limit) = limit else { continue };
            let window = counters.window_mut(which);
            let retry_after = roll_window(window, which, now).and_then(|w| {
                if w.requests >= limit {
                    Some(retry_after_secs(w, which, now))
                } else {
                    None
                }
            });
            if let Some(retry_after) = retry_after {
                return Err(retry_after);
            }
        }

        for which in [
            RateLimitWindow::Minute,
            RateLimitWindow::Hour,
            RateLimitWindow::Day,
        ] {
            let window = counters.window_mut(which);
            roll_window(window, which, now).map(|w| w.requests += 1);
        }
        Ok(())
    }

    /// Adds metered token usage to each window after the fact, since token
    /// counts aren't known until the upstream response lands. Best-effort:
    /// a request already in flight when a window rolls isn't retroactively
    /// blocked, only counted toward whichever window is current on return.
    pub async fn record_tokens(&self, credential_id: i64, tokens: u64) {
        let now = Instant::now();
        let mut guard = self.state.write().await;
        let counters = guard.entry(credential_id).or_default();
        for which in [
            RateLimitWindow::Minute,
            RateLimitWindow::Hour,
            RateLimitWindow::Day,
        ] {
            let window = counters.window_mut(which);
            roll_window(window, which, now).map(|w| w.tokens += tokens);
        }
    }

    pub async fn requests_in_window(&self, credential_id: i64, which: RateLimitWindow) -> u32 {
        let now = Instant::now();
        let mut guard = self.state.write().await;
        let counters = guard.entry(credential_id).or_default();
        let window = counters.window_mut(which);
        roll_window(window, which, now).map(|w| w.requests).unwrap_or(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn roll_window(slot: &mut Option<Window>, which: RateLimitWindow, now: Instant) -> Option<&mut Window> {
    let needs_reset = match slot {
        Some(w) => now.saturating_duration_since(w.started_at) >= which.duration(),
        None => true,
    };
    if needs_reset {
        *slot = Some(Window::fresh(now));
    }
    slot.as_mut()
}

fn retry_after_secs(window: &Window, which: RateLimitWindow, now: Instant) -> u64 {
    let elapsed = now.saturating_duration_since(window.started_at);
    which.duration().saturating_sub(elapsed).as_secs().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_requests_under_the_limit() {
        let limiter = RateLimiter::new();
        let cfg = RateLimitConfig {
            requests_per_minute: Some(2),
            ..Default::default()
        };
        assert!(limiter.check_and_record_request(1, &cfg).await.is_ok());
        assert!(limiter.check_and_record_request(1, &cfg).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_once_the_window_limit_is_hit() {
        let limiter = RateLimiter::new();
        let cfg = RateLimitConfig {
            requests_per_minute: Some(1),
            ..Default::default()
        };
        assert!(limiter.check_and_record_request(1, &cfg).await.is_ok());
        assert!(limiter.check_and_record_request(1, &cfg).await.is_err());
    }

    #[tokio::test]
    async fn unconfigured_resolutions_never_limit() {
        let limiter = RateLimiter::new();
        let cfg = RateLimitConfig::default();
        for _ in 0..10 {
            assert!(limiter.check_and_record_request(7, &cfg).await.is_ok());
        }
    }
}
