//! Per-user rate limiting for AI analysis requests.
//!
//! Each user gets a trailing window of request timestamps; expired entries are
//! pruned lazily on every check. The check and the record of a new request form
//! a single atomic unit per user, so two concurrent requests can never both
//! succeed when only one slot remains.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::config::LimitsConfig;
use crate::types::UserId;

/// Tracks per-user analysis request counts in a trailing time window.
///
/// State is process-local and injectable: callers hold it behind an `Arc` so it
/// could be swapped for a distributed store without touching call sites.
#[derive(Debug)]
pub struct AnalysisRateLimiter {
    /// Maximum requests per user within the window
    max_requests: usize,
    /// Trailing window length
    window: Duration,
    /// Request timestamps per user, pruned lazily on each check
    windows: DashMap<UserId, Vec<DateTime<Utc>>>,
}

impl AnalysisRateLimiter {
    /// Creates a new rate limiter from configuration.
    pub fn new(config: &LimitsConfig) -> Self {
        Self {
            max_requests: config.analyses_per_window,
            window: Duration::seconds(config.window_secs as i64),
            windows: DashMap::new(),
        }
    }

    /// The configured per-window ceiling.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Checks whether the user has quota left and, if so, records the request.
    ///
    /// Returns `true` and consumes one slot when the user is under the ceiling,
    /// `false` without recording anything otherwise. Never fails; surfacing a
    /// rate-limit error to the client is the caller's job.
    pub fn can_analyze(&self, user_id: UserId) -> bool {
        self.can_analyze_at(user_id, Utc::now())
    }

    /// Clock-injected variant of [`can_analyze`](Self::can_analyze).
    ///
    /// The DashMap entry guard is held for the whole prune/check/record
    /// sequence, which makes it atomic per user.
    pub fn can_analyze_at(&self, user_id: UserId, now: DateTime<Utc>) -> bool {
        let mut entry = self.windows.entry(user_id).or_default();
        entry.retain(|requested_at| now - *requested_at < self.window);

        if entry.len() < self.max_requests {
            entry.push(now);
            true
        } else {
            false
        }
    }

    /// Number of requests currently recorded for a user (expired entries included
    /// until the next check prunes them). Used by tests to assert that failed
    /// preconditions never consume quota.
    pub fn recorded_requests(&self, user_id: UserId) -> usize {
        self.windows.get(&user_id).map(|entry| entry.len()).unwrap_or(0)
    }
}
