//! Rate limiting with composable sliding-window constraints
//!
//! A [`RateGate`] holds an ordered list of independent [`RateConstraint`]s and
//! admits a caller only when every constraint has room for one more request.
//! Admission is recorded against all constraints at the same instant.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Request cap: at most `max_count` requests per `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Maximum admissions inside any trailing `interval`
    pub max_count: u32,
    /// Window length
    pub interval: Duration,
}

impl RateLimit {
    /// Cap of `max_count` requests per `interval`
    pub const fn new(max_count: u32, interval: Duration) -> Self {
        Self { max_count, interval }
    }

    /// Cap of `max_count` requests per second
    pub const fn per_second(max_count: u32) -> Self {
        Self::new(max_count, Duration::from_secs(1))
    }

    /// Cap of `max_count` requests per minute
    pub const fn per_minute(max_count: u32) -> Self {
        Self::new(max_count, Duration::from_secs(60))
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per {:?}", self.max_count, self.interval)
    }
}

/// One independent admission rule of a [`RateGate`]
pub trait RateConstraint: Send + Sync + fmt::Debug {
    /// Earliest instant one more admission is allowed, `None` if allowed at `now`
    fn next_admission(&mut self, now: Instant) -> Option<Instant>;

    /// Record an admission granted at `now`
    fn record(&mut self, now: Instant);
}

/// Sliding-window counter remembering the last `max_count` admissions
#[derive(Debug)]
pub struct SlidingWindow {
    limit: RateLimit,
    admissions: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Window enforcing `limit`; a zero `max_count` is treated as one
    pub fn new(limit: RateLimit) -> Self {
        let limit = RateLimit::new(limit.max_count.max(1), limit.interval);
        Self {
            limit,
            admissions: VecDeque::with_capacity(limit.max_count as usize),
        }
    }

    /// Limit enforced by this window
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(&oldest) = self.admissions.front() {
            if now.saturating_duration_since(oldest) >= self.limit.interval {
                self.admissions.pop_front();
            } else {
                break;
            }
        }
    }
}

impl RateConstraint for SlidingWindow {
    fn next_admission(&mut self, now: Instant) -> Option<Instant> {
        self.evict_expired(now);
        if self.admissions.len() < self.limit.max_count as usize {
            return None;
        }
        // Full window: the oldest admission has to age out first
        self.admissions
            .front()
            .map(|&oldest| oldest + self.limit.interval)
    }

    fn record(&mut self, now: Instant) {
        self.admissions.push_back(now);
        while self.admissions.len() > self.limit.max_count as usize {
            self.admissions.pop_front();
        }
    }
}

/// Admission gate composed of independent rate constraints.
///
/// Callers are admitted one at a time in arrival order; a caller that has
/// to wait keeps its place until every constraint frees up.
pub struct RateGate {
    constraints: Mutex<Vec<Box<dyn RateConstraint>>>,
}

impl fmt::Debug for RateGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGate").finish_non_exhaustive()
    }
}

impl RateGate {
    /// Gate over an explicit list of constraints
    pub fn new(constraints: Vec<Box<dyn RateConstraint>>) -> Self {
        Self {
            constraints: Mutex::new(constraints),
        }
    }

    /// Gate with one sliding window per limit
    pub fn from_limits(limits: &[RateLimit]) -> Self {
        Self::new(
            limits
                .iter()
                .map(|&limit| Box::new(SlidingWindow::new(limit)) as Box<dyn RateConstraint>)
                .collect(),
        )
    }

    /// Gate that admits immediately
    pub fn unlimited() -> Self {
        Self::new(Vec::new())
    }

    /// Number of composed constraints
    pub async fn constraint_count(&self) -> usize {
        self.constraints.lock().await.len()
    }

    /// Wait until every constraint allows one more request, then record it.
    ///
    /// Never fails; the wait is bounded by the longest configured interval
    /// per caller queued ahead.
    pub async fn acquire(&self) {
        let mut constraints = self.constraints.lock().await;
        loop {
            let now = Instant::now();
            let deadline = constraints
                .iter_mut()
                .filter_map(|constraint| constraint.next_admission(now))
                .max();

            match deadline {
                None => {
                    for constraint in constraints.iter_mut() {
                        constraint.record(now);
                    }
                    return;
                }
                Some(deadline) => {
                    trace!(
                        "Rate gate full, waiting {:?}",
                        deadline.saturating_duration_since(now)
                    );
                    sleep_until(deadline).await;
                }
            }
        }
    }
}
