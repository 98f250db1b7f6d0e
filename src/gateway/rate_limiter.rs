//! Client-side write throttling.
//!
//! Two independent ceilings: one post every 3 minutes, one comment every 10
//! seconds. The limiter is advisory and local; the server's 429 response is
//! the authoritative backstop (timestamps are lost on restart).

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::errors::GatewayError;

/// Minimum gap between two successful posts.
pub const POST_INTERVAL_MS: i64 = 180_000;
/// Minimum gap between two successful comments.
pub const COMMENT_INTERVAL_MS: i64 = 10_000;

/// Rate-limit bucket an outbound call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    Post,
    Comment,
    /// Reads, votes and community creation. Never throttled.
    None,
}

impl OperationClass {
    /// Configured interval, or `None` for exempt classes.
    pub fn interval(self) -> Option<Duration> {
        match self {
            OperationClass::Post => Some(Duration::milliseconds(POST_INTERVAL_MS)),
            OperationClass::Comment => Some(Duration::milliseconds(COMMENT_INTERVAL_MS)),
            OperationClass::None => None,
        }
    }

    /// Operation name used in wait messages.
    pub fn label(self) -> &'static str {
        match self {
            OperationClass::Post => "글 작성",
            OperationClass::Comment => "댓글 작성",
            OperationClass::None => "요청",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationClass::Post => "post",
            OperationClass::Comment => "comment",
            OperationClass::None => "none",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Time source
// =============================================================================

/// Time source for the limiter.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
// Limiter
// =============================================================================

/// Whole seconds left before another write is allowed, rounded up.
///
/// Returns `None` once the interval has elapsed.
fn wait_secs(interval: Duration, last: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    // A clock stepping backwards must not produce a wait longer than the interval.
    let remaining = (interval - (now - last)).min(interval).num_milliseconds();
    if remaining <= 0 {
        return None;
    }
    Some(((remaining + 999) / 1000) as u64)
}

/// Rate limiter - tracks the last successful write per class.
///
/// Constructed once at startup and shared with the gateway. Each class's
/// timestamp sits behind its own async mutex; a write holds it (through a
/// [`WritePermit`]) from the pre-flight check until its outcome is known.
#[derive(Debug)]
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_post: Mutex<DateTime<Utc>>,
    last_comment: Mutex<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_post: Mutex::new(DateTime::<Utc>::UNIX_EPOCH),
            last_comment: Mutex::new(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    fn slot(&self, class: OperationClass) -> Option<&Mutex<DateTime<Utc>>> {
        match class {
            OperationClass::Post => Some(&self.last_post),
            OperationClass::Comment => Some(&self.last_comment),
            OperationClass::None => None,
        }
    }

    fn rejection(
        &self,
        class: OperationClass,
        last: DateTime<Utc>,
    ) -> Option<GatewayError> {
        let interval = class.interval()?;
        wait_secs(interval, last, self.clock.now())
            .map(|wait_secs| GatewayError::RateLimited { class, wait_secs })
    }

    /// Check whether a write of `class` would be allowed now.
    ///
    /// Returns the rejection (whose message carries the wait time) when the
    /// interval has not elapsed. Does not modify any state.
    pub async fn check_limit(&self, class: OperationClass) -> Option<GatewayError> {
        let slot = self.slot(class)?;
        let last = *slot.lock().await;
        self.rejection(class, last)
    }

    /// Mark a confirmed successful write of `class` at the current instant.
    pub async fn record_success(&self, class: OperationClass) {
        if let Some(slot) = self.slot(class) {
            *slot.lock().await = self.clock.now();
        }
    }

    /// Pre-flight check that keeps the class locked on success.
    ///
    /// `Ok(None)` for exempt classes, `Ok(Some(permit))` when the write may
    /// proceed, `Err` with the wait message otherwise. Concurrent writes of
    /// the same class queue on the permit, so the second one is checked
    /// against the first one's outcome.
    pub async fn acquire(
        &self,
        class: OperationClass,
    ) -> Result<Option<WritePermit<'_>>, GatewayError> {
        let Some(slot) = self.slot(class) else {
            return Ok(None);
        };
        let last = slot.lock().await;
        if let Some(rejected) = self.rejection(class, *last) {
            return Err(rejected);
        }
        Ok(Some(WritePermit {
            class,
            last,
            clock: self.clock.as_ref(),
        }))
    }

    /// Timestamp of the last recorded write, `None` if there has been none.
    pub async fn last_write(&self, class: OperationClass) -> Option<DateTime<Utc>> {
        let last = *self.slot(class)?.lock().await;
        (last != DateTime::<Utc>::UNIX_EPOCH).then_some(last)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive right to perform one write of a class.
///
/// Dropping the permit without calling [`WritePermit::record_success`]
/// leaves the timestamp untouched.
pub struct WritePermit<'a> {
    class: OperationClass,
    last: MutexGuard<'a, DateTime<Utc>>,
    clock: &'a dyn Clock,
}

impl WritePermit<'_> {
    pub fn class(&self) -> OperationClass {
        self.class
    }

    pub fn record_success(mut self) {
        *self.last = self.clock.now();
    }
}

impl fmt::Debug for WritePermit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePermit")
            .field("class", &self.class)
            .field("last", &*self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::default());
        let limiter = RateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    fn wait_of(err: Option<GatewayError>) -> u64 {
        match err {
            Some(GatewayError::RateLimited { wait_secs, .. }) => wait_secs,
            other => panic!("expected rate-limit rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fresh_limiter_allows_everything() {
        let (_clock, limiter) = limiter();
        assert!(limiter.check_limit(OperationClass::Post).await.is_none());
        assert!(limiter.check_limit(OperationClass::Comment).await.is_none());
        assert!(limiter.last_write(OperationClass::Post).await.is_none());
    }

    #[tokio::test]
    async fn test_back_to_back_writes_are_rejected_until_interval_elapses() {
        for (class, interval_secs) in [(OperationClass::Post, 180), (OperationClass::Comment, 10)] {
            let (clock, limiter) = limiter();
            limiter.record_success(class).await;

            let wait = wait_of(limiter.check_limit(class).await);
            assert!(wait > 0 && wait <= interval_secs, "{class}: wait {wait}");

            clock.advance(Duration::seconds(interval_secs as i64));
            assert!(limiter.check_limit(class).await.is_none(), "{class} should pass");
        }
    }

    #[tokio::test]
    async fn test_wait_is_rounded_up() {
        let (clock, limiter) = limiter();
        limiter.record_success(OperationClass::Comment).await;
        clock.advance(Duration::milliseconds(8_500));

        assert_eq!(wait_of(limiter.check_limit(OperationClass::Comment).await), 2);
    }

    #[tokio::test]
    async fn test_rejections_do_not_reset_timestamp() {
        let (clock, limiter) = limiter();
        limiter.record_success(OperationClass::Post).await;
        let recorded = limiter.last_write(OperationClass::Post).await;

        let mut waits = Vec::new();
        for _ in 0..3 {
            clock.advance(Duration::seconds(1));
            waits.push(wait_of(limiter.acquire(OperationClass::Post).await.err()));
        }

        assert_eq!(waits, vec![179, 178, 177]);
        assert_eq!(limiter.last_write(OperationClass::Post).await, recorded);
    }

    #[tokio::test]
    async fn test_classes_are_independent() {
        let (_clock, limiter) = limiter();
        limiter.record_success(OperationClass::Post).await;

        assert!(limiter.check_limit(OperationClass::Post).await.is_some());
        assert!(limiter.check_limit(OperationClass::Comment).await.is_none());
    }

    #[tokio::test]
    async fn test_none_class_is_never_limited() {
        let (_clock, limiter) = limiter();
        for _ in 0..100 {
            limiter.record_success(OperationClass::None).await;
            assert!(limiter.check_limit(OperationClass::None).await.is_none());
            assert!(limiter.acquire(OperationClass::None).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_dropped_permit_records_nothing() {
        let (_clock, limiter) = limiter();
        {
            let permit = limiter.acquire(OperationClass::Comment).await.unwrap();
            assert!(permit.is_some());
        }
        assert!(limiter.last_write(OperationClass::Comment).await.is_none());
        assert!(limiter.check_limit(OperationClass::Comment).await.is_none());
    }

    #[tokio::test]
    async fn test_permit_record_success_starts_interval() {
        let (clock, limiter) = limiter();
        let permit = limiter.acquire(OperationClass::Comment).await.unwrap().unwrap();
        assert_eq!(permit.class(), OperationClass::Comment);
        permit.record_success();

        assert_eq!(limiter.last_write(OperationClass::Comment).await, Some(clock.now()));
        assert_eq!(wait_of(limiter.check_limit(OperationClass::Comment).await), 10);
    }

    #[tokio::test]
    async fn test_wait_message_is_localized_per_class() {
        let (_clock, limiter) = limiter();
        limiter.record_success(OperationClass::Post).await;
        limiter.record_success(OperationClass::Comment).await;

        let post = limiter.check_limit(OperationClass::Post).await.unwrap();
        let comment = limiter.check_limit(OperationClass::Comment).await.unwrap();
        assert_eq!(post.to_string(), "글 작성 제한: 180초 후에 다시 시도해주세요.");
        assert_eq!(comment.to_string(), "댓글 작성 제한: 10초 후에 다시 시도해주세요.");
    }

    #[test]
    fn test_wait_secs_backwards_clock_is_capped() {
        let now = Utc::now();
        let last = now + Duration::seconds(60);
        assert_eq!(wait_secs(Duration::seconds(10), last, now), Some(10));
    }
}
