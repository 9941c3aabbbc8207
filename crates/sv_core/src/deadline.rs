// crates/sv_core/src/deadline.rs
//
// Monotonic time budgets for the bounded searches. Expiry is the only
// cancellation signal; an expired search returns its best result so far.

use std::time::{Duration, Instant};

/// A deadline expressed as elapsed-time-since-start.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    /// Deadline `limit` from now.
    #[inline]
    pub fn after(limit: Duration) -> Self {
        Self { start: Instant::now(), limit }
    }

    #[inline]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before expiry (zero once expired).
    #[inline]
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.limit
    }

    /// A fresh deadline starting now, worth `fraction` of what remains here.
    pub fn share(&self, fraction: f64) -> Deadline {
        Deadline::after(scale(self.remaining(), fraction))
    }

    /// A fresh deadline starting now, worth `fraction / parts` of what remains.
    /// `parts == 0` is treated as one part.
    pub fn share_among(&self, fraction: f64, parts: usize) -> Deadline {
        let whole = scale(self.remaining(), fraction);
        let parts = u32::try_from(parts.max(1)).unwrap_or(u32::MAX);
        Deadline::after(whole / parts)
    }
}

fn scale(d: Duration, fraction: f64) -> Duration {
    if fraction.is_nan() || fraction <= 0.0 {
        return Duration::ZERO;
    }
    d.mul_f64(fraction.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_expired_immediately() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.expired());
        assert_eq!(d.remaining(), Duration::ZERO);
    }

    #[test]
    fn generous_budget_is_not_expired() {
        let d = Deadline::after(Duration::from_secs(3600));
        assert!(!d.expired());
        assert!(d.remaining() > Duration::from_secs(3500));
    }

    #[test]
    fn shares_never_exceed_remaining() {
        let d = Deadline::after(Duration::from_secs(100));
        assert!(d.share(0.5).limit() <= Duration::from_secs(50));
        assert!(d.share(7.0).limit() <= Duration::from_secs(100));
        assert_eq!(d.share(-1.0).limit(), Duration::ZERO);
        assert!(d.share_among(0.66, 4).limit() <= Duration::from_millis(16_500));
        assert!(d.share_among(1.0, 0).limit() <= Duration::from_secs(100));
    }
}
