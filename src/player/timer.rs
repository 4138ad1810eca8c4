use std::time::{Duration, Instant};

/// A single owned, cancellable one-shot timer.
///
/// The host loop passes `now` explicitly; nothing fires on its own. Arming an
/// already armed deadline replaces it, so at most one expiry is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub(crate) fn arm(&mut self, now: Instant, delay: Duration) {
        self.at = Some(now + delay);
    }

    /// Returns whether a pending expiry was dropped.
    pub(crate) fn cancel(&mut self) -> bool {
        self.at.take().is_some()
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self, now: Instant) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(now))
    }

    /// Disarms and reports `true` exactly once when the deadline has passed.
    pub(crate) fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if at <= now => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(500));

        assert!(!deadline.fire_if_due(start + Duration::from_millis(499)));
        assert!(deadline.fire_if_due(start + Duration::from_millis(500)));
        assert!(!deadline.fire_if_due(start + Duration::from_millis(900)));
        assert!(!deadline.is_armed());
    }

    #[test]
    fn rearming_replaces_pending_expiry() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(100));
        deadline.arm(start + Duration::from_millis(80), Duration::from_millis(100));

        assert!(!deadline.fire_if_due(start + Duration::from_millis(120)));
        assert_eq!(
            deadline.remaining(start + Duration::from_millis(120)),
            Some(Duration::from_millis(60))
        );
        assert!(deadline.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn cancel_prevents_expiry() {
        let start = Instant::now();
        let mut deadline = Deadline::default();
        deadline.arm(start, Duration::from_millis(10));

        assert!(deadline.cancel());
        assert!(!deadline.cancel());
        assert!(!deadline.fire_if_due(start + Duration::from_secs(1)));
    }
}
