//! Long-press to delete.

use std::time::{Duration, Instant};

pub const LONG_PRESS: Duration = Duration::from_millis(800);

/// Press-and-hold detector. The caller feeds it press/release events and
/// polls it from its timer; it fires at most once per press.
#[derive(Debug)]
pub struct LongPress {
    threshold: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new(LONG_PRESS)
    }
}

impl LongPress {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pending: None,
        }
    }

    /// Start timing a press on the photo identified by `target`. A press
    /// already in progress is replaced.
    pub fn press(&mut self, target: impl Into<String>, now: Instant) {
        self.pending = Some((target.into(), now));
    }

    /// Release or pointer-leave. Cancels immediately.
    pub fn release(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the target once the threshold has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, at)) if now.saturating_duration_since(*at) >= self.threshold);
        if due {
            self.pending.take().map(|(target, _)| target)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_threshold_once() {
        let t0 = Instant::now();
        let mut lp = LongPress::default();
        lp.press("images/a.jpg", t0);
        assert_eq!(lp.poll(t0 + Duration::from_millis(799)), None);
        assert_eq!(lp.poll(t0 + LONG_PRESS).as_deref(), Some("images/a.jpg"));
        assert_eq!(lp.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn release_cancels() {
        let t0 = Instant::now();
        let mut lp = LongPress::default();
        lp.press("a", t0);
        lp.release();
        assert!(!lp.is_pending());
        assert_eq!(lp.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn new_press_restarts_timer() {
        let t0 = Instant::now();
        let mut lp = LongPress::new(Duration::from_millis(100));
        lp.press("a", t0);
        lp.press("b", t0 + Duration::from_millis(90));
        assert_eq!(lp.poll(t0 + Duration::from_millis(150)), None);
        assert_eq!(lp.poll(t0 + Duration::from_millis(190)).as_deref(), Some("b"));
    }
}
