//! Timers driven by the UI loop.
//!
//! Nothing here sleeps or spawns: the main loop passes the current
//! [`Instant`] in on every tick, which keeps the timing rules testable
//! with synthetic clocks.

use std::time::{Duration, Instant};

/// How long the "new items" badge and transient notices stay visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Interval presets reachable with the `+` / `-` keys.
pub const INTERVAL_PRESETS: [Duration; 5] = [
    Duration::from_secs(15),
    Duration::from_secs(30),
    Duration::from_secs(60),
    Duration::from_secs(120),
    Duration::from_secs(300),
];

/// The recurring auto-refresh cadence.
///
/// Disabling, re-enabling or changing the interval drops any pending
/// tick and, when enabled, starts a fresh cadence from that moment.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    enabled: bool,
    next_due: Option<Instant>,
}

impl PollSchedule {
    pub fn new(interval: Duration, enabled: bool, now: Instant) -> Self {
        Self {
            interval,
            enabled,
            next_due: enabled.then(|| now + interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.enabled = enabled;
        self.restart(now);
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.restart(now);
    }

    /// Step to the next larger preset.  Stays put at the top.
    pub fn slower(&mut self, now: Instant) {
        if let Some(&next) = INTERVAL_PRESETS.iter().find(|&&p| p > self.interval) {
            self.set_interval(next, now);
        }
    }

    /// Step to the next smaller preset.  Stays put at the bottom.
    pub fn faster(&mut self, now: Instant) {
        if let Some(&next) = INTERVAL_PRESETS.iter().rev().find(|&&p| p < self.interval) {
            self.set_interval(next, now);
        }
    }

    /// Returns `true` once per elapsed interval and schedules the next
    /// tick one interval from `now`.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    fn restart(&mut self, now: Instant) {
        self.next_due = self.enabled.then(|| now + self.interval);
    }
}

/// A value shown for a fixed window, then hidden.
///
/// Each [`show`](Transient::show) opens a new window; nothing else
/// extends or shortens it.
#[derive(Debug, Clone)]
pub struct Transient<T> {
    shown: Option<(T, Instant)>,
    ttl: Duration,
}

impl<T> Transient<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { shown: None, ttl }
    }

    pub fn show(&mut self, value: T, now: Instant) {
        self.shown = Some((value, now));
    }

    /// The value, while its window is open.
    pub fn get(&self, now: Instant) -> Option<&T> {
        match &self.shown {
            Some((value, since)) if now.duration_since(*since) < self.ttl => Some(value),
            _ => None,
        }
    }

    /// Drop an expired value.  Returns `true` if something was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.shown.is_some() && self.get(now).is_none() {
            self.shown = None;
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(10 * SEC, true, t0);

        assert!(!s.poll_due(t0 + 9 * SEC));
        assert!(s.poll_due(t0 + 10 * SEC));
        assert!(!s.poll_due(t0 + 11 * SEC));
        assert!(s.poll_due(t0 + 20 * SEC));
    }

    #[test]
    fn disabled_schedule_never_fires() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(SEC, false, t0);
        assert!(!s.poll_due(t0 + 100 * SEC));
    }

    #[test]
    fn disabling_cancels_the_pending_tick() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(10 * SEC, true, t0);

        s.set_enabled(false, t0 + 5 * SEC);
        assert!(!s.poll_due(t0 + 10 * SEC));

        // Re-enabling starts a fresh cadence from the toggle, not from t0.
        s.set_enabled(true, t0 + 12 * SEC);
        assert!(!s.poll_due(t0 + 20 * SEC));
        assert!(s.poll_due(t0 + 22 * SEC));
    }

    #[test]
    fn interval_change_restarts_cadence() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(60 * SEC, true, t0);

        s.set_interval(15 * SEC, t0 + 50 * SEC);
        assert!(!s.poll_due(t0 + 60 * SEC));
        assert!(s.poll_due(t0 + 65 * SEC));
    }

    #[test]
    fn presets_step_and_clamp() {
        let t0 = Instant::now();
        let mut s = PollSchedule::new(45 * SEC, true, t0);

        s.slower(t0);
        assert_eq!(s.interval(), 60 * SEC);
        s.faster(t0);
        s.faster(t0);
        assert_eq!(s.interval(), 15 * SEC);
        s.faster(t0);
        assert_eq!(s.interval(), 15 * SEC);

        s.set_interval(300 * SEC, t0);
        s.slower(t0);
        assert_eq!(s.interval(), 300 * SEC);
    }

    #[test]
    fn transient_hides_after_exactly_one_window() {
        let t0 = Instant::now();
        let mut badge = Transient::new(NOTICE_DURATION);
        badge.show(3usize, t0);

        assert_eq!(badge.get(t0 + 4 * SEC), Some(&3));
        assert_eq!(badge.get(t0 + NOTICE_DURATION - Duration::from_millis(1)), Some(&3));
        assert_eq!(badge.get(t0 + NOTICE_DURATION), None);

        assert!(badge.expire(t0 + NOTICE_DURATION));
        assert!(!badge.expire(t0 + NOTICE_DURATION));
    }

    #[test]
    fn new_show_opens_a_new_window() {
        let t0 = Instant::now();
        let mut badge = Transient::new(NOTICE_DURATION);
        badge.show(1usize, t0);
        badge.show(2usize, t0 + 3 * SEC);

        assert_eq!(badge.get(t0 + 7 * SEC), Some(&2));
        assert_eq!(badge.get(t0 + 8 * SEC), None);
    }
}
