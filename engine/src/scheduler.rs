//! Repeating tick loop and the deferred sub-wave advance.

use std::time::Duration;

/// Owns the tick loop flag and at most one pending sub-wave advance.
///
/// Both are cancellable; cancelling twice is a no-op.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    running: bool,
    deferred_advance: Option<Duration>,
}

impl Scheduler {
    pub(crate) fn start_loop(&mut self) {
        self.running = true;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Arms the deferred advance, replacing any pending one.
    pub(crate) fn schedule_advance(&mut self, delay: Duration) {
        self.deferred_advance = Some(delay);
    }

    pub(crate) fn cancel_advance(&mut self) {
        self.deferred_advance = None;
    }

    pub(crate) fn cancel_all(&mut self) {
        self.running = false;
        self.deferred_advance = None;
    }

    pub(crate) fn pending_advance(&self) -> Option<Duration> {
        self.deferred_advance
    }

    /// Counts `elapsed` simulated time against the pending advance.
    ///
    /// Returns `true` exactly once, when the pending advance comes due.
    pub(crate) fn poll_advance(&mut self, elapsed: Duration) -> bool {
        let Some(remaining) = self.deferred_advance else {
            return false;
        };

        if elapsed >= remaining {
            self.deferred_advance = None;
            return true;
        }

        self.deferred_advance = Some(remaining - elapsed);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_advance_fires_once_after_its_delay() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_advance(Duration::from_millis(300));

        assert!(!scheduler.poll_advance(Duration::from_millis(200)));
        assert_eq!(
            scheduler.pending_advance(),
            Some(Duration::from_millis(100))
        );
        assert!(scheduler.poll_advance(Duration::from_millis(100)));
        assert!(!scheduler.poll_advance(Duration::from_secs(1)));
    }

    #[test]
    fn cancellation_is_idempotent() {
        let mut scheduler = Scheduler::default();
        scheduler.start_loop();
        scheduler.schedule_advance(Duration::from_secs(3));

        scheduler.cancel_all();
        scheduler.cancel_all();
        scheduler.cancel_advance();

        assert!(!scheduler.is_running());
        assert_eq!(scheduler.pending_advance(), None);
        assert!(!scheduler.poll_advance(Duration::from_secs(10)));
    }
}
