//! Link-health state machine.
//!
//! Tracks consecutive ticks without a recognized inbound frame and gates
//! the `linked` flag on it. The flag and counter are plain atomics so a
//! supervisory thread can call [`LinkMonitor::try_link`] / `unlink` without
//! sharing the scheduler's lock; neither value carries a data dependency,
//! so relaxed ordering suffices.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Consecutive-miss counter plus linked flag.
///
/// A fresh monitor starts with the counter saturated, so `try_link` stays
/// a no-op until the first frame arrives from the peer.
///
/// `try_link` reads the counter and then sets the flag; a miss landing
/// between the two can leave one tick of stale linkage, which the per-tick
/// lapse evaluation corrects on the next `operate`.
#[derive(Debug)]
pub struct LinkMonitor {
    linked: AtomicBool,
    missed: AtomicU32,
}

impl LinkMonitor {
    /// Consecutive silent ticks tolerated before the link is forced down.
    pub const MISS_LIMIT: u32 = 10;

    /// Creates an unlinked monitor with a saturated miss counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            linked: AtomicBool::new(false),
            missed: AtomicU32::new(Self::MISS_LIMIT),
        }
    }

    /// Whether the remote position is currently trusted.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.linked.load(Ordering::Relaxed)
    }

    /// Requests the `Unlinked -> Linked` transition.
    ///
    /// Succeeds only while the peer is actively heard (miss counter below
    /// [`Self::MISS_LIMIT`]); otherwise the request is a no-op. Returns the
    /// linked state afterward.
    pub fn try_link(&self) -> bool {
        if self.missed.load(Ordering::Relaxed) < Self::MISS_LIMIT {
            self.linked.store(true, Ordering::Relaxed);
        }
        self.is_linked()
    }

    /// Unconditionally forces `Unlinked`. Returns whether the link was up.
    pub fn unlink(&self) -> bool {
        self.linked.swap(false, Ordering::Relaxed)
    }

    /// Current consecutive-miss count (saturates at [`Self::MISS_LIMIT`]).
    #[must_use]
    pub fn missed(&self) -> u32 {
        self.missed.load(Ordering::Relaxed)
    }

    /// Whether the miss counter has reached the limit.
    #[must_use]
    pub fn lapsed(&self) -> bool {
        self.missed() >= Self::MISS_LIMIT
    }

    /// Records one tick without (yet) hearing the peer.
    pub(crate) fn record_miss(&self) {
        // Saturating: never wraps past the limit
        let _ = self
            .missed
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |missed| {
                (missed < Self::MISS_LIMIT).then_some(missed + 1)
            });
    }

    /// Records a recognized inbound frame, clearing the miss counter.
    pub(crate) fn record_receipt(&self) {
        self.missed.store(0, Ordering::Relaxed);
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unlinked_and_saturated() {
        let monitor = LinkMonitor::new();
        assert!(!monitor.is_linked());
        assert_eq!(monitor.missed(), LinkMonitor::MISS_LIMIT);
        assert!(monitor.lapsed());
    }

    #[test]
    fn try_link_refused_while_lapsed() {
        let monitor = LinkMonitor::new();
        assert!(!monitor.try_link());
        assert!(!monitor.is_linked());
    }

    #[test]
    fn try_link_succeeds_after_receipt() {
        let monitor = LinkMonitor::new();
        monitor.record_receipt();
        assert!(monitor.try_link());
        assert!(monitor.is_linked());
    }

    #[test]
    fn miss_counter_saturates() {
        let monitor = LinkMonitor::new();
        monitor.record_receipt();
        for _ in 0..10 * LinkMonitor::MISS_LIMIT {
            monitor.record_miss();
        }
        assert_eq!(monitor.missed(), LinkMonitor::MISS_LIMIT);
    }

    #[test]
    fn lapse_boundary_is_exact() {
        let monitor = LinkMonitor::new();
        monitor.record_receipt();
        for _ in 0..LinkMonitor::MISS_LIMIT - 1 {
            monitor.record_miss();
        }
        assert!(!monitor.lapsed());
        assert!(monitor.try_link());
        monitor.record_miss();
        assert!(monitor.lapsed());
    }

    #[test]
    fn receipt_resets_after_gap() {
        let monitor = LinkMonitor::new();
        monitor.record_receipt();
        for _ in 0..7 {
            monitor.record_miss();
        }
        monitor.record_receipt();
        assert_eq!(monitor.missed(), 0);
        assert!(!monitor.lapsed());
    }

    #[test]
    fn unlink_is_unconditional_and_reports_prior_state() {
        let monitor = LinkMonitor::new();
        monitor.record_receipt();
        monitor.try_link();
        assert!(monitor.unlink());
        assert!(!monitor.is_linked());
        assert!(!monitor.unlink());
    }
}
