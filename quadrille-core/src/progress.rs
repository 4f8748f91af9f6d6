//! Progress reporting and cooperative cancellation shared between a producer and observers.
//!
//! One thread (the enumerator) drives stages and percentages; any thread may read the state or
//! request cancellation. Scalars are atomics; the stage description lives behind a mutex.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct ProgressTracker {
    /// Percent through the current stage, stored as `f64` bits.
    percent: AtomicU64,
    /// Overall percent accounted for by completed stages.
    prev_percent: AtomicU64,
    /// Fraction of the whole run taken by the current stage.
    weight: AtomicU64,
    cancelled: AtomicBool,
    finished: AtomicBool,
    percent_changed: AtomicBool,
    description_changed: AtomicBool,
    description: Mutex<String>,
}

#[inline(always)]
fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Acquire))
}

#[inline(always)]
fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::Release);
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            percent: AtomicU64::new(0f64.to_bits()),
            prev_percent: AtomicU64::new(0f64.to_bits()),
            weight: AtomicU64::new(0f64.to_bits()),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            percent_changed: AtomicBool::new(true),
            description_changed: AtomicBool::new(true),
            description: Mutex::new(String::new()),
        }
    }

    /// Closes the current stage and opens a new one covering `weight` of the whole run.
    pub fn new_stage(&self, description: impl Into<String>, weight: f64) {
        debug_assert!(
            (0.0..=1.0).contains(&weight),
            "stage weight {weight} outside [0, 1]"
        );
        let done = load_f64(&self.prev_percent) + 100.0 * load_f64(&self.weight);
        store_f64(&self.prev_percent, done.min(100.0));
        store_f64(&self.weight, weight);
        store_f64(&self.percent, 0.0);
        *self
            .description
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = description.into();
        self.percent_changed.store(true, Ordering::Release);
        self.description_changed.store(true, Ordering::Release);
    }

    /// Records progress through the current stage; returns `false` once cancellation is requested.
    ///
    /// Values below the current stage percent are ignored so the reported percent never decreases.
    pub fn set_percent(&self, percent: f64) -> bool {
        let percent = percent.clamp(0.0, 100.0);
        if percent > load_f64(&self.percent) {
            store_f64(&self.percent, percent);
            self.percent_changed.store(true, Ordering::Release);
        }
        !self.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Marks the run complete. Idempotent; a finished tracker stays finished.
    pub fn set_finished(&self) {
        store_f64(&self.prev_percent, 100.0);
        store_f64(&self.weight, 0.0);
        store_f64(&self.percent, 0.0);
        *self
            .description
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = "Finished".to_string();
        self.percent_changed.store(true, Ordering::Release);
        self.description_changed.store(true, Ordering::Release);
        self.finished.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Overall percent across all stages.
    pub fn percent(&self) -> f64 {
        self.percent_changed.store(false, Ordering::Release);
        let overall = load_f64(&self.prev_percent)
            + load_f64(&self.weight) * load_f64(&self.percent);
        overall.min(100.0)
    }

    /// Percent through the current stage only.
    pub fn stage_percent(&self) -> f64 {
        load_f64(&self.percent)
    }

    pub fn description(&self) -> String {
        self.description_changed.store(false, Ordering::Release);
        self.description
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the overall percent moved since it was last read via [`Self::percent`].
    pub fn percent_changed(&self) -> bool {
        self.percent_changed.load(Ordering::Acquire)
    }

    /// Whether the description moved since it was last read via [`Self::description`].
    pub fn description_changed(&self) -> bool {
        self.description_changed.load(Ordering::Acquire)
    }
}

impl fmt::Display for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finished() {
            if self.is_cancelled() {
                return f.write_str("Cancelled and finished");
            }
            return f.write_str("Finished");
        }
        let description = self
            .description
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let overall = (load_f64(&self.prev_percent)
            + load_f64(&self.weight) * load_f64(&self.percent))
        .min(100.0);
        write!(f, "{description} - {overall:.0}%")
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressTracker;
    use std::sync::Arc;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn stages_are_weighted() {
        let tracker = ProgressTracker::new();
        tracker.new_stage("Enumerating extremal rays", 0.4);
        assert!(tracker.set_percent(50.0));
        assert!(close(tracker.percent(), 20.0));
        tracker.new_stage("Computing Hilbert bases", 0.6);
        assert!(close(tracker.percent(), 40.0));
        tracker.set_percent(50.0);
        assert!(close(tracker.percent(), 70.0));
        assert_eq!(tracker.to_string(), "Computing Hilbert bases - 70%");
    }

    #[test]
    fn percent_never_decreases_within_a_stage() {
        let tracker = ProgressTracker::new();
        tracker.new_stage("rows", 1.0);
        tracker.set_percent(60.0);
        tracker.set_percent(10.0);
        assert!(close(tracker.stage_percent(), 60.0));
        tracker.set_percent(250.0);
        assert!(close(tracker.percent(), 100.0));
    }

    #[test]
    fn change_flags_clear_on_read() {
        let tracker = ProgressTracker::new();
        tracker.new_stage("a", 1.0);
        assert!(tracker.description_changed());
        assert_eq!(tracker.description(), "a");
        assert!(!tracker.description_changed());
        let _ = tracker.percent();
        assert!(!tracker.percent_changed());
        tracker.set_percent(5.0);
        assert!(tracker.percent_changed());
    }

    #[test]
    fn cancellation_is_visible_across_threads() {
        let tracker = Arc::new(ProgressTracker::new());
        let remote = Arc::clone(&tracker);
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();
        assert!(tracker.is_cancelled());
        assert!(!tracker.set_percent(1.0));
        tracker.set_finished();
        tracker.set_finished();
        assert!(tracker.is_finished());
        assert_eq!(tracker.to_string(), "Cancelled and finished");
    }

    #[test]
    fn finished_reports_complete() {
        let tracker = ProgressTracker::new();
        tracker.new_stage("only", 1.0);
        tracker.set_finished();
        assert!(close(tracker.percent(), 100.0));
        assert_eq!(tracker.description(), "Finished");
        assert_eq!(tracker.to_string(), "Finished");
    }
}
