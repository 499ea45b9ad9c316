//! Progress-callback trait for per-record stamping events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::StampConfigBuilder::progress`] to receive events as
//! the pipeline works through the workbook.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point:
//! callers can forward events to a terminal progress bar, a web-socket,
//! or a job table without the library knowing anything about how the
//! host application communicates. The trait is `Send + Sync` so a
//! config holding one can still be shared freely, even though the
//! pipeline itself processes records strictly one at a time.

use std::sync::Arc;

/// Called by the pipeline as it processes each record.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. Records are processed sequentially,
/// so events for one record always arrive before the next record's.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after validation, before any record is processed.
    ///
    /// # Arguments
    /// * `total_records` — number of records that will be attempted
    fn on_run_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called just before a record's label is composed.
    fn on_record_start(&self, index: usize, total: usize, code: &str) {
        let _ = (index, total, code);
    }

    /// Called when a record's label has been stamped onto its PDF.
    fn on_record_stamped(&self, index: usize, total: usize, code: &str) {
        let _ = (index, total, code);
    }

    /// Called when a record is skipped (lenient mode, no layout PDF).
    fn on_record_skipped(&self, index: usize, total: usize, code: &str) {
        let _ = (index, total, code);
    }

    /// Called once after every record has been attempted, before the
    /// bundle is written.
    fn on_run_complete(&self, stamped: usize, skipped: usize) {
        let _ = (stamped, skipped);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::StampConfig`].
pub type RunProgress = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        stamped: AtomicUsize,
        skipped: AtomicUsize,
        total_seen: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_run_start(&self, total_records: usize) {
            self.total_seen.store(total_records, Ordering::SeqCst);
        }

        fn on_record_start(&self, _index: usize, _total: usize, _code: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_record_stamped(&self, _index: usize, _total: usize, _code: &str) {
            self.stamped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_record_skipped(&self, _index: usize, _total: usize, _code: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_record_start(1, 3, "DDH-001");
        cb.on_record_stamped(1, 3, "DDH-001");
        cb.on_record_skipped(2, 3, "DDH-002");
        cb.on_run_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            stamped: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            total_seen: AtomicUsize::new(0),
        };

        tracker.on_run_start(2);
        tracker.on_record_start(1, 2, "A");
        tracker.on_record_stamped(1, 2, "A");
        tracker.on_record_start(2, 2, "B");
        tracker.on_record_skipped(2, 2, "B");

        assert_eq!(tracker.total_seen.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.stamped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn RunProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_record_stamped(1, 10, "DDH-001");
    }
}
