use log::{log_enabled, Level};
use std::time::Instant;

/// Scoped timer that reports the elapsed time of a section at trace level.
///
/// Nothing is measured unless trace logging is enabled, so it is safe to
/// leave around hot loops.
pub struct ScopedTimer<'a> {
    label: &'a str,
    items: usize,
    start: Option<Instant>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        let start = log_enabled!(Level::Trace).then(Instant::now);
        Self {
            label,
            items: 0,
            start,
        }
    }

    /// Also report the average time per item.
    pub fn with_items(mut self, items: usize) -> Self {
        self.items = items;
        self
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let Some(start) = self.start else {
            return;
        };
        let elapsed_us = start.elapsed().as_secs_f64() * 1e6;
        if self.items > 0 {
            log::trace!(
                "{}: {} items in {:.1} µs ({:.2} µs/item)",
                self.label,
                self.items,
                elapsed_us,
                elapsed_us / self.items as f64
            );
        } else {
            log::trace!("{}: {:.1} µs", self.label, elapsed_us);
        }
    }
}
