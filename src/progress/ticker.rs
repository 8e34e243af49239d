use tracing::trace;

/// Decides when a transfer should emit a progress notification.
///
/// With `callbacks = N` and an announced length `total`, the k-th
/// notification point is `k * total / N` bytes for `k` in `1..=N`. A write
/// that crosses several points fires only once, so a transfer never emits
/// more than `N` notifications.
#[derive(Debug, Clone)]
pub struct ProgressTicker {
    total: u64,
    callbacks: u32,
    next: u32,
}

impl ProgressTicker {
    /// Creates a ticker for a transfer of `total` bytes.
    pub fn new(total: u64, callbacks: u32) -> Self {
        Self {
            total,
            callbacks,
            next: 1,
        }
    }

    fn threshold(&self, point: u32) -> u64 {
        (u128::from(self.total) * u128::from(point) / u128::from(self.callbacks)) as u64
    }

    /// Records that `completed` bytes have been written and returns true if
    /// a notification is due.
    pub fn advance(&mut self, completed: u64) -> bool {
        if self.next > self.callbacks || completed < self.threshold(self.next) {
            return false;
        }

        while self.next <= self.callbacks && completed >= self.threshold(self.next) {
            self.next += 1;
        }
        trace!(completed, total = self.total, "progress point reached");
        true
    }

    /// Number of notification points not reached yet.
    pub fn remaining(&self) -> u32 {
        self.callbacks.saturating_add(1).saturating_sub(self.next)
    }
}
