//! Trailing-edge debouncing of rapid edits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Coalesces a burst of edits so only the last one takes effect.
///
/// Each edit calls [`Debouncer::touch`] and then awaits
/// [`Debouncer::settled`] with its ticket. Every later touch restarts the
/// window, so only the caller holding the newest ticket sees `true`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    seq: AtomicU64,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet window.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: AtomicU64::new(0),
        }
    }

    /// Quiet window.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Registers an edit and returns its ticket.
    pub fn touch(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Waits out the window; true if no edit arrived after `ticket`.
    pub async fn settled(&self, ticket: u64) -> bool {
        tokio::time::sleep(self.delay).await;
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_edit_settles() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let ticket = debouncer.touch();
            let d = Arc::clone(&debouncer);
            handles.push(tokio::spawn(async move { d.settled(ticket).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec![false, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_both_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let first = debouncer.touch();
        assert!(debouncer.settled(first).await);
        let second = debouncer.touch();
        assert!(debouncer.settled(second).await);
    }
}
