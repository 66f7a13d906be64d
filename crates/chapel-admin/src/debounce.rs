//! Debouncer for search re-fetches and autosave
//!
//! Each `call` restarts the delay. A pending timer is aborted, but work
//! whose timer already fired runs to completion.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: Mutex::new(None) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `work` once `delay` passes without another call
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F, Fut>(&self, work: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later call cannot abort work already started
            tokio::spawn(work());
        });
        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending timer, if any
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_bursts_collapse_to_last_call() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(String::new()));

        for query in ["g", "gr", "gra", "grace"] {
            let runs = runs.clone();
            let last = last.clone();
            debouncer.call(move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                *last.lock() = query.to_string();
            });
            sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(250)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock(), "grace");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_work_is_not_aborted() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let finished = Arc::new(AtomicUsize::new(0));

        let done = finished.clone();
        debouncer.call(move || async move {
            sleep(Duration::from_millis(500)).await;
            done.fetch_add(1, Ordering::SeqCst);
        });
        sleep(Duration::from_millis(60)).await;

        debouncer.call(|| async {});
        sleep(Duration::from_millis(600)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        debouncer.call(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
