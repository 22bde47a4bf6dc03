use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceFire<T> {
    pub generation: u64,
    pub value: T,
}

/// Single-slot timer: every `schedule` replaces the pending timer, so only the
/// last value of a burst is delivered. Dropping the debouncer cancels it.
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<DebounceFire<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<DebounceFire<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            generation: 0,
            pending: None,
            tx,
        };
        (debouncer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, value: T) -> u64 {
        self.cancel();

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DebounceFire { generation, value });
        }));
        generation
    }

    /// Clears the pending timer and invalidates any fire already queued.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Debouncer;

    #[tokio::test(start_paused = true)]
    async fn burst_delivers_only_last_value() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(250));
        for value in ["cat", "catg", "catgi", "catgirl"] {
            debouncer.schedule(value.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let fire = rx.recv().await.unwrap();
        assert_eq!(fire.value, "catgirl");
        assert!(debouncer.is_current(fire.generation));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_only_after_quiet_period() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(250));
        debouncer.schedule(1_u32);

        tokio::time::sleep(Duration::from_millis(249)).await;
        assert!(rx.try_recv().is_err());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await.unwrap().value, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_invalidates_queued_fire() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(10));
        let generation = debouncer.schedule("a");
        tokio::time::sleep(Duration::from_millis(20)).await;

        debouncer.cancel();
        let fire = rx.recv().await.unwrap();
        assert_eq!(fire.generation, generation);
        assert!(!debouncer.is_current(fire.generation));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_debouncer_clears_pending_timer() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("unmounted");
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.recv().await.is_none());
    }
}
