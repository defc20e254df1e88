use std::time::Duration;
use tokio::task::AbortHandle;

/// A scheduled callback. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// No-op if the callback already ran. The callback is synchronous, so it either
    /// ran to completion or never starts.
    pub fn cancel(self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Runs `callback` once after `delay` on the current tokio runtime.
pub fn schedule<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback();
    });

    TimerHandle {
        abort: handle.abort_handle(),
    }
}

/// The pending timers of a single round, cancelled together when the round ends early.
#[derive(Debug, Default)]
pub struct PhaseTimer {
    pending: Vec<TimerHandle>,
}

impl PhaseTimer {
    pub fn new() -> PhaseTimer {
        PhaseTimer {
            pending: Vec::new(),
        }
    }

    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pending.retain(|t| !t.is_finished());
        self.pending.push(schedule(delay, callback));
    }

    pub fn cancel_all(&mut self) {
        for timer in self.pending.drain(..) {
            timer.cancel();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|t| !t.is_finished()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Instant};

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();

        let _handle = schedule(Duration::from_millis(3_000), move || {
            let _ = tx.send(());
        });

        assert!(timeout(Duration::from_millis(2_999), rx.recv()).await.is_err());
        assert_eq!(rx.recv().await, Some(()));
        assert!(start.elapsed() >= Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = schedule(Duration::from_millis(3_000), move || {
            let _ = tx.send(());
        });
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        handle.cancel();

        // The aborted task drops its sender, closing the channel without a message.
        assert_eq!(
            timeout(Duration::from_secs(10), rx.recv()).await,
            Ok(None)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_firing_is_a_no_op() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = schedule(Duration::from_millis(10), move || {
            let _ = tx.send(());
        });
        assert_eq!(rx.recv().await, Some(()));

        handle.cancel();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_every_pending_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = PhaseTimer::new();

        for delay in [3_000, 60_000] {
            let tx = tx.clone();
            timers.schedule(Duration::from_millis(delay), move || {
                let _ = tx.send(delay);
            });
        }
        drop(tx);
        assert_eq!(timers.pending(), 2);

        assert_eq!(rx.recv().await, Some(3_000));
        timers.cancel_all();

        assert_eq!(rx.recv().await, None);
        assert_eq!(timers.pending(), 0);
    }
}
