//! Ticking scheduler.
//!
//! A [`Ticker`] runs a callback once per interval on a tokio task until its
//! [`TickerHandle`] is cancelled or dropped. It knows nothing about sessions:
//! the controller owns the single live handle and replaces it (cancelling the
//! old one first) whenever a new session starts.
//!
//! Missed ticks are delayed rather than replayed, so a process resumed after
//! suspension does not burst through the lost seconds.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shortest interval accepted; tokio rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Factory for periodic drivers.
pub struct Ticker;

impl Ticker {
    /// Call `on_tick` every `interval`, first one full interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(interval: Duration, mut on_tick: F) -> TickerHandle
    where
        F: FnMut() + Send + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        let task = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                on_tick();
            }
        });
        TickerHandle {
            task: Some(task),
            interval,
        }
    }
}

/// Owner of a running ticker. Dropping it cancels the ticker.
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl TickerHandle {
    /// Stop the ticker. No callback runs after this returns.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_none()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_ticker(interval: Duration) -> (TickerHandle, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let handle = Ticker::start(interval, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (handle, count)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let (_handle, count) = counting_ticker(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_callbacks() {
        let (mut handle, count) = counting_ticker(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        handle.cancel();
        assert!(handle.is_cancelled());
        let seen = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert_eq!(seen, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (handle, count) = counting_ticker(Duration::from_secs(1));
        drop(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let (handle, _count) = counting_ticker(Duration::ZERO);
        assert_eq!(handle.interval(), MIN_INTERVAL);
    }
}
