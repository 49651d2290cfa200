//! Request pacing for search portals.

use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::config::MAX_DELAY_SECS;

/// Sleeps for a random duration in `[min, max]` seconds.
///
/// A degenerate or empty range sleeps for `min` (or not at all when both are 0).
pub async fn random_delay(range: (f64, f64)) {
    let delay = pick_delay(range);
    if !delay.is_zero() {
        log::debug!("Pacing delay {:.1}s", delay.as_secs_f64());
        sleep(delay).await;
    }
}

fn pick_delay((min, max): (f64, f64)) -> Duration {
    let min = if min.is_finite() { min.clamp(0.0, MAX_DELAY_SECS) } else { 0.0 };
    let max = if max.is_finite() { max.min(MAX_DELAY_SECS) } else { min };
    let secs = if max > min {
        // The generator is dropped before the caller awaits.
        rand::rng().random_range(min..=max)
    } else {
        min
    };
    Duration::from_secs_f64(secs)
}

/// Serialises one site's search requests.
///
/// Each call to [`RequestPacer::wait`] returns no sooner than `min_interval`
/// after the previous call returned, plus a random jitter drawn from
/// `jitter`. Concurrent callers queue on the inner lock, so the spacing holds
/// across channel tasks that share a searcher.
pub struct RequestPacer {
    last: Mutex<Option<Instant>>,
    min_interval: Duration,
    jitter: (f64, f64),
}

impl RequestPacer {
    pub fn new(min_interval: Duration, jitter: (f64, f64)) -> Self {
        RequestPacer {
            last: Mutex::new(None),
            min_interval,
            jitter,
        }
    }

    /// Waits until the next request may be sent.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        random_delay(self.jitter).await;
        *last = Some(Instant::now());
    }
}
