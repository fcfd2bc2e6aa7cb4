//! Runs a [`PresentationPoller`] on its own thread at the configured rate.

use crate::error::{Error, Result};
use crate::poller::PresentationPoller;
use crate::surface::PresentationSurface;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Owns the poller thread. Dropping it stops and joins the thread.
pub struct PollerThread {
    running: Arc<AtomicBool>,
    refresh: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl PollerThread {
    /// Move `poller` onto a new thread and start ticking.
    ///
    /// Ticks are scheduled against absolute deadlines so the average rate
    /// does not drift. If the thread falls more than one period behind, the
    /// schedule restarts from now instead of bursting to catch up.
    ///
    /// The poller's configuration is validated first, so a rate whose period
    /// cannot be scheduled is reported as [`Error::Config`].
    pub fn spawn<S>(mut poller: PresentationPoller<S>) -> Result<Self>
    where
        S: PresentationSurface + 'static,
    {
        poller.config().validate()?;
        let running = Arc::new(AtomicBool::new(true));
        let refresh = Arc::new(AtomicBool::new(false));
        let interval = poller.config().tick_interval();

        let handle = thread::Builder::new()
            .name("rupture-poller".into())
            .spawn({
                let running = Arc::clone(&running);
                let refresh = Arc::clone(&refresh);
                move || {
                    tracing::debug!(interval_ms = interval.as_secs_f64() * 1000.0, "poller started");
                    let Some(mut deadline) = Instant::now().checked_add(interval) else {
                        tracing::warn!("tick interval overflows the clock, poller not started");
                        return 0;
                    };
                    while running.load(Ordering::Acquire) {
                        if refresh.swap(false, Ordering::AcqRel) {
                            poller.refresh_all_parameters();
                        }
                        poller.tick();

                        let now = Instant::now();
                        let next = if deadline > now {
                            thread::sleep(deadline - now);
                            deadline.checked_add(interval)
                        } else {
                            now.checked_add(interval)
                        };
                        let Some(next) = next else {
                            tracing::warn!("tick interval overflows the clock, poller stopping");
                            break;
                        };
                        deadline = next;
                    }
                    let failed = poller.failed_pushes();
                    tracing::debug!(failed_pushes = failed, "poller stopped");
                    failed
                }
            })
            .map_err(Error::Spawn)?;

        Ok(Self {
            running,
            refresh,
            handle: Some(handle),
        })
    }

    /// Ask the poller to push all parameters on its next tick.
    pub fn request_refresh(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    /// Whether the thread has not been told to stop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the thread and wait for it.
    ///
    /// Returns the number of failed pushes over the thread's lifetime.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.running.store(false, Ordering::Release);
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(failed)) => failed,
            Some(Err(_)) => {
                tracing::error!("poller thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for PollerThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
