//! Latest-block hand-off from the audio thread to the presentation poller.
//!
//! A single mutex-guarded [`AudioBlock`] holds the most recent processed
//! block. Both sides only copy while holding the lock, so the critical
//! section is O(block size) with no formatting, parsing, or allocation once
//! the holding buffer has grown to the host block size.
//!
//! The producer uses `try_lock`: if the poller happens to be copying out at
//! that instant, the block is skipped rather than waited on. The next block
//! supersedes it anyway.

use crate::block::AudioBlock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe holder for the most recently published audio block.
#[derive(Debug, Default)]
pub struct TelemetryChannel {
    latest: Mutex<AudioBlock>,
    published: AtomicU64,
    skipped: AtomicU64,
}

impl TelemetryChannel {
    /// Create an empty channel with no preallocated storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty channel sized for `channels` × `max_samples`.
    pub fn with_capacity(channels: usize, max_samples: usize) -> Self {
        Self {
            latest: Mutex::new(AudioBlock::with_capacity(channels, max_samples)),
            published: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Copy a block in (audio thread). Never blocks.
    ///
    /// Returns `false` if the consumer held the lock and the block was skipped.
    pub fn publish<S: AsRef<[f32]>>(&self, channels: &[S]) -> bool {
        if let Some(mut latest) = self.latest.try_lock() {
            latest.copy_from(channels);
            self.published.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Copy the latest block out into `out` (poller thread).
    ///
    /// Returns `true` if the copied block holds any samples.
    pub fn consume_latest(&self, out: &mut AudioBlock) -> bool {
        let latest = self.latest.lock();
        out.copy_from_block(&latest);
        !out.is_empty()
    }

    /// Discard the held block.
    pub fn clear(&self) {
        self.latest.lock().clear();
    }

    /// Number of blocks successfully published since creation.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Number of publishes skipped because the consumer held the lock.
    pub fn skipped_count(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}
