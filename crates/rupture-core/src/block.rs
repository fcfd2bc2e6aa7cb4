//! Owned multi-channel sample block.
//!
//! [`AudioBlock`] is the unit handed from the audio thread to the presentation
//! side. It always owns its samples; the live callback buffer is copied in,
//! never borrowed. Storage grows during warm-up and is reused afterwards, so
//! copying a block no larger than any previous one does not allocate.

/// A complete copy of one processed audio block.
#[derive(Debug, Clone, Default)]
pub struct AudioBlock {
    /// Per-channel storage. Only the first `active` entries hold live data.
    storage: Vec<Vec<f32>>,
    active: usize,
    num_samples: usize,
}

impl AudioBlock {
    /// Create an empty block with no preallocated storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty block with room for `channels` × `max_samples` samples.
    pub fn with_capacity(channels: usize, max_samples: usize) -> Self {
        Self {
            storage: (0..channels)
                .map(|_| Vec::with_capacity(max_samples))
                .collect(),
            active: 0,
            num_samples: 0,
        }
    }

    /// Build a block from owned channel data. Channels are truncated to the
    /// shortest one.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        let mut block = Self::new();
        block.copy_from(&channels);
        block
    }

    /// Number of channels holding data.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.active
    }

    /// Number of samples per channel.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// True when there are no channels or no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0 || self.num_samples == 0
    }

    /// Samples of one channel, or `None` past the last channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        if index < self.active {
            Some(&self.storage[index][..self.num_samples])
        } else {
            None
        }
    }

    /// Iterate over the active channels.
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.storage[..self.active]
            .iter()
            .map(|ch| &ch[..self.num_samples])
    }

    /// Replace the contents with a copy of `source`.
    ///
    /// The sample count is the length of the shortest source channel.
    /// Allocates only when `source` has more channels or samples than this
    /// block has ever held.
    pub fn copy_from<S: AsRef<[f32]>>(&mut self, source: &[S]) {
        let num_samples = source
            .iter()
            .map(|ch| ch.as_ref().len())
            .min()
            .unwrap_or(0);

        while self.storage.len() < source.len() {
            self.storage.push(Vec::with_capacity(num_samples));
        }

        for (dst, src) in self.storage.iter_mut().zip(source) {
            dst.clear();
            dst.extend_from_slice(&src.as_ref()[..num_samples]);
        }

        self.active = source.len();
        self.num_samples = num_samples;
    }

    /// Replace the contents with a copy of another block.
    pub fn copy_from_block(&mut self, other: &AudioBlock) {
        self.copy_from(&other.storage[..other.active]);
    }

    /// Drop all data, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.active = 0;
        self.num_samples = 0;
    }
}

impl PartialEq for AudioBlock {
    fn eq(&self, other: &Self) -> bool {
        self.active == other.active
            && self.num_samples == other.num_samples
            && self.channels().eq(other.channels())
    }
}
