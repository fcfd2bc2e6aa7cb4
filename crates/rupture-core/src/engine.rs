//! The reverb processing unit seen from the real-time processor.
//!
//! [`RuptureProcessor`](crate::RuptureProcessor) does not care how the tail
//! is produced. It hands the engine a parameter snapshot once per block and
//! asks it to process a stereo pair in place.

use crate::params::ParamSnapshot;

/// Object-safe interface for a stereo reverb.
///
/// All methods except [`prepare`](Self::prepare) are called on the audio
/// thread and must not allocate or block.
pub trait ReverbEngine: Send {
    /// Configure for a sample rate and maximum block size. May allocate.
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize);

    /// Apply the current control values. Called once per block before
    /// [`process`](Self::process).
    fn set_params(&mut self, params: &ParamSnapshot);

    /// Process one stereo block in place. Both slices have the same length.
    fn process(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Clear all internal state (tails, filter memory).
    fn reset(&mut self);
}

impl<E: ReverbEngine + ?Sized> ReverbEngine for Box<E> {
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        (**self).prepare(sample_rate, max_block_size);
    }

    fn set_params(&mut self, params: &ParamSnapshot) {
        (**self).set_params(params);
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        (**self).process(left, right);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
