//! Fixed-size waveform reduction for the oscilloscope view.
//!
//! A block of any length is cut into contiguous segments of
//! `ceil(len / points)` samples and each segment is replaced by its mean.
//! Stereo blocks are folded to mono sample-by-sample first. Short blocks
//! yield fewer points than requested; nothing is padded.
//!
//! ```text
//! L  = [1, 2, 3, 4]
//! R  = [1, 0, 1, 0]
//! mono = [1, 1, 2, 2]        (per-sample mean)
//! points = 128 → segment = 1 → output [1, 1, 2, 2]
//! ```
//!
//! Sums run in index order so results are reproducible bit for bit.

use crate::block::AudioBlock;

/// Default number of display points.
pub const DEFAULT_WAVEFORM_POINTS: usize = 128;

/// Reduces audio blocks to at most `points` display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformDownsampler {
    points: usize,
}

impl WaveformDownsampler {
    /// Create a downsampler targeting `points` output values.
    pub fn new(points: usize) -> Self {
        Self { points }
    }

    /// Target number of points.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Segment length used for a block of `len` samples.
    pub fn segment_len(&self, len: usize) -> usize {
        if self.points == 0 {
            return len.max(1);
        }
        len.div_ceil(self.points).max(1)
    }

    /// Downsample a block into a new vector.
    pub fn downsample(&self, block: &AudioBlock) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.points.min(block.num_samples()));
        self.downsample_into(block, &mut out);
        out
    }

    /// Downsample a block into `out`, replacing its contents.
    ///
    /// Empty blocks (no channels or no samples) and a zero point target leave
    /// `out` empty. Channels past the second are ignored.
    pub fn downsample_into(&self, block: &AudioBlock, out: &mut Vec<f32>) {
        out.clear();
        if block.is_empty() || self.points == 0 {
            return;
        }

        let len = block.num_samples();
        let segment = self.segment_len(len);

        match (block.channel(0), block.channel(1)) {
            (Some(left), Some(right)) => {
                for (l_seg, r_seg) in left.chunks(segment).zip(right.chunks(segment)) {
                    let mut sum = 0.0f32;
                    for (l, r) in l_seg.iter().zip(r_seg) {
                        sum += 0.5 * (l + r);
                    }
                    out.push(sum / l_seg.len() as f32);
                }
            }
            (Some(mono), None) => {
                for seg in mono.chunks(segment) {
                    let mut sum = 0.0f32;
                    for s in seg {
                        sum += s;
                    }
                    out.push(sum / seg.len() as f32);
                }
            }
            _ => {}
        }
    }
}

impl Default for WaveformDownsampler {
    fn default() -> Self {
        Self::new(DEFAULT_WAVEFORM_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<f32>) -> AudioBlock {
        AudioBlock::from_channels(vec![samples])
    }

    #[test]
    fn mono_256_gives_128_pair_means() {
        let samples: Vec<f32> = (0..256).map(|i| i as f32).collect();
        let points = WaveformDownsampler::default().downsample(&mono(samples.clone()));
        assert_eq!(points.len(), 128);
        for (i, p) in points.iter().enumerate() {
            let expected = (samples[2 * i] + samples[2 * i + 1]) / 2.0;
            assert_eq!(*p, expected, "point {i}");
        }
    }

    #[test]
    fn short_block_is_not_padded() {
        let points = WaveformDownsampler::default().downsample(&mono(vec![0.1, -0.2, 0.3]));
        assert_eq!(points, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn stereo_is_averaged_per_sample() {
        let block = AudioBlock::from_channels(vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 0.0, 1.0, 0.0]]);
        let points = WaveformDownsampler::default().downsample(&block);
        assert_eq!(points, vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let downsampler = WaveformDownsampler::default();
        assert!(downsampler.downsample(&AudioBlock::new()).is_empty());
        assert!(downsampler.downsample(&mono(Vec::new())).is_empty());
        assert!(WaveformDownsampler::new(0).downsample(&mono(vec![1.0])).is_empty());
    }

    #[test]
    fn uneven_length_uses_ceiling_segments() {
        // 300 samples → segment 3 → 100 points
        let block = mono(vec![1.0; 300]);
        let downsampler = WaveformDownsampler::default();
        assert_eq!(downsampler.segment_len(300), 3);
        assert_eq!(downsampler.downsample(&block).len(), 100);

        // 129 samples → segment 2 → 65 points, last segment holds one sample
        let samples: Vec<f32> = (0..129).map(|i| i as f32).collect();
        let points = downsampler.downsample(&mono(samples));
        assert_eq!(points.len(), 65);
        assert_eq!(points[64], 128.0);
    }

    #[test]
    fn extra_channels_are_ignored() {
        let block = AudioBlock::from_channels(vec![vec![1.0, 1.0], vec![3.0, 3.0], vec![100.0, 100.0]]);
        assert_eq!(WaveformDownsampler::default().downsample(&block), vec![2.0, 2.0]);
    }

    #[test]
    fn downsample_into_replaces_previous_contents() {
        let mut out = vec![9.0; 10];
        WaveformDownsampler::default().downsample_into(&mono(vec![0.5]), &mut out);
        assert_eq!(out, vec![0.5]);
    }
}
