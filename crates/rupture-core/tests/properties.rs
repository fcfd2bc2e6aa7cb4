//! Property-based tests for rupture-core.
//!
//! Covers parameter clamping, state blob restoration, meter display bounds,
//! smoother monotonicity, and waveform reduction shape using proptest for
//! randomized input generation.

use proptest::prelude::*;
use rupture_core::{
    AudioBlock, MeterSmoother, ParamId, ReverbParams, STATE_BLOB_LEN, WaveformDownsampler,
    display_level,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Whatever is written, every control reads back inside [0, 1].
    #[test]
    fn params_stay_in_unit_range(
        index in 0usize..6,
        value in prop::num::f32::ANY,
    ) {
        let params = ReverbParams::new();
        let id = ParamId::ALL[index];
        params.set(id, value);
        let read = params.get(id);
        prop_assert!((0.0..=1.0).contains(&read), "{id} read back {read} after writing {value}");
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            prop_assert_eq!(read, value);
        }
    }

    /// Arbitrary blob bytes never push a control out of range, and short
    /// blobs never change anything.
    #[test]
    fn arbitrary_blob_is_clamped_or_ignored(
        bytes in prop::collection::vec(any::<u8>(), 0..48),
    ) {
        let params = ReverbParams::new();
        let before = params.snapshot();
        let applied = params.deserialize(&bytes);
        prop_assert_eq!(applied, bytes.len() >= STATE_BLOB_LEN);
        if !applied {
            prop_assert_eq!(params.snapshot(), before);
        }
        for id in ParamId::ALL {
            let v = params.get(id);
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    /// In-range values survive a save/restore into a fresh parameter set.
    #[test]
    fn saved_state_restores_exactly(values in prop::array::uniform6(0.0f32..=1.0f32)) {
        let source = ReverbParams::new();
        for (id, v) in ParamId::ALL.into_iter().zip(values) {
            source.set(id, v);
        }
        let target = ReverbParams::new();
        prop_assert!(target.deserialize(&source.serialize()));
        prop_assert_eq!(target.snapshot(), source.snapshot());
    }

    /// Display level is bounded and non-decreasing in the RMS input.
    #[test]
    fn display_level_bounded_and_monotonic(a in 0.0f32..10.0, b in 0.0f32..10.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let d_lo = display_level(lo);
        let d_hi = display_level(hi);
        prop_assert!((0.0..=100.0).contains(&d_lo));
        prop_assert!((0.0..=100.0).contains(&d_hi));
        prop_assert!(d_lo <= d_hi);
        prop_assert!(d_lo == 0.0 || d_lo >= 0.1);
    }

    /// A smoother approaching a constant target never overshoots it.
    #[test]
    fn smoother_approaches_without_overshoot(
        target in 0.0f32..2.0,
        block in 1usize..2048,
        blocks in 1usize..200,
    ) {
        let mut smoother = MeterSmoother::new(100.0);
        smoother.prepare(48000.0, block);
        let mut prev = 0.0f32;
        for _ in 0..blocks {
            let level = smoother.update(target, block);
            prop_assert!(level >= prev);
            prop_assert!(level <= target * (1.0 + 1e-6) + f32::EPSILON);
            prev = level;
        }
    }

    /// Output length is ceil(len / segment) and never exceeds the target;
    /// each point lies within the range of the mixed input.
    #[test]
    fn downsample_shape_and_range(
        left in prop::collection::vec(-1.0f32..=1.0, 1..1500),
        points in 1usize..300,
    ) {
        let right: Vec<f32> = left.iter().map(|s| -0.5 * s).collect();
        let block = AudioBlock::from_channels(vec![left.clone(), right.clone()]);
        let downsampler = WaveformDownsampler::new(points);
        let out = downsampler.downsample(&block);

        let segment = downsampler.segment_len(left.len());
        prop_assert_eq!(out.len(), left.len().div_ceil(segment));
        prop_assert!(out.len() <= points);

        let mixed: Vec<f32> = left.iter().zip(&right).map(|(l, r)| 0.5 * (l + r)).collect();
        let min = mixed.iter().copied().fold(f32::INFINITY, f32::min);
        let max = mixed.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        for v in out {
            prop_assert!(v >= min - 1e-5 && v <= max + 1e-5, "{v} outside [{min}, {max}]");
        }
    }
}
