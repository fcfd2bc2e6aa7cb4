//! Real-time block processor: the audio-thread side of the bridge.
//!
//! Per block, [`RuptureProcessor::process_block`]:
//!
//! 1. measures input RMS per channel and smooths it,
//! 2. snapshots [`ReverbParams`] into the engine and runs it,
//! 3. measures and smooths output RMS, stores all four levels in
//!    [`SharedMeters`],
//! 4. publishes a copy of the processed block to the [`TelemetryChannel`].
//!
//! None of these steps allocate once [`prepare`](RuptureProcessor::prepare)
//! has run with the host's maximum block size, and none of them format,
//! parse, log, or wait on the presentation side.

use crate::engine::ReverbEngine;
use crate::meter::{DEFAULT_TIME_CONSTANT_MS, MeterLevels, MeterSmoother, SharedMeters, rms};
use crate::params::{ReverbParams, STATE_BLOB_LEN};
use crate::telemetry::TelemetryChannel;
use std::sync::Arc;

/// Shared handles the presentation side needs to observe a processor.
///
/// Cloning is cheap; every field is an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BridgeHandles {
    /// Control values, written by the control inbox, read every block.
    pub params: Arc<ReverbParams>,
    /// Smoothed RMS levels, written every block.
    pub meters: Arc<SharedMeters>,
    /// Latest processed block.
    pub telemetry: Arc<TelemetryChannel>,
}

impl BridgeHandles {
    /// Fresh handles with default parameters, zero meters, empty telemetry.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Meter smoother slots, in [`MeterLevels`] order.
const INPUT_LEFT: usize = 0;
const INPUT_RIGHT: usize = 1;
const OUTPUT_LEFT: usize = 2;
const OUTPUT_RIGHT: usize = 3;

/// Audio-thread processor wrapping a [`ReverbEngine`].
///
/// Owns the engine and the meter smoothers; shares parameters, meters and
/// telemetry with the presentation side through [`BridgeHandles`].
///
/// Mono input is processed as a stereo pair (the engine sees the same signal
/// on both sides) and the left result is written back. Channels past the
/// second pass through the engine untouched but are still published.
pub struct RuptureProcessor<E: ReverbEngine> {
    engine: E,
    handles: BridgeHandles,
    smoothers: [MeterSmoother; 4],
    /// Right-hand scratch for mono blocks.
    mono_scratch: Vec<f32>,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl<E: ReverbEngine> RuptureProcessor<E> {
    /// Create a processor with fresh shared handles.
    pub fn new(engine: E) -> Self {
        Self::with_handles(engine, BridgeHandles::new())
    }

    /// Create a processor that shares existing handles.
    pub fn with_handles(engine: E, handles: BridgeHandles) -> Self {
        Self {
            engine,
            handles,
            smoothers: core::array::from_fn(|_| MeterSmoother::new(DEFAULT_TIME_CONSTANT_MS)),
            mono_scratch: Vec::new(),
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
        }
    }

    /// Handles for the presentation side.
    pub fn handles(&self) -> BridgeHandles {
        self.handles.clone()
    }

    /// The shared parameter set.
    pub fn params(&self) -> &Arc<ReverbParams> {
        &self.handles.params
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Sample rate from the last [`prepare`](Self::prepare), or 0.0.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Whether [`prepare`](Self::prepare) has been called since the last
    /// [`release`](Self::release).
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Configure for playback. Allocates every buffer the audio path needs.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        let max_block_size = max_block_size.max(1);
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;

        for smoother in &mut self.smoothers {
            smoother.prepare(sample_rate, max_block_size);
            smoother.reset();
        }
        self.mono_scratch.clear();
        self.mono_scratch.resize(max_block_size, 0.0);

        // Warm the telemetry holding buffer so the first publish does not allocate.
        let warm = vec![0.0f32; max_block_size];
        if self.handles.telemetry.publish(&[&warm[..], &warm[..]]) {
            self.handles.telemetry.clear();
        }

        self.engine.prepare(sample_rate, max_block_size);
        self.engine.set_params(&self.handles.params.snapshot());
        self.prepared = true;
    }

    /// Process one block in place.
    ///
    /// Before [`prepare`](Self::prepare) the audio passes through unchanged
    /// and nothing is metered or published.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        if !self.prepared {
            return;
        }
        let num_samples = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);
        if num_samples == 0 {
            return;
        }

        let input_left = channels.first().map_or(0.0, |ch| rms(&ch[..num_samples]));
        let input_right = channels.get(1).map_or(0.0, |ch| rms(&ch[..num_samples]));
        self.smoothers[INPUT_LEFT].update(input_left, num_samples);
        self.smoothers[INPUT_RIGHT].update(input_right, num_samples);

        self.engine.set_params(&self.handles.params.snapshot());
        match channels {
            [left, right, ..] => {
                self.engine
                    .process(&mut left[..num_samples], &mut right[..num_samples]);
            }
            [mono] => {
                for chunk in mono[..num_samples].chunks_mut(self.max_block_size) {
                    let scratch = &mut self.mono_scratch[..chunk.len()];
                    scratch.copy_from_slice(chunk);
                    self.engine.process(chunk, scratch);
                }
            }
            [] => {}
        }

        let output_left = channels.first().map_or(0.0, |ch| rms(&ch[..num_samples]));
        let output_right = channels.get(1).map_or(0.0, |ch| rms(&ch[..num_samples]));
        self.smoothers[OUTPUT_LEFT].update(output_left, num_samples);
        self.smoothers[OUTPUT_RIGHT].update(output_right, num_samples);

        self.handles.meters.store(self.smoothed_levels());
        self.handles.telemetry.publish(&*channels);
    }

    /// Stop processing: clear engine state, zero meters, drop telemetry.
    pub fn release(&mut self) {
        self.engine.reset();
        for smoother in &mut self.smoothers {
            smoother.reset();
        }
        self.handles.meters.reset();
        self.handles.telemetry.clear();
        self.prepared = false;
    }

    /// Current smoothed levels in linear RMS units.
    pub fn smoothed_levels(&self) -> MeterLevels {
        MeterLevels::from_array(self.smoothers.each_ref().map(MeterSmoother::level))
    }

    /// Encode the current parameters as a state blob.
    pub fn save_state(&self) -> [u8; STATE_BLOB_LEN] {
        self.handles.params.serialize()
    }

    /// Restore parameters from a state blob. Short blobs are ignored.
    ///
    /// Returns `true` if the blob was applied.
    pub fn load_state(&self, bytes: &[u8]) -> bool {
        self.handles.params.deserialize(bytes)
    }
}

impl<E: ReverbEngine + Default> Default for RuptureProcessor<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}
