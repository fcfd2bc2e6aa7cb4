//! Rupture Core - the real-time side of the rupture reverb
//!
//! Everything in this crate may run on the audio thread. After `prepare`,
//! nothing here allocates, formats, parses, or waits on another thread.
//!
//! # Shared State
//!
//! Three pieces of state cross from the audio thread to the presentation
//! side, bundled in [`BridgeHandles`]:
//!
//! - [`ReverbParams`] - six lock-free control values, plus a 24-byte state blob
//! - [`SharedMeters`] - smoothed input/output RMS per channel
//! - [`TelemetryChannel`] - the latest processed [`AudioBlock`]
//!
//! # Processing
//!
//! - [`RuptureProcessor`] - per-block orchestration: meter, process, publish
//! - [`ReverbEngine`] - object-safe trait for the reverb itself
//! - [`Freeverb`] - eight combs and four allpasses per channel
//!
//! # Presentation Helpers
//!
//! - [`MeterSmoother`] and [`display_level`] - block-rate ballistics and the
//!   0..100 display curve
//! - [`WaveformDownsampler`] - fixed-width oscilloscope reduction
//!
//! # Example
//!
//! ```rust
//! use rupture_core::{Freeverb, RuptureProcessor};
//!
//! let mut processor = RuptureProcessor::new(Freeverb::new());
//! processor.prepare(48000.0, 256);
//!
//! let handles = processor.handles();
//! handles.params.set_room_size(0.8);
//!
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! processor.process_block(&mut [&mut left, &mut right]);
//!
//! let levels = handles.meters.load();
//! assert_eq!(levels.input_left, 0.0);
//! ```

pub mod allpass;
pub mod block;
pub mod comb;
pub mod engine;
pub mod freeverb;
pub mod meter;
pub mod params;
pub mod processor;
pub mod telemetry;
pub mod waveform;

pub use allpass::AllpassFilter;
pub use block::AudioBlock;
pub use comb::CombFilter;
pub use engine::ReverbEngine;
pub use freeverb::Freeverb;
pub use meter::{
    DEFAULT_TIME_CONSTANT_MS, DISPLAY_FLOOR, DISPLAY_MAX, MeterLevels, MeterSmoother,
    SharedMeters, display_level, rms,
};
pub use params::{PARAM_COUNT, ParamId, ParamSnapshot, ReverbParams, STATE_BLOB_LEN};
pub use processor::{BridgeHandles, RuptureProcessor};
pub use telemetry::TelemetryChannel;
pub use waveform::{DEFAULT_WAVEFORM_POINTS, WaveformDownsampler};

/// Flush values in the subnormal neighbourhood to zero.
///
/// Recirculating filters decay towards zero forever; below ~1e-20 the
/// samples are inaudible and can stall the FPU on some targets.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
