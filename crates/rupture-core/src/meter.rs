//! Level metering: per-block RMS, time-constant smoothing, display scaling.
//!
//! The audio thread measures the RMS of each block, feeds it through a
//! [`MeterSmoother`] per channel, and stores the four smoothed values in
//! [`SharedMeters`]. The presentation side loads them and converts to the
//! 0–100 display scale with [`display_level`].
//!
//! ## Smoothing
//!
//! One update per block, exponential approach toward the new target:
//!
//! ```text
//! coeff = 1 - exp(-block_len / (tau * sample_rate))
//! level = level + coeff * (target - level)
//! ```
//!
//! With `tau` = 100 ms a step input reaches ~63% of its final value after
//! 100 ms regardless of block size.

use libm::{expf, sqrtf};
use std::sync::atomic::{AtomicU32, Ordering};

/// Default meter time constant in milliseconds.
pub const DEFAULT_TIME_CONSTANT_MS: f32 = 100.0;

/// Display values below this are shown as exactly zero.
pub const DISPLAY_FLOOR: f32 = 0.1;

/// Top of the display scale.
pub const DISPLAY_MAX: f32 = 100.0;

/// Root-mean-square of a block. Returns 0.0 for an empty block.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    sqrtf(sum_sq / samples.len() as f32)
}

/// Convert a linear RMS magnitude to the 0–100 display scale.
///
/// `sqrt(rms * 100) * 10`, clamped to `[0, 100]`, with anything below
/// [`DISPLAY_FLOOR`] snapped to zero. Zero, negative, and non-finite inputs
/// all map to 0.0.
pub fn display_level(rms: f32) -> f32 {
    if !rms.is_finite() || rms <= 0.0 {
        return 0.0;
    }
    let scaled = (sqrtf(rms * 100.0) * 10.0).clamp(0.0, DISPLAY_MAX);
    if scaled < DISPLAY_FLOOR { 0.0 } else { scaled }
}

/// Exponential smoother for one meter channel.
///
/// Unlike a per-sample smoother, the coefficient is derived from the block
/// length so that the response time is independent of the host buffer size.
#[derive(Debug, Clone)]
pub struct MeterSmoother {
    level: f32,
    coeff: f32,
    block_size: usize,
    sample_rate: f32,
    time_constant_ms: f32,
}

impl MeterSmoother {
    /// Create a smoother with the given time constant.
    ///
    /// Until [`prepare`](Self::prepare) is called, updates jump straight to
    /// the target.
    pub fn new(time_constant_ms: f32) -> Self {
        Self {
            level: 0.0,
            coeff: 1.0,
            block_size: 0,
            sample_rate: 0.0,
            time_constant_ms,
        }
    }

    /// Configure for the host sample rate and nominal block size.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize) {
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.coeff = self.coeff_for(block_size);
    }

    /// Advance by one block toward `target` and return the new level.
    #[inline]
    pub fn update(&mut self, target: f32, block_len: usize) -> f32 {
        let target = if target.is_finite() { target.max(0.0) } else { 0.0 };
        let coeff = if block_len == self.block_size {
            self.coeff
        } else {
            self.coeff_for(block_len)
        };
        self.level += coeff * (target - self.level);
        if self.level < 1e-20 {
            self.level = 0.0;
        }
        self.level
    }

    /// Current smoothed level (linear RMS units).
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Drop the level to zero.
    pub fn reset(&mut self) {
        self.level = 0.0;
    }

    fn coeff_for(&self, block_len: usize) -> f32 {
        let tau_samples = self.time_constant_ms * 0.001 * self.sample_rate;
        if tau_samples <= 0.0 {
            1.0
        } else {
            1.0 - expf(-(block_len as f32) / tau_samples)
        }
    }
}

impl Default for MeterSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_CONSTANT_MS)
    }
}

/// The four meter values shown on the control surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeterLevels {
    /// Input, left channel.
    pub input_left: f32,
    /// Input, right channel.
    pub input_right: f32,
    /// Output, left channel.
    pub output_left: f32,
    /// Output, right channel.
    pub output_right: f32,
}

impl MeterLevels {
    /// All meters at zero.
    pub const ZERO: MeterLevels = MeterLevels {
        input_left: 0.0,
        input_right: 0.0,
        output_left: 0.0,
        output_right: 0.0,
    };

    /// Values in (input-left, input-right, output-left, output-right) order.
    pub const fn to_array(&self) -> [f32; 4] {
        [
            self.input_left,
            self.input_right,
            self.output_left,
            self.output_right,
        ]
    }

    /// Build from values in [`to_array`](Self::to_array) order.
    pub const fn from_array(values: [f32; 4]) -> Self {
        let [input_left, input_right, output_left, output_right] = values;
        Self {
            input_left,
            input_right,
            output_left,
            output_right,
        }
    }

    /// Convert linear RMS levels to the display scale.
    pub fn to_display(&self) -> Self {
        Self::from_array(self.to_array().map(display_level))
    }

    /// Replace every value below `floor` with exactly zero.
    pub fn snapped(&self, floor: f32) -> Self {
        Self::from_array(self.to_array().map(|v| if v < floor { 0.0 } else { v }))
    }
}

/// Smoothed meter levels written by the audio thread, read by the poller.
///
/// Each level is an independent atomic; a reader may see levels from two
/// adjacent blocks, which is invisible at display rate.
#[derive(Debug, Default)]
pub struct SharedMeters {
    cells: [AtomicU32; 4],
}

impl SharedMeters {
    /// All meters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a full set of levels (audio thread).
    #[inline]
    pub fn store(&self, levels: MeterLevels) {
        for (cell, value) in self.cells.iter().zip(levels.to_array()) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Load the latest levels.
    pub fn load(&self) -> MeterLevels {
        MeterLevels::from_array(
            [0, 1, 2, 3].map(|i| f32::from_bits(self.cells[i].load(Ordering::Relaxed))),
        )
    }

    /// Zero all meters.
    pub fn reset(&self) {
        self.store(MeterLevels::ZERO);
    }
}
