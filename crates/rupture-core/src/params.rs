//! Reverb parameter set shared between the audio thread and the presentation side.
//!
//! [`ReverbParams`] stores each of the six controls as an independent
//! `AtomicU32` holding f32 bits. Either thread may write, either may read;
//! no value is ever observed half-written.
//!
//! ```text
//! control inbox ──► ReverbParams::set(id, value)   (clamped to [0, 1])
//!                          │
//! audio thread  ◄── ReverbParams::snapshot()        (once per block)
//! poller        ◄── ReverbParams::snapshot()        (once per tick)
//! ```
//!
//! The state blob written by [`ReverbParams::serialize`] is six little-endian
//! f32 values in [`ParamId::ALL`] order.

use core::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of controls in a [`ReverbParams`] set.
pub const PARAM_COUNT: usize = 6;

/// Size in bytes of a complete state blob.
pub const STATE_BLOB_LEN: usize = PARAM_COUNT * size_of::<f32>();

/// Identifies one reverb control. Declaration order is the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Size of the simulated room.
    RoomSize,
    /// High-frequency absorption in the tail.
    Damping,
    /// Level of the reverberated signal.
    WetLevel,
    /// Level of the unprocessed signal.
    DryLevel,
    /// Stereo width of the tail.
    Width,
    /// Infinite-sustain mode; values at or above 0.5 engage it.
    FreezeMode,
}

impl ParamId {
    /// All controls in declaration (and serialization) order.
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::RoomSize,
        ParamId::Damping,
        ParamId::WetLevel,
        ParamId::DryLevel,
        ParamId::Width,
        ParamId::FreezeMode,
    ];

    /// Position of this control in [`ParamId::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key used for this control on the control channel (e.g. `"roomSize"`).
    pub const fn key(self) -> &'static str {
        match self {
            ParamId::RoomSize => "roomSize",
            ParamId::Damping => "damping",
            ParamId::WetLevel => "wetLevel",
            ParamId::DryLevel => "dryLevel",
            ParamId::Width => "width",
            ParamId::FreezeMode => "freezeMode",
        }
    }

    /// Look up a control by its control-channel key. Case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Value the control takes on construction and after [`ReverbParams::reset`].
    pub const fn default_value(self) -> f32 {
        match self {
            ParamId::RoomSize | ParamId::Damping => 0.5,
            ParamId::WetLevel => 0.33,
            ParamId::DryLevel => 0.4,
            ParamId::Width => 1.0,
            ParamId::FreezeMode => 0.0,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Clamp to the unit range. NaN has no position in the range and maps to `None`.
///
/// Negative zero is stored as `0.0` so it never renders as `-0`.
#[inline]
fn clamp_unit(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 1.0) + 0.0)
    }
}

/// A plain copy of all six control values at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Room size, 0.0 to 1.0.
    pub room_size: f32,
    /// Damping, 0.0 to 1.0.
    pub damping: f32,
    /// Wet level, 0.0 to 1.0.
    pub wet_level: f32,
    /// Dry level, 0.0 to 1.0.
    pub dry_level: f32,
    /// Stereo width, 0.0 to 1.0.
    pub width: f32,
    /// Freeze mode, 0.0 to 1.0.
    pub freeze_mode: f32,
}

impl ParamSnapshot {
    /// Build a snapshot from values in [`ParamId::ALL`] order.
    pub const fn from_array(values: [f32; PARAM_COUNT]) -> Self {
        let [room_size, damping, wet_level, dry_level, width, freeze_mode] = values;
        Self {
            room_size,
            damping,
            wet_level,
            dry_level,
            width,
            freeze_mode,
        }
    }

    /// Values in [`ParamId::ALL`] order.
    pub const fn to_array(&self) -> [f32; PARAM_COUNT] {
        [
            self.room_size,
            self.damping,
            self.wet_level,
            self.dry_level,
            self.width,
            self.freeze_mode,
        ]
    }

    /// Value of a single control.
    pub fn get(&self, id: ParamId) -> f32 {
        self.to_array()[id.index()]
    }

    /// Largest absolute difference between any pair of corresponding controls.
    pub fn max_abs_diff(&self, other: &ParamSnapshot) -> f32 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }

    /// Whether freeze mode is engaged.
    pub fn is_frozen(&self) -> bool {
        self.freeze_mode >= 0.5
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::from_array(ParamId::ALL.map(ParamId::default_value))
    }
}

/// Lock-free storage for the six reverb controls.
///
/// Every write clamps to `[0.0, 1.0]`; NaN writes are ignored and leave the
/// previous value in place. Reads and writes are single atomic word
/// operations, so the audio thread can call [`snapshot`](Self::snapshot) at
/// any time without waiting on a writer.
#[derive(Debug)]
pub struct ReverbParams {
    cells: [AtomicU32; PARAM_COUNT],
}

impl ReverbParams {
    /// Create a parameter set holding the documented defaults.
    pub fn new() -> Self {
        Self {
            cells: ParamId::ALL.map(|id| AtomicU32::new(id.default_value().to_bits())),
        }
    }

    /// Read the current value of a control.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.cells[id.index()].load(Ordering::Acquire))
    }

    /// Write a control, clamping to `[0.0, 1.0]`.
    #[inline]
    pub fn set(&self, id: ParamId, value: f32) {
        if let Some(clamped) = clamp_unit(value) {
            self.cells[id.index()].store(clamped.to_bits(), Ordering::Release);
        }
    }

    /// Copy all six values.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot::from_array(ParamId::ALL.map(|id| self.get(id)))
    }

    /// Write all six values from a snapshot, clamping each.
    pub fn apply(&self, snapshot: &ParamSnapshot) {
        for (id, value) in ParamId::ALL.into_iter().zip(snapshot.to_array()) {
            self.set(id, value);
        }
    }

    /// Restore every control to its default.
    pub fn reset(&self) {
        self.apply(&ParamSnapshot::default());
    }

    /// Encode all six values as a state blob.
    pub fn serialize(&self) -> [u8; STATE_BLOB_LEN] {
        let mut blob = [0u8; STATE_BLOB_LEN];
        for (chunk, value) in blob.chunks_exact_mut(4).zip(self.snapshot().to_array()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        blob
    }

    /// Decode a state blob produced by [`serialize`](Self::serialize).
    ///
    /// A blob shorter than [`STATE_BLOB_LEN`] is ignored entirely and every
    /// control keeps its prior value. Longer blobs are accepted; bytes past
    /// the sixth value are ignored. Decoded values go through the clamping
    /// setters, so out-of-range or NaN payload values cannot escape the range.
    ///
    /// Returns `true` if the blob was applied.
    pub fn deserialize(&self, bytes: &[u8]) -> bool {
        if bytes.len() < STATE_BLOB_LEN {
            return false;
        }
        for (id, chunk) in ParamId::ALL
            .into_iter()
            .zip(bytes[..STATE_BLOB_LEN].chunks_exact(4))
        {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            self.set(id, f32::from_le_bytes(raw));
        }
        true
    }

    /// Current room size.
    pub fn room_size(&self) -> f32 {
        self.get(ParamId::RoomSize)
    }

    /// Set the room size (clamped to 0.0..=1.0).
    pub fn set_room_size(&self, value: f32) {
        self.set(ParamId::RoomSize, value);
    }

    /// Current damping.
    pub fn damping(&self) -> f32 {
        self.get(ParamId::Damping)
    }

    /// Set the damping (clamped to 0.0..=1.0).
    pub fn set_damping(&self, value: f32) {
        self.set(ParamId::Damping, value);
    }

    /// Current wet level.
    pub fn wet_level(&self) -> f32 {
        self.get(ParamId::WetLevel)
    }

    /// Set the wet level (clamped to 0.0..=1.0).
    pub fn set_wet_level(&self, value: f32) {
        self.set(ParamId::WetLevel, value);
    }

    /// Current dry level.
    pub fn dry_level(&self) -> f32 {
        self.get(ParamId::DryLevel)
    }

    /// Set the dry level (clamped to 0.0..=1.0).
    pub fn set_dry_level(&self, value: f32) {
        self.set(ParamId::DryLevel, value);
    }

    /// Current stereo width.
    pub fn width(&self) -> f32 {
        self.get(ParamId::Width)
    }

    /// Set the stereo width (clamped to 0.0..=1.0).
    pub fn set_width(&self, value: f32) {
        self.set(ParamId::Width, value);
    }

    /// Current freeze mode value.
    pub fn freeze_mode(&self) -> f32 {
        self.get(ParamId::FreezeMode)
    }

    /// Set the freeze mode value (clamped to 0.0..=1.0).
    pub fn set_freeze_mode(&self, value: f32) {
        self.set(ParamId::FreezeMode, value);
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self::new()
    }
}
