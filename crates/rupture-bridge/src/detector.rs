//! Suppresses redundant parameter pushes.
//!
//! The detector holds a shadow of what the surface currently shows. A push
//! is due only when some parameter has moved more than the tolerance away
//! from that shadow, so a burst of small edits between two ticks coalesces
//! into at most one update.

use rupture_core::{MeterLevels, ParamSnapshot};

/// Default change threshold, in normalized parameter units.
pub const DEFAULT_TOLERANCE: f32 = 0.01;

/// What the presentation surface was last successfully sent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LastPushedState {
    /// Parameter values from the last `setReverbValues` push.
    pub params: ParamSnapshot,
    /// Display levels from the last `setAudioState` push.
    pub meters: MeterLevels,
}

/// Compares live parameters against [`LastPushedState`].
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    tolerance: f32,
    last: LastPushedState,
}

impl ChangeDetector {
    /// Create a detector whose shadow starts at `initial`.
    ///
    /// Negative or non-finite tolerances are treated as zero.
    pub fn new(tolerance: f32, initial: ParamSnapshot) -> Self {
        let tolerance = if tolerance.is_finite() { tolerance.max(0.0) } else { 0.0 };
        Self {
            tolerance,
            last: LastPushedState {
                params: initial,
                meters: MeterLevels::ZERO,
            },
        }
    }

    /// Threshold in use.
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// The shadow state.
    pub fn last(&self) -> &LastPushedState {
        &self.last
    }

    /// Whether any parameter differs from the shadow by more than the tolerance.
    pub fn has_changed(&self, current: &ParamSnapshot) -> bool {
        current.max_abs_diff(&self.last.params) > self.tolerance
    }

    /// Record a successful parameter push.
    pub fn record_params(&mut self, pushed: ParamSnapshot) {
        self.last.params = pushed;
    }

    /// Record a successful meter push.
    pub fn record_meters(&mut self, pushed: MeterLevels) {
        self.last.meters = pushed;
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, ParamSnapshot::default())
    }
}
