//! Damped feedback comb filter for the Freeverb tail.
//!
//! The feedback path includes a one-pole lowpass, simulating high-frequency
//! absorption in a real room:
//!
//! ```text
//! out         = buf[i]
//! filterstore = out * (1 - damp) + filterstore * damp
//! buf[i]      = in + filterstore * feedback
//! ```

use crate::flush_denormal;

/// Comb filter with feedback and damping over a fixed-length ring buffer.
#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp1: f32,
    damp2: f32,
    filterstore: f32,
}

impl CombFilter {
    /// Create a comb filter with a delay of `delay_samples` (at least 1).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: 0.5,
            damp1: 0.5,
            damp2: 0.5,
            filterstore: 0.0,
        }
    }

    /// Set the feedback amount. Clamped to `[0, 1]`; 1.0 sustains forever.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 1.0);
    }

    /// Set the damping amount (0.0 = bright, 1.0 = dark).
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp.clamp(0.0, 1.0);
        self.damp2 = 1.0 - self.damp1;
    }

    /// Process one sample and return the delayed output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filterstore = flush_denormal(output * self.damp2 + self.filterstore * self.damp1);
        self.buffer[self.index] = input + self.filterstore * self.feedback;
        self.index += 1;
        if self.index == self.buffer.len() {
            self.index = 0;
        }
        output
    }

    /// Clear the delay line and filter state.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filterstore = 0.0;
        self.index = 0;
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; a comb holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
