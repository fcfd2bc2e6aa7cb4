//! Schroeder allpass for diffusing the comb output.

use crate::flush_denormal;

/// Schroeder allpass filter over a fixed-length ring buffer.
///
/// ```text
/// delayed = buf[i]
/// out     = -in + delayed
/// buf[i]  = in + delayed * feedback
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
}

impl AllpassFilter {
    /// Create an allpass with a delay of `delay_samples` (at least 1).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: 0.5,
        }
    }

    /// Set the feedback coefficient. Stable for |feedback| < 1.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.index];
        let output = -input + delayed;
        self.buffer[self.index] = flush_denormal(input + delayed * self.feedback);
        self.index += 1;
        if self.index == self.buffer.len() {
            self.index = 0;
        }
        output
    }

    /// Clear the delay line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_finite_under_dc() {
        let mut allpass = AllpassFilter::new(100);
        for _ in 0..1000 {
            assert!(allpass.process(0.5).is_finite());
        }
    }

    #[test]
    fn impulse_passes_inverted_then_delayed() {
        let mut allpass = AllpassFilter::new(4);
        assert_eq!(allpass.process(1.0), -1.0);
        for _ in 0..3 {
            assert_eq!(allpass.process(0.0), 0.0);
        }
        assert_eq!(allpass.process(0.0), 1.0);
    }
}
