//! Test signals for headless sessions.

use clap::ValueEnum;

/// Source fed into the processor in place of a host's audio input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalKind {
    /// 440 Hz sine at -6 dBFS
    Sine,
    /// Short 1 kHz bursts every half second, leaving room for the tail
    Pulse,
    /// White noise at -12 dBFS
    Noise,
    /// Digital silence
    Silence,
}

const SINE_FREQ: f32 = 440.0;
const PULSE_FREQ: f32 = 1000.0;
const PULSE_PERIOD_SECS: f32 = 0.5;
const PULSE_LENGTH_SECS: f32 = 0.05;

/// Stateful generator; successive blocks are continuous.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    kind: SignalKind,
    sample_rate: f32,
    position: u64,
    noise_state: u32,
}

impl SignalGenerator {
    /// Create a generator at sample zero.
    pub fn new(kind: SignalKind, sample_rate: f32) -> Self {
        Self {
            kind,
            sample_rate,
            position: 0,
            noise_state: 0x9E37_79B9,
        }
    }

    /// Fill both channels with the next block. Left and right are identical
    /// except for noise, which is independent per channel.
    pub fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let t = self.position as f32 / self.sample_rate;
            let (a, b) = match self.kind {
                SignalKind::Sine => {
                    let s = 0.5 * (core::f32::consts::TAU * SINE_FREQ * t).sin();
                    (s, s)
                }
                SignalKind::Pulse => {
                    let s = if t % PULSE_PERIOD_SECS < PULSE_LENGTH_SECS {
                        0.8 * (core::f32::consts::TAU * PULSE_FREQ * t).sin()
                    } else {
                        0.0
                    };
                    (s, s)
                }
                SignalKind::Noise => (0.25 * self.next_noise(), 0.25 * self.next_noise()),
                SignalKind::Silence => (0.0, 0.0),
            };
            *l = a;
            *r = b;
            self.position += 1;
        }
    }

    /// Uniform in [-1, 1), xorshift32.
    fn next_noise(&mut self) -> f32 {
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}
