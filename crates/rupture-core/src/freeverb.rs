//! Freeverb-style stereo reverb.
//!
//! Eight parallel damped combs feed four series allpasses per channel. The
//! right channel's delays are offset by [`STEREO_SPREAD`] samples to
//! decorrelate the two tails. Width cross-mixes the tails; freeze mode sets
//! comb feedback to unity and mutes the input so the current tail sustains.

use crate::allpass::AllpassFilter;
use crate::comb::CombFilter;
use crate::engine::ReverbEngine;
use crate::params::ParamSnapshot;

/// Comb delay times at the 44.1 kHz reference rate. Mutually prime.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass delay times at the 44.1 kHz reference rate.
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Right-channel delay offset in samples at the reference rate.
pub const STEREO_SPREAD: usize = 23;

const REFERENCE_RATE: f32 = 44100.0;
const FIXED_GAIN: f32 = 0.015;
const SCALE_WET: f32 = 3.0;
const SCALE_DRY: f32 = 2.0;
const SCALE_DAMP: f32 = 0.4;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;
const ALLPASS_FEEDBACK: f32 = 0.5;

fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    ((samples as f32 * sample_rate / REFERENCE_RATE).round() as usize).max(1)
}

/// One channel's comb bank and allpass chain.
#[derive(Debug, Clone)]
struct Tank {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
}

impl Tank {
    fn new(sample_rate: f32, spread: usize) -> Self {
        let combs = COMB_TUNINGS_44K
            .iter()
            .map(|&t| CombFilter::new(scale_to_rate(t + spread, sample_rate)))
            .collect();
        let allpasses = ALLPASS_TUNINGS_44K
            .iter()
            .map(|&t| {
                let mut ap = AllpassFilter::new(scale_to_rate(t + spread, sample_rate));
                ap.set_feedback(ALLPASS_FEEDBACK);
                ap
            })
            .collect();
        Self { combs, allpasses }
    }

    fn configure(&mut self, feedback: f32, damp: f32) {
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
            comb.set_damp(damp);
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::clear);
        self.allpasses.iter_mut().for_each(AllpassFilter::clear);
    }
}

/// Freeverb reverb engine.
///
/// Delay memory is allocated in [`prepare`](ReverbEngine::prepare); until
/// then `process` leaves audio untouched.
///
/// # Example
///
/// ```rust
/// use rupture_core::{Freeverb, ParamSnapshot, ReverbEngine};
///
/// let mut reverb = Freeverb::new();
/// reverb.prepare(48000.0, 256);
/// reverb.set_params(&ParamSnapshot::default());
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// left[0] = 1.0;
/// reverb.process(&mut left, &mut right);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Freeverb {
    tanks: Option<[Tank; 2]>,
    gain: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
    cached: Option<ParamSnapshot>,
}

impl Freeverb {
    /// Create an unprepared engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn update_coefficients(&mut self, params: &ParamSnapshot) {
        let wet = params.wet_level * SCALE_WET;
        self.wet1 = wet * (params.width / 2.0 + 0.5);
        self.wet2 = wet * ((1.0 - params.width) / 2.0);
        self.dry = params.dry_level * SCALE_DRY;

        let (feedback, damp) = if params.is_frozen() {
            self.gain = 0.0;
            (1.0, 0.0)
        } else {
            self.gain = FIXED_GAIN;
            (
                params.room_size * SCALE_ROOM + OFFSET_ROOM,
                params.damping * SCALE_DAMP,
            )
        };

        if let Some(tanks) = &mut self.tanks {
            for tank in tanks {
                tank.configure(feedback, damp);
            }
        }
    }
}

impl ReverbEngine for Freeverb {
    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.tanks = Some([
            Tank::new(sample_rate, 0),
            Tank::new(sample_rate, STEREO_SPREAD),
        ]);
        let params = self.cached.take().unwrap_or_default();
        self.update_coefficients(&params);
        self.cached = Some(params);
    }

    fn set_params(&mut self, params: &ParamSnapshot) {
        if self.cached.as_ref() != Some(params) {
            self.update_coefficients(params);
            self.cached = Some(*params);
        }
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let Some([tank_l, tank_r]) = &mut self.tanks else {
            return;
        };
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let input = (*l + *r) * self.gain;
            let out_l = tank_l.process(input);
            let out_r = tank_r.process(input);
            let dry_l = *l;
            let dry_r = *r;
            *l = out_l * self.wet1 + out_r * self.wet2 + dry_l * self.dry;
            *r = out_r * self.wet1 + out_l * self.wet2 + dry_r * self.dry;
        }
    }

    fn reset(&mut self) {
        if let Some(tanks) = &mut self.tanks {
            for tank in tanks {
                tank.clear();
            }
        }
    }
}
