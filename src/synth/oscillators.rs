use std::f64::consts::{PI, TAU};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::util::angular_from_pitch;

/// One additive voice within a synth, offset from the played note by phase (radians)
/// and detune (semitones).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub phase: f64,
    pub detune: f64,
}

impl Oscillator {
    pub fn new(phase: f64, detune: f64) -> Self {
        Self { phase, detune }
    }

    pub fn detuned(detune: f64) -> Self {
        Self { phase: 0.0, detune }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Noise,
}

impl Waveform {
    /// Writes one sample per time value into `out`, for the note `pitch + detune` offset by `phase`.
    pub fn generate(&self, times: &[f64], pitch: f64, phase: f64, detune: f64, out: &mut [f64]) {
        debug_assert_eq!(times.len(), out.len());
        let omega = angular_from_pitch(pitch + detune);
        self.generate_with(times, omega, phase, out);
    }

    /// As `generate`, with the angular frequency already resolved.
    pub fn generate_with(&self, times: &[f64], omega: f64, phase: f64, out: &mut [f64]) {
        let wave: fn(f64) -> f64 = match self {
            Waveform::Sine => sine,
            Waveform::Saw => saw,
            Waveform::Square => square,
            Waveform::Noise => {
                let mut rng = StdRng::seed_from_u64(noise_seed(times, omega, phase));
                out.iter_mut().for_each(|s| *s = rng.gen_range(-1.0..1.0));
                return;
            }
        };
        for (sample, &t) in out.iter_mut().zip(times) {
            *sample = wave(t * omega + phase);
        }
    }
}

/// Seeds noise from the first sample time, frequency and phase, so the same note always
/// gets the same noise while detuned oscillators and other notes get different noise.
fn noise_seed(times: &[f64], omega: f64, phase: f64) -> u64 {
    let start = times.first().map_or(0, |t| t.to_bits());
    start ^ omega.to_bits().rotate_left(21) ^ phase.to_bits().rotate_left(42)
}

pub fn sine(theta: f64) -> f64 {
    theta.sin()
}

/// Rises linearly from -1 to 1 over each period of 2π.
pub fn saw(theta: f64) -> f64 {
    2.0 * theta.rem_euclid(TAU) / TAU - 1.0
}

pub fn square(theta: f64) -> f64 {
    if theta.rem_euclid(TAU) < PI {
        1.0
    } else {
        -1.0
    }
}
