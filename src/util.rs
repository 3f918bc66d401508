use std::{collections::HashMap, f64::consts::TAU, sync::Mutex};

/// Converts a (possibly fractional) MIDI pitch to a frequency in Hz.
pub fn hz_from_pitch(pitch: f64) -> f64 {
    440.0 * 2.0f64.powf((pitch - 69.0) / 12.0)
}

/// Converts a (possibly fractional) MIDI pitch to an angular frequency in radians per second.
pub fn angular_from_pitch(pitch: f64) -> f64 {
    hz_from_pitch(pitch) * TAU
}

/// Converts an angular frequency back to Hz.
pub fn hz_from_angular(omega: f64) -> f64 {
    omega / TAU
}

/// Memoizes `angular_from_pitch`, keyed by the bit pattern of the input pitch.
///
/// The cache is unbounded. Every distinct `pitch + detune` adds an entry for the life of
/// the owning synth, so unquantised or microtonal input keeps growing it.
#[derive(Default)]
pub struct PitchCache {
    entries: Mutex<HashMap<u64, f64>>,
}

impl PitchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angular(&self, pitch: f64) -> f64 {
        let Ok(mut entries) = self.entries.lock() else {
            return angular_from_pitch(pitch);
        };
        *entries
            .entry(pitch.to_bits())
            .or_insert_with(|| angular_from_pitch(pitch))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Yields `n` evenly spaced values from `start` to `end`, both inclusive.
///
/// A single value yields `start`; zero values yields nothing.
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n && n > 1 { end } else { start + step * i as f64 })
}
