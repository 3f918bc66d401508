use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use log::debug;

use super::SynthOpts;
use crate::util::linspace;

/// Attack/decay/sustain/release gain curves for whole notes.
///
/// The attack-decay and release ramps are computed once; curves for a given note length are
/// assembled from them on request and optionally memoized by length.
pub struct Envelope {
    /// Linear ramp from silence to `amp`, followed by the ramp from `amp` to the sustain level.
    attack_decay: Box<[f64]>,
    /// Linear ramp from the sustain level to silence.
    release: Box<[f64]>,
    /// Sustain level as an absolute gain.
    sustain: f64,
    /// Envelopes by length in samples, if memoization is enabled.
    cache: Option<Mutex<HashMap<usize, Arc<[f64]>>>>,
}

impl Envelope {
    pub fn new(opts: &SynthOpts) -> Self {
        let sample_rate = opts.sample_rate as f64;
        let attack_i = (sample_rate * opts.attack) as usize;
        let decay_i = (sample_rate * opts.decay) as usize;
        let release_i = (sample_rate * opts.release) as usize;
        let sustain = opts.sustain * opts.amp;

        let attack_decay = linspace(0.0, opts.amp, attack_i)
            .chain(linspace(opts.amp, sustain, decay_i))
            .collect();
        let release = linspace(sustain, 0.0, release_i).collect();

        Self {
            attack_decay,
            release,
            sustain,
            cache: opts.memoize_envelopes.then(Default::default),
        }
    }

    /// Length of the attack and decay phases in samples.
    pub fn attack_decay_len(&self) -> usize {
        self.attack_decay.len()
    }

    /// Length of the release phase in samples.
    pub fn release_len(&self) -> usize {
        self.release.len()
    }

    /// The sustain level as an absolute gain.
    pub fn sustain(&self) -> f64 {
        self.sustain
    }

    /// Gets the envelope for a note lasting `n` samples, including its release.
    pub fn get(&self, n: usize) -> Arc<[f64]> {
        let Some(cache) = &self.cache else {
            return self.compute(n).into();
        };
        let Ok(mut cache) = cache.lock() else {
            return self.compute(n).into();
        };
        cache
            .entry(n)
            .or_insert_with(|| {
                debug!("Computing envelope of {n} samples");
                self.compute(n).into()
            })
            .clone()
    }

    /// Number of memoized envelopes.
    pub fn cached(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.lock().map(|c| c.len()).unwrap_or(0),
            None => 0,
        }
    }

    /// Builds the envelope for a note lasting `n` samples.
    pub fn compute(&self, n: usize) -> Vec<f64> {
        let ad = self.attack_decay.len();
        let r = self.release.len();
        let mut out = Vec::with_capacity(n);

        if n >= ad + r {
            out.extend_from_slice(&self.attack_decay);
            out.resize(n - r, self.sustain);
            out.extend_from_slice(&self.release);
        } else {
            // Too short to reach sustain, so release from wherever the attack or decay got to.
            let head = n.saturating_sub(r);
            out.extend_from_slice(&self.attack_decay[..head]);
            let from = out.last().copied().unwrap_or(0.0);
            out.extend(linspace(from, 0.0, n - head));
        }

        out
    }
}
