use std::ops::Range;

use log::debug;
use thiserror::Error;

use self::envelope::Envelope;
use self::oscillators::{Oscillator, Waveform};
use crate::{
    audio::operations::{add_product_scaled, add_samples},
    filter::{FilterOpts, FilterStrategy},
    note::NoteEvent,
    util::PitchCache,
};

pub mod envelope;
pub mod oscillators;

/// Renders notes additively into a caller-owned buffer.
///
/// Each note is synthesized from the sum of the synth's oscillators, low-pass filtered as a whole
/// if the synth has a filter, shaped by the envelope and scaled by velocity.
pub struct Synth {
    opts: SynthOpts,
    envelope: Envelope,
    filter: Option<FilterStrategy>,
    pitches: PitchCache,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthOpts {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// The oscillator wave form.
    pub waveform: Waveform,
    /// The voices summed for each note.
    pub oscillators: Vec<Oscillator>,
    /// Peak amplitude between 0 and 1.
    pub amp: f64,
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level between 0 and 1, as a proportion of `amp`.
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
    pub filter: Option<FilterOpts>,
    /// Whether envelopes are memoized by note length. Worth it for quantized note durations.
    pub memoize_envelopes: bool,
}

impl SynthOpts {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            waveform: Waveform::Sine,
            oscillators: vec![Oscillator::default()],
            amp: 1.0,
            attack: 0.005,
            decay: 0.0,
            sustain: 1.0,
            release: 0.005,
            filter: None,
            memoize_envelopes: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("`decay` must be non-zero if `sustain` is not 1 (sustain is {sustain})")]
    DecayRequired { sustain: f64 },
    #[error("Sample rate must be positive")]
    InvalidSampleRate,
    #[error("Filter order must be at least 1")]
    InvalidFilterOrder,
}

impl Synth {
    pub fn new(mut opts: SynthOpts) -> Result<Self, SynthError> {
        if opts.sustain != 1.0 && opts.decay == 0.0 {
            return Err(SynthError::DecayRequired {
                sustain: opts.sustain,
            });
        }
        if opts.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate);
        }
        if opts.filter.is_some_and(|f| f.order() == 0) {
            return Err(SynthError::InvalidFilterOrder);
        }
        if opts.oscillators.is_empty() {
            opts.oscillators.push(Oscillator::default());
        }

        debug!(
            "Creating {:?} synth with {} oscillator(s) and filter {:?}",
            opts.waveform,
            opts.oscillators.len(),
            opts.filter
        );

        Ok(Self {
            envelope: Envelope::new(&opts),
            filter: opts.filter.map(|f| FilterStrategy::new(f, opts.sample_rate)),
            pitches: PitchCache::new(),
            opts,
        })
    }

    pub fn opts(&self) -> &SynthOpts {
        &self.opts
    }

    pub fn sample_rate(&self) -> u32 {
        self.opts.sample_rate
    }

    /// How long a note sounds after its release, in seconds.
    pub fn release_duration(&self) -> f64 {
        self.opts.release
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Gets the range of `time_axis` a note occupies, from its onset until the end of its release.
    ///
    /// `time_axis` must be sorted in ascending order.
    pub fn note_range(&self, time_axis: &[f64], onset: f64, release: f64) -> Range<usize> {
        let start = time_axis.partition_point(|&t| t < onset);
        let end = time_axis.partition_point(|&t| t < release + self.opts.release);
        start..end.max(start)
    }

    /// Adds a note to `out`, whose samples are at the times in `time_axis`.
    ///
    /// Only the samples covered by the note are touched, so notes can be rendered in any order.
    pub fn render(
        &self,
        time_axis: &[f64],
        out: &mut [f64],
        pitch: f64,
        onset: f64,
        release: f64,
        velocity: u8,
    ) {
        debug_assert!(out.len() >= time_axis.len());
        debug_assert!(velocity <= 127);

        let range = self.note_range(time_axis, onset, release);
        if range.is_empty() {
            return;
        }

        let mut samples = self.synthesize(&time_axis[range.clone()], pitch);
        if let Some(filter) = &self.filter {
            filter.apply(&mut samples, self.pitches.angular(pitch));
        }
        let envelope = self.envelope.get(samples.len());

        let gain = velocity as f64 / 127.0;
        add_product_scaled(&mut out[range], &samples, &envelope, gain);
    }

    pub fn render_note(&self, time_axis: &[f64], out: &mut [f64], note: &NoteEvent) {
        self.render(
            time_axis,
            out,
            note.pitch,
            note.onset,
            note.release,
            note.velocity,
        );
    }

    /// Sums the raw waveforms of all oscillators at the given times.
    fn synthesize(&self, times: &[f64], pitch: f64) -> Vec<f64> {
        let mut sum = vec![0.0; times.len()];
        let mut voice = vec![0.0; times.len()];
        for osc in &self.opts.oscillators {
            let omega = self.pitches.angular(pitch + osc.detune);
            self.opts.waveform.generate_with(times, omega, osc.phase, &mut voice);
            add_samples(&mut sum, &voice);
        }
        sum
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE_RATE: u32 = 8000;

    fn time_axis(seconds: f64) -> Vec<f64> {
        let n = (seconds * SAMPLE_RATE as f64) as usize;
        (0..n).map(|i| i as f64 / SAMPLE_RATE as f64).collect()
    }

    #[test]
    fn test_decay_required() {
        let opts = SynthOpts {
            sustain: 0.5,
            decay: 0.0,
            ..SynthOpts::new(SAMPLE_RATE)
        };
        assert_eq!(
            Synth::new(opts).err(),
            Some(SynthError::DecayRequired { sustain: 0.5 })
        );

        let opts = SynthOpts {
            sustain: 1.0,
            decay: 0.0,
            ..SynthOpts::new(SAMPLE_RATE)
        };
        assert!(Synth::new(opts).is_ok());

        let opts = SynthOpts {
            sustain: 0.0,
            decay: 0.1,
            ..SynthOpts::new(SAMPLE_RATE)
        };
        assert!(Synth::new(opts).is_ok());
    }

    #[test]
    fn test_invalid_opts() {
        assert_eq!(
            Synth::new(SynthOpts::new(0)).err(),
            Some(SynthError::InvalidSampleRate)
        );
        let opts = SynthOpts {
            filter: Some(FilterOpts::PitchTracking { factor: 0.5, order: 0 }),
            ..SynthOpts::new(SAMPLE_RATE)
        };
        assert_eq!(Synth::new(opts).err(), Some(SynthError::InvalidFilterOrder));
    }

    #[test]
    fn test_empty_oscillators_get_default() {
        let opts = SynthOpts {
            oscillators: vec![],
            ..SynthOpts::new(SAMPLE_RATE)
        };
        let synth = Synth::new(opts).unwrap();
        assert_eq!(synth.opts().oscillators, [Oscillator::default()]);
    }

    #[test]
    fn test_note_range() {
        let synth = Synth::new(SynthOpts::new(SAMPLE_RATE)).unwrap();
        let t = time_axis(1.0);
        // The release adds 0.005s, or 40 samples.
        assert_eq!(synth.note_range(&t, 0.0, 0.4999), 0..4040);
        assert_eq!(synth.note_range(&t, 0.25, 0.4999), 2000..4040);
        assert_eq!(synth.note_range(&t, 0.9, 2.0), 7200..8000);
        assert_eq!(synth.note_range(&t, 0.5, 0.2), 4000..4000);
    }

    #[test]
    fn test_render_only_touches_note() {
        let synth = Synth::new(SynthOpts::new(SAMPLE_RATE)).unwrap();
        let t = time_axis(1.0);
        let mut out = vec![0.5; t.len()];
        synth.render(&t, &mut out, 60.0, 0.25, 0.5, 64);

        let range = synth.note_range(&t, 0.25, 0.5);
        assert!(out[..range.start].iter().all(|&s| s == 0.5));
        assert!(out[range.end..].iter().all(|&s| s == 0.5));
        assert!(out[range].iter().any(|&s| s != 0.5));
    }

    #[test]
    fn test_velocity_scales_linearly() {
        let synth = Synth::new(SynthOpts::new(SAMPLE_RATE)).unwrap();
        let t = time_axis(0.5);
        let mut loud = vec![0.0; t.len()];
        let mut quiet = vec![0.0; t.len()];
        synth.render(&t, &mut loud, 64.0, 0.0, 0.25, 127);
        synth.render(&t, &mut quiet, 64.0, 0.0, 0.25, 0);
        assert!(quiet.iter().all(|&s| s == 0.0));
        assert!(loud.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_oscillators_sum() {
        let single = Synth::new(SynthOpts::new(SAMPLE_RATE)).unwrap();
        let double = Synth::new(SynthOpts {
            oscillators: vec![Oscillator::default(); 2],
            ..SynthOpts::new(SAMPLE_RATE)
        })
        .unwrap();

        let t = time_axis(0.5);
        let mut a = vec![0.0; t.len()];
        let mut b = vec![0.0; t.len()];
        single.render(&t, &mut a, 62.0, 0.0, 0.25, 100);
        double.render(&t, &mut b, 62.0, 0.0, 0.25, 100);
        for (a, b) in a.iter().zip(&b) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_filtered_render_is_quieter() {
        let plain = Synth::new(SynthOpts {
            waveform: Waveform::Saw,
            ..SynthOpts::new(SAMPLE_RATE)
        })
        .unwrap();
        let filtered = Synth::new(SynthOpts {
            waveform: Waveform::Saw,
            filter: Some(FilterOpts::PitchTracking { factor: 0.5, order: 3 }),
            ..SynthOpts::new(SAMPLE_RATE)
        })
        .unwrap();

        let t = time_axis(0.5);
        let mut a = vec![0.0; t.len()];
        let mut b = vec![0.0; t.len()];
        plain.render(&t, &mut a, 60.0, 0.0, 0.4, 127);
        filtered.render(&t, &mut b, 60.0, 0.0, 0.4, 127);

        let energy = |s: &[f64]| s.iter().map(|s| s * s).sum::<f64>();
        assert!(energy(&b) < 0.1 * energy(&a));
    }
}
