use std::f64::consts::PI;

use crate::util::hz_from_angular;

/// Low-pass filter settings for a synth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOpts {
    /// A fixed cutoff in Hz.
    Static { cutoff: f64, order: usize },
    /// A cutoff of the played note's frequency multiplied by `factor`.
    PitchTracking { factor: f64, order: usize },
}

impl FilterOpts {
    pub fn order(&self) -> usize {
        match *self {
            FilterOpts::Static { order, .. } => order,
            FilterOpts::PitchTracking { order, .. } => order,
        }
    }
}

/// How a synth filters each note before applying its envelope.
pub enum FilterStrategy {
    Static(Butterworth),
    PitchTracking { factor: f64, order: usize, sample_rate: f64 },
}

impl FilterStrategy {
    pub fn new(opts: FilterOpts, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f64;
        match opts {
            FilterOpts::Static { cutoff, order } => {
                Self::Static(Butterworth::lowpass(order, cutoff, sample_rate))
            }
            FilterOpts::PitchTracking { factor, order } => Self::PitchTracking {
                factor,
                order,
                sample_rate,
            },
        }
    }

    /// Filters a whole note in place, given the angular frequency of its pitch.
    pub fn apply(&self, samples: &mut [f64], omega: f64) {
        let filtered = match self {
            FilterStrategy::Static(filter) => filter.filtfilt(samples),
            FilterStrategy::PitchTracking {
                factor,
                order,
                sample_rate,
            } => {
                let cutoff = hz_from_angular(omega) * factor;
                Butterworth::lowpass(*order, cutoff, *sample_rate).filtfilt(samples)
            }
        };
        samples.copy_from_slice(&filtered);
    }
}

/// A first or second order section of an IIR filter, in transposed direct form II.
///
/// The `a` coefficients are normalized so that `a0` is 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    b: [f64; 3],
    a: [f64; 2],
}

impl Section {
    /// A second order low-pass section with quality factor `q`, where `k` is the prewarped cutoff.
    fn lowpass2(k: f64, q: f64) -> Self {
        let norm = 1.0 / (1.0 + k / q + k * k);
        let b0 = k * k * norm;
        Self {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (k * k - 1.0) * norm, (1.0 - k / q + k * k) * norm],
        }
    }

    /// A first order low-pass section, where `k` is the prewarped cutoff.
    fn lowpass1(k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        Self {
            b: [k * norm, k * norm, 0.0],
            a: [(k - 1.0) * norm, 0.0],
        }
    }

    /// Gain of the section for a constant input.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / (1.0 + self.a[0] + self.a[1])
    }

    /// The state the section settles into for a constant unit input.
    fn steady_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z2 = self.b[2] - self.a[1] * g;
        let z1 = self.b[1] - self.a[0] * g + z2;
        [z1, z2]
    }

    #[inline]
    fn process_sample(&self, x: f64, z: &mut [f64; 2]) -> f64 {
        let y = self.b[0] * x + z[0];
        z[0] = self.b[1] * x - self.a[0] * y + z[1];
        z[1] = self.b[2] * x - self.a[1] * y;
        y
    }
}

/// A digital Butterworth low-pass filter, as a cascade of second order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Butterworth {
    order: usize,
    sections: Vec<Section>,
}

impl Butterworth {
    /// Designs an `order` pole low-pass filter with the given cutoff, via the bilinear transform.
    ///
    /// The cutoff is clamped to lie strictly between zero and the Nyquist frequency.
    pub fn lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Self {
        let normal_cutoff = (cutoff_hz / sample_rate).clamp(1e-9, 0.4999);
        let k = (PI * normal_cutoff).tan();

        let mut sections: Vec<_> = (0..order / 2)
            .map(|i| {
                let theta = PI * (2 * i + 1) as f64 / (2 * order) as f64;
                Section::lowpass2(k, 1.0 / (2.0 * theta.sin()))
            })
            .collect();
        if order % 2 == 1 {
            sections.push(Section::lowpass1(k));
        }

        Self { order, sections }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Filters `samples` in place, starting from the steady state for the first sample.
    pub fn filter(&self, samples: &mut [f64]) {
        let Some(&first) = samples.first() else {
            return;
        };

        let mut level = first;
        let mut states: Vec<[f64; 2]> = self
            .sections
            .iter()
            .map(|section| {
                let [z1, z2] = section.steady_state();
                let state = [z1 * level, z2 * level];
                level *= section.dc_gain();
                state
            })
            .collect();

        for sample in samples.iter_mut() {
            *sample = self
                .sections
                .iter()
                .zip(states.iter_mut())
                .fold(*sample, |x, (section, z)| section.process_sample(x, z));
        }
    }

    /// Filters `samples` forwards then backwards, so that the phase shifts of both passes cancel.
    ///
    /// Both ends are extended by an odd reflection before filtering, to reduce edge transients.
    pub fn filtfilt(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n < 2 || self.sections.is_empty() {
            return samples.to_vec();
        }

        let pad = (3 * (self.order + 1)).min(n - 1);
        let (first, last) = (samples[0], samples[n - 1]);
        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i]));
        ext.extend_from_slice(samples);
        ext.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i]));

        self.filter(&mut ext);
        ext.reverse();
        self.filter(&mut ext);
        ext.reverse();

        ext.drain(pad..pad + n).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::angular_from_pitch;

    const SAMPLE_RATE: f64 = 44100.0;

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    fn tone(hz: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * hz * i as f64 / SAMPLE_RATE).sin())
            .collect()
    }

    #[test]
    fn test_section_count() {
        for order in 1..=6 {
            let filter = Butterworth::lowpass(order, 1000.0, SAMPLE_RATE);
            assert_eq!(filter.order(), order);
            assert_eq!(filter.sections().len(), (order + 1) / 2);
        }
    }

    #[test]
    fn test_second_order_matches_closed_form() {
        let filter = Butterworth::lowpass(2, 1000.0, SAMPLE_RATE);
        let a = (PI * 1000.0 / SAMPLE_RATE).tan();
        let a0 = 1.0 + 2f64.sqrt() * a + a.powi(2);
        let section = filter.sections()[0];
        assert!((section.b[0] - a.powi(2) / a0).abs() < 1e-12);
        assert!((section.a[0] - (2.0 * a.powi(2) - 2.0) / a0).abs() < 1e-12);
        assert!((section.a[1] - (1.0 - 2f64.sqrt() * a + a.powi(2)) / a0).abs() < 1e-12);
    }

    #[test]
    fn test_unity_dc_gain() {
        for order in 1..=5 {
            let filter = Butterworth::lowpass(order, 300.0, SAMPLE_RATE);
            for section in filter.sections() {
                assert!((section.dc_gain() - 1.0).abs() < 1e-9);
            }
            let out = filter.filtfilt(&[0.25; 500]);
            assert!(out.iter().all(|s| (s - 0.25).abs() < 1e-9));
        }
    }

    #[test]
    fn test_attenuates_above_cutoff() {
        let filter = Butterworth::lowpass(3, 200.0, SAMPLE_RATE);
        let out = filter.filtfilt(&tone(5000.0, 4410));
        assert!(rms(&out[500..3900]) < 1e-3);

        let out = filter.filtfilt(&tone(20.0, 44100));
        assert!(rms(&out[5000..39000]) > 0.6);
    }

    #[test]
    fn test_zero_phase() {
        let n = 2001;
        let pulse: Vec<f64> = (0..n)
            .map(|i| {
                let x = (i as f64 - 1000.0) / 20.0;
                (-x * x).exp()
            })
            .collect();
        let out = Butterworth::lowpass(2, 1000.0, SAMPLE_RATE).filtfilt(&pulse);
        for i in 0..n {
            assert!((out[i] - out[n - 1 - i]).abs() < 1e-9);
        }
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(1000));
    }

    #[test]
    fn test_short_input() {
        let filter = Butterworth::lowpass(3, 440.0, SAMPLE_RATE);
        assert_eq!(filter.filtfilt(&[]), Vec::<f64>::new());
        assert_eq!(filter.filtfilt(&[0.5]), vec![0.5]);
        assert_eq!(filter.filtfilt(&[0.5, -0.5, 0.25]).len(), 3);
    }

    #[test]
    fn test_pitch_tracking_follows_note() {
        let strategy = FilterStrategy::new(FilterOpts::PitchTracking { factor: 0.5, order: 2 }, 44100);
        let low = angular_from_pitch(45.0);
        let high = angular_from_pitch(93.0);

        // Cutoffs of 880 Hz for A6 and 55 Hz for A2.
        let mut under_high = tone(1760.0, 4410);
        let mut under_low = under_high.clone();
        strategy.apply(&mut under_high, high);
        strategy.apply(&mut under_low, low);
        assert!(rms(&under_high[500..3900]) > 10.0 * rms(&under_low[500..3900]));
    }

    #[test]
    fn test_static_ignores_pitch() {
        let strategy = FilterStrategy::new(FilterOpts::Static { cutoff: 440.0, order: 1 }, 44100);
        let mut a = tone(1000.0, 1000);
        let mut b = a.clone();
        strategy.apply(&mut a, angular_from_pitch(30.0));
        strategy.apply(&mut b, angular_from_pitch(100.0));
        assert_eq!(a, b);
    }
}
